//! Line number fixup
//!
//! The printer decides where blank lines go from the difference between
//! consecutive line numbers, so after nodes are moved, duplicated or removed
//! every statement run must have non-decreasing lines again.

use crate::ast::{BLOCK, Node};

/// Clamp the lines of `nodes` so they never decrease, starting at `floor`
///
/// A node below the running floor is raised to it, together with its
/// closing and end lines and everything nested in it; any other node keeps
/// its line and becomes the new floor. Nodes without a line are left alone.
/// Returns the final floor.
pub fn fix_line_numbers(nodes: &mut [Node], floor: u32) -> u32 {
    let mut floor = floor;
    for node in nodes.iter_mut() {
        let Some(line) = node.line() else {
            continue;
        };
        if line < floor {
            node.shift_lines(floor - line);
        } else {
            floor = line;
        }
    }
    floor
}

/// Run [`fix_line_numbers`] over the statements of every block in `root`
///
/// Each block uses its own line as the floor, falling back to the line of
/// its first statement.
pub fn fix_block_lines(root: &mut Node) {
    root.walk_mut(&mut |node| {
        if !node.is_call_to(BLOCK) {
            return;
        }
        let floor = node
            .line()
            .or_else(|| node.args().iter().find_map(Node::line))
            .unwrap_or_default();
        if let Some(statements) = node.args_mut() {
            fix_line_numbers(statements, floor);
        }
    });
}
