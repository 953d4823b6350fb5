//! Single-step pipes are written as plain calls
//!
//! `a |> f(b)` becomes `f(a, b)` when the pipe is a whole chain on its own,
//! i.e. neither its left side nor its parent is another pipe step.
//!
//! The piped value keeps its lines. The call moves up to where the value
//! starts, and comments inside the call collapse onto the call's first line.

use styler_core::ast::{BLOCK, PIPE};
use styler_core::{Context, Node, Result, Rule, Step, Zipper};
use tracing::debug;

/// Rule ID for single pipe unwrapping
pub const SINGLE_PIPE: &str = "single_pipe";

/// Calls that are not ordinary function calls and cannot take a piped argument
const SPECIAL_FORMS: &[&str] = &[BLOCK, PIPE, "fn", "&", "__aliases__", "."];

#[derive(Debug, Default)]
pub struct SinglePipe;

/// Whether the focus is the left side of an enclosing pipe
fn continues_a_chain(zipper: &Zipper) -> bool {
    matches!(zipper.parent(), Some(shell) if shell.is_call_to(PIPE))
        && zipper.left_siblings().is_empty()
}

fn is_single_step(node: &Node) -> bool {
    let [lhs, rhs] = node.args() else {
        return false;
    };
    if lhs.is_call_to(PIPE) {
        return false;
    }
    match rhs {
        Node::Call { .. } => !rhs
            .call_name()
            .is_some_and(|name| SPECIAL_FORMS.contains(&name)),
        _ => false,
    }
}

/// `a |> f(b)` => `f(a, b)`; any other shape is returned as is
fn unwrap_pipe(pipe: Node) -> Node {
    let Node::Call {
        head: pipe_head,
        meta: pipe_meta,
        args,
    } = pipe
    else {
        return pipe;
    };
    match <[Node; 2]>::try_from(args) {
        Ok([lhs, Node::Call { head, meta, mut args }]) => {
            args.insert(0, lhs);
            Node::Call { head, meta, args }
        }
        Ok(args) => Node::Call {
            head: pipe_head,
            meta: pipe_meta,
            args: args.into(),
        },
        Err(args) => Node::Call {
            head: pipe_head,
            meta: pipe_meta,
            args,
        },
    }
}

/// Put the call itself, but none of its arguments, on `line`
fn move_call_to(call: &mut Node, line: u32) {
    if let Node::Call { head, meta, .. } = call {
        meta.line = Some(line);
        head.set_line_recursive(line);
    }
}

impl Rule for SinglePipe {
    fn id(&self) -> &'static str {
        SINGLE_PIPE
    }

    fn description(&self) -> &'static str {
        "Rewrite single-step pipes as direct calls"
    }

    fn run(&self, zipper: &mut Zipper, ctx: &mut Context<'_>) -> Result<Step> {
        if !zipper.node().is_call_to(PIPE)
            || !is_single_step(zipper.node())
            || continues_a_chain(zipper)
        {
            return Ok(Step::Continue);
        }
        let first = zipper.node().min_line();
        let call_lines = zipper
            .node()
            .args()
            .get(1)
            .and_then(|call| call.min_line().zip(call.max_line()));
        if let Some((start, end)) = call_lines
            && start < end
        {
            ctx.comments_mut().displace_comments(start..=end);
        }

        zipper.update(unwrap_pipe);
        if let Some(line) = first {
            move_call_to(zipper.node_mut(), line);
        }

        debug!(file = ctx.file(), line = ?first, "unwrapped single pipe");
        Ok(Step::Continue)
    }
}
