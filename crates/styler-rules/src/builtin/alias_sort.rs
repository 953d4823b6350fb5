//! Alias sorting
//!
//! Orders each run of consecutive `alias A.B` declarations alphabetically and
//! drops exact duplicates. Comments directly above a declaration, and those
//! trailing it on the same line, travel with it.

use std::ops::Range;
use styler_core::ast::BLOCK;
use styler_core::{CommentStore, Context, Node, Result, Rule, Step, Zipper};
use tracing::debug;

/// Rule ID for alias sorting
pub const ALIAS_SORT: &str = "alias_sort";

#[derive(Debug, Default)]
pub struct AliasSort;

/// `alias A.B` with no options
fn is_plain_alias(node: &Node) -> bool {
    node.is_call_to("alias")
        && matches!(node.args(), [target] if target.alias_segments().is_some())
}

fn sort_key(declaration: &Node) -> (String, String) {
    let path = declaration
        .args()
        .first()
        .and_then(Node::alias_segments)
        .unwrap_or_default()
        .join(".");
    (path.to_lowercase(), path)
}

/// Index ranges of runs of two or more plain aliases
fn alias_runs(statements: &[Node]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < statements.len() {
        if !is_plain_alias(&statements[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < statements.len() && is_plain_alias(&statements[i]) {
            i += 1;
        }
        if i - start >= 2 {
            runs.push(start..i);
        }
    }
    runs
}

/// A declaration with the comment indices that move with it
struct Entry {
    key: (String, String),
    declaration: Node,
    above: Vec<usize>,
    trailing: Vec<usize>,
}

fn attached_comments(comments: &CommentStore, line: u32, floor: u32) -> (Vec<usize>, Vec<usize>) {
    let all = comments.as_slice();
    let above = comments
        .preceding_range(line)
        .filter(|&i| all[i].line > floor)
        .collect();
    let trailing = all
        .iter()
        .enumerate()
        .filter(|(_, comment)| comment.line == line)
        .map(|(i, _)| i)
        .collect();
    (above, trailing)
}

/// Sort one run, moving its comments; returns the new declarations
fn sort_run(run: Vec<Node>, floor: u32, comments: &mut CommentStore) -> Vec<Node> {
    let lines: Option<Vec<u32>> = run.iter().map(Node::line).collect();

    let mut bound = floor;
    let mut entries: Vec<Entry> = run
        .into_iter()
        .enumerate()
        .map(|(i, declaration)| {
            let (above, trailing) = match lines.as_ref().map(|lines| lines[i]) {
                Some(line) => {
                    let attached = attached_comments(comments, line, bound);
                    bound = line;
                    attached
                }
                None => Default::default(),
            };
            Entry {
                key: sort_key(&declaration),
                declaration,
                above,
                trailing,
            }
        })
        .collect();

    entries.sort_by(|a, b| a.key.cmp(&b.key));
    let mut deduped: Vec<Entry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match deduped.last_mut() {
            Some(kept) if kept.key == entry.key => {
                kept.above.extend(entry.above);
                kept.trailing.extend(entry.trailing);
            }
            _ => deduped.push(entry),
        }
    }

    if let Some(lines) = lines {
        let first_comment = deduped
            .iter()
            .flat_map(|entry| entry.above.iter())
            .map(|&i| comments.as_slice()[i].line)
            .min();
        let mut cursor = lines
            .iter()
            .copied()
            .chain(first_comment)
            .min()
            .unwrap_or_default();
        for entry in &mut deduped {
            for &i in &entry.above {
                comments.set_line(i, cursor);
                cursor += 1;
            }
            entry.declaration.set_line_recursive(cursor);
            for &i in &entry.trailing {
                comments.set_line(i, cursor);
            }
            cursor += 1;
        }
    }

    deduped.into_iter().map(|entry| entry.declaration).collect()
}

impl Rule for AliasSort {
    fn id(&self) -> &'static str {
        ALIAS_SORT
    }

    fn description(&self) -> &'static str {
        "Sort consecutive alias declarations alphabetically"
    }

    fn run(&self, zipper: &mut Zipper, ctx: &mut Context<'_>) -> Result<Step> {
        if !zipper.node().is_call_to(BLOCK) {
            return Ok(Step::Continue);
        }
        let runs: Vec<Range<usize>> = alias_runs(zipper.node().args())
            .into_iter()
            .filter(|run| {
                let keys: Vec<_> = zipper.node().args()[run.clone()].iter().map(sort_key).collect();
                !keys.windows(2).all(|pair| pair[0] < pair[1])
            })
            .collect();
        if runs.is_empty() {
            return Ok(Step::Continue);
        }

        let file = ctx.file().to_string();
        let comments = ctx.comments_mut();
        if let Some(statements) = zipper.node_mut().args_mut() {
            // back to front so earlier ranges stay valid when duplicates go
            for run in runs.into_iter().rev() {
                let floor = run
                    .start
                    .checked_sub(1)
                    .and_then(|prev| statements[prev].max_line())
                    .unwrap_or_default();
                let original: Vec<Node> = statements.drain(run.clone()).collect();
                let count = original.len();
                let sorted = sort_run(original, floor, comments);
                debug!(file = %file, from = count, to = sorted.len(), "sorted alias run");
                statements.splice(run.start..run.start, sorted);
            }
        }
        comments.sort();
        Ok(Step::Continue)
    }
}
