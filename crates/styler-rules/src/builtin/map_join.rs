//! `Enum.map` followed by `Enum.join` becomes `Enum.map_join`
//!
//! Handles the three spellings:
//!
//! ```text
//! x |> Enum.map(f) |> Enum.join(sep)   =>  x |> Enum.map_join(sep, f)
//! Enum.map(x, f) |> Enum.join(sep)     =>  Enum.map_join(x, sep, f)
//! Enum.join(Enum.map(x, f), sep)       =>  Enum.map_join(x, sep, f)
//! ```
//!
//! The separator is optional in every form. Only the `Enum.join` step
//! disappears, so only the comments on its lines move, onto the last line of
//! the `Enum.map` step.

use std::ops::RangeInclusive;

use super::{into_remote_parts, remote_call_args};
use styler_core::ast::PIPE;
use styler_core::{Context, Meta, Node, Result, Rule, Step, Zipper};
use tracing::debug;

/// Rule ID for the map/join merge
pub const MAP_JOIN: &str = "map_join";

const ENUM: &[&str] = &["Enum"];

#[derive(Debug, Default)]
pub struct MapJoin;

fn enum_call<'a>(node: &'a Node, fun: &str) -> Option<&'a [Node]> {
    remote_call_args(node, ENUM, fun)
}

fn is_join(node: &Node, arity: usize) -> bool {
    enum_call(node, "join").is_some_and(|args| args.len() <= arity)
}

fn is_map(node: &Node, arity: usize) -> bool {
    enum_call(node, "map").is_some_and(|args| args.len() == arity)
}

/// Which of the three spellings `node` is, if any
fn shape(node: &Node) -> Option<Shape> {
    if node.is_call_to(PIPE) {
        let [lhs, rhs] = node.args() else {
            return None;
        };
        if !is_join(rhs, 1) {
            return None;
        }
        if lhs.is_call_to(PIPE) && lhs.args().get(1).is_some_and(|step| is_map(step, 1)) {
            return Some(Shape::PipedMap);
        }
        if is_map(lhs, 2) {
            return Some(Shape::PipedJoin);
        }
        return None;
    }
    match enum_call(node, "join")? {
        [first, ..] if node.args().len() <= 2 && is_map(first, 2) => Some(Shape::Nested),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    PipedMap,
    PipedJoin,
    Nested,
}

/// The last line of the `Enum.map` step and the lines of the `Enum.join` step
/// folded into it
fn joined_lines(node: &Node, shape: Shape) -> Option<(u32, RangeInclusive<u32>)> {
    let [lhs, join] = node.args() else {
        return None;
    };
    let map = match shape {
        Shape::PipedMap => lhs.args().get(1)?,
        Shape::PipedJoin => lhs,
        Shape::Nested => return None,
    };
    Some((map.max_line()?, join.min_line()?..=join.max_line()?))
}

/// `Enum.map_join(subject?, separator?, mapper)`
fn map_join(meta: Meta, subject: Option<Node>, separator: Option<Node>, mapper: Node) -> Node {
    let args = subject.into_iter().chain(separator).chain([mapper]).collect();
    Node::remote_call(Node::aliases(ENUM, meta), "map_join", meta, args)
}

fn split_map(map: Node) -> Option<(Meta, Vec<Node>)> {
    let (_, _, meta, args) = into_remote_parts(map)?;
    Some((meta, args))
}

fn rewrite(node: Node, shape: Shape) -> Option<Node> {
    let Node::Call { head, meta, args } = node else {
        return None;
    };
    match shape {
        Shape::PipedMap => {
            let [lhs, join] = <[Node; 2]>::try_from(args).ok()?;
            let Node::Call { args: inner, .. } = lhs else {
                return None;
            };
            let [subject, map] = <[Node; 2]>::try_from(inner).ok()?;
            let (map_meta, mut map_args) = split_map(map)?;
            let mapper = map_args.pop()?;
            let separator = split_map(join)?.1.into_iter().next();
            let merged = map_join(map_meta, None, separator, mapper);
            Some(Node::Call {
                head,
                meta,
                args: vec![subject, merged],
            })
        }
        Shape::PipedJoin => {
            let [map, join] = <[Node; 2]>::try_from(args).ok()?;
            let (map_meta, map_args) = split_map(map)?;
            let [subject, mapper] = <[Node; 2]>::try_from(map_args).ok()?;
            let separator = split_map(join)?.1.into_iter().next();
            Some(map_join(map_meta, Some(subject), separator, mapper))
        }
        Shape::Nested => {
            let mut join_args = args.into_iter();
            let map = join_args.next()?;
            let separator = join_args.next();
            let (_, map_args) = split_map(map)?;
            let [subject, mapper] = <[Node; 2]>::try_from(map_args).ok()?;
            Some(map_join(meta, Some(subject), separator, mapper))
        }
    }
}

impl Rule for MapJoin {
    fn id(&self) -> &'static str {
        MAP_JOIN
    }

    fn description(&self) -> &'static str {
        "Merge Enum.map followed by Enum.join into Enum.map_join"
    }

    fn run(&self, zipper: &mut Zipper, ctx: &mut Context<'_>) -> Result<Step> {
        let Some(shape) = shape(zipper.node()) else {
            return Ok(Step::Continue);
        };
        if ctx.alias_env(zipper).contains("Enum") {
            return Ok(Step::Continue);
        }

        let folded = joined_lines(zipper.node(), shape);
        let line = zipper.node().line();
        let original = zipper.node().clone();
        let Some(merged) = rewrite(original, shape) else {
            return Ok(Step::Continue);
        };
        if let Some((into, join_lines)) = folded
            && into < *join_lines.start()
            && let Ok(distance) = i32::try_from(join_lines.start() - into)
        {
            ctx.comments_mut().shift_comments(join_lines, -distance);
        }

        debug!(file = ctx.file(), ?shape, line = ?line, "merged map and join");
        zipper.replace(merged);
        Ok(Step::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use styler_core::{Comment, CommentStore, Config, RuleEngine, SourceFile};

    fn enum_fn(fun: &str, line: u32, args: Vec<Node>) -> Node {
        Node::remote_call(Node::aliases(&["Enum"], Meta::at(line)), fun, Meta::at(line), args)
    }

    fn run(ast: Node, comments: CommentStore) -> SourceFile {
        let engine = RuleEngine::new(vec![Box::new(MapJoin)]);
        engine
            .rewrite(SourceFile::new("lib/a.ex", ast, comments), &Config::default())
            .unwrap()
    }

    #[test]
    fn test_piped_map_then_join() {
        let ast = Node::pipe(
            Node::pipe(
                Node::ident("xs"),
                enum_fn("map", 2, vec![Node::ident("f")]),
                Meta::at(2),
            ),
            enum_fn("join", 3, vec![Node::string(",")]),
            Meta::at(3),
        );
        let mut comments = CommentStore::default();
        comments.push(Comment::new(3, "# joined"));

        let out = run(ast, comments);
        assert_eq!(out.ast.to_string(), "xs |> Enum.map_join(\",\", f)");
        assert_eq!(out.comments.lines(), vec![2]);
    }

    #[test]
    fn test_comments_on_earlier_steps_stay_put() {
        let chain = [("b", 2), ("c", 3)]
            .into_iter()
            .fold(Node::ident("a"), |lhs, (fun, line)| {
                Node::pipe(lhs, Node::call(fun, Meta::at(line), vec![]), Meta::at(line))
            });
        let ast = Node::pipe(
            Node::pipe(chain, enum_fn("map", 4, vec![Node::ident("f")]), Meta::at(4)),
            enum_fn("join", 5, vec![Node::string(",")]),
            Meta::at(5),
        );
        let comments = CommentStore::new(vec![
            Comment::new(3, "# about c"),
            Comment::new(5, "# joined"),
        ]);

        let out = run(ast, comments);
        assert_eq!(out.ast.to_string(), "a |> b() |> c() |> Enum.map_join(\",\", f)");
        let placed: Vec<(u32, &str)> = out
            .comments
            .iter()
            .map(|c| (c.line, c.text.as_str()))
            .collect();
        assert_eq!(placed, vec![(3, "# about c"), (4, "# joined")]);
    }

    #[test]
    fn test_multi_line_mapper_keeps_its_comments() {
        let mapper = Node::call(
            "fn",
            Meta::at(1).with_end_line(4),
            vec![Node::call("format", Meta::at(3), vec![])],
        );
        let ast = Node::pipe(
            enum_fn("map", 1, vec![Node::ident("xs"), mapper]),
            enum_fn("join", 5, vec![]),
            Meta::at(5),
        );
        let comments = CommentStore::new(vec![
            Comment::new(2, "# inside fn"),
            Comment::new(5, "# joined"),
        ]);

        let out = run(ast, comments);
        assert_eq!(out.comments.lines(), vec![2, 4]);
    }

    #[test]
    fn test_map_call_piped_into_join_without_separator() {
        let ast = Node::pipe(
            enum_fn("map", 1, vec![Node::ident("xs"), Node::ident("f")]),
            enum_fn("join", 1, vec![]),
            Meta::at(1),
        );
        assert_eq!(run(ast, CommentStore::default()).ast.to_string(), "Enum.map_join(xs, f)");
    }

    #[test]
    fn test_nested_join_of_map() {
        let ast = enum_fn(
            "join",
            1,
            vec![
                enum_fn("map", 1, vec![Node::ident("xs"), Node::ident("f")]),
                Node::string("-"),
            ],
        );
        assert_eq!(
            run(ast, CommentStore::default()).ast.to_string(),
            "Enum.map_join(xs, \"-\", f)"
        );
    }

    #[test]
    fn test_other_calls_are_untouched() {
        let ast = Node::pipe(
            enum_fn("filter", 1, vec![Node::ident("xs"), Node::ident("f")]),
            enum_fn("join", 1, vec![]),
            Meta::at(1),
        );
        let rendered = ast.to_string();
        assert_eq!(run(ast, CommentStore::default()).ast.to_string(), rendered);
    }
}
