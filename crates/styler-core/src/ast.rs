//! Generic syntax tree
//!
//! The tree mirrors the quoted form of the host language with four shapes:
//!
//! - [`Node::Leaf`] - a literal value (atom, identifier, number, string, ...)
//! - [`Node::Sequence`] - an ordered list of nodes
//! - [`Node::Pair`] - a fixed two element tuple, used for keyword entries
//! - [`Node::Call`] - `head(args...)` with line metadata
//!
//! A handful of call heads carry structural meaning:
//!
//! ```text
//! __aliases__(:A, :B)        A.B           module path
//! .(A.B, :fun)(x)            A.B.fun(x)    qualified call, head is itself a call
//! __block__(a, b)            a; b          statement block
//! |>(x, f())                 x |> f()      pipe
//! ```
//!
//! Children are extracted and replaced with a per-shape rule (see [`Shell`]):
//! sequences use their items, pairs their two elements, and calls their
//! arguments, prefixed by the head when the head is itself a call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Head of a statement block
pub const BLOCK: &str = "__block__";
/// Head of a module path
pub const ALIASES: &str = "__aliases__";
/// Head of a qualified call target
pub const DOT: &str = ".";
/// Head of a pipe
pub const PIPE: &str = "|>";
/// Head of a module attribute
pub const ATTRIBUTE: &str = "@";

/// Literal values stored in leaves
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Atom(String),
    /// A variable or bare name
    Identifier(String),
    Integer(i64),
    String(String),
    Boolean(bool),
    Nil,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Atom(name) => write!(f, ":{name}"),
            Literal::Identifier(name) => f.write_str(name),
            Literal::Integer(value) => write!(f, "{value}"),
            Literal::String(value) => write!(f, "{value:?}"),
            Literal::Boolean(value) => write!(f, "{value}"),
            Literal::Nil => f.write_str("nil"),
        }
    }
}

/// Positional metadata attached to calls
///
/// Every field is optional: synthesized nodes usually carry no position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Line of the closing parenthesis or bracket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_line: Option<u32>,
    /// Line of the `end` keyword of a do-block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
}

impl Meta {
    /// Metadata pointing at a single line
    pub fn at(line: u32) -> Self {
        Self {
            line: Some(line),
            ..Self::default()
        }
    }

    pub fn with_closing_line(mut self, line: u32) -> Self {
        self.closing_line = Some(line);
        self
    }

    pub fn with_end_line(mut self, line: u32) -> Self {
        self.end_line = Some(line);
        self
    }

    /// Largest line mentioned by this metadata
    pub fn max_line(&self) -> Option<u32> {
        [self.line, self.closing_line, self.end_line]
            .into_iter()
            .flatten()
            .max()
    }
}

/// A syntax tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Leaf(Literal),
    Sequence(Vec<Node>),
    Pair(Box<Node>, Box<Node>),
    Call {
        head: Box<Node>,
        meta: Meta,
        args: Vec<Node>,
    },
}

/// A node with its children taken out
///
/// `Shell::rebuild` is the exact inverse of [`Node::into_parts`]: feeding back
/// the same children reproduces the original node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shell {
    Sequence,
    Pair,
    /// A call whose head is its first child. The original head is kept so
    /// the call can still be rebuilt if every child has been removed.
    QualifiedCall { head: Box<Node>, meta: Meta },
    Call { head: Box<Node>, meta: Meta },
}

impl Shell {
    /// Rebuild a node of this shape from a list of children
    ///
    /// A pair only stays a pair with exactly two children; any other count
    /// degrades to a sequence.
    pub fn rebuild(self, children: Vec<Node>) -> Node {
        match self {
            Shell::Sequence => Node::Sequence(children),
            Shell::Pair => match <[Node; 2]>::try_from(children) {
                Ok([left, right]) => Node::Pair(Box::new(left), Box::new(right)),
                Err(children) => Node::Sequence(children),
            },
            Shell::QualifiedCall { head, meta } => {
                let mut iter = children.into_iter();
                match iter.next() {
                    Some(new_head) => Node::Call {
                        head: Box::new(new_head),
                        meta,
                        args: iter.collect(),
                    },
                    None => Node::Call {
                        head,
                        meta,
                        args: Vec::new(),
                    },
                }
            }
            Shell::Call { head, meta } => Node::Call {
                head,
                meta,
                args: children,
            },
        }
    }

    /// Whether this shell is a call to the given local name
    pub fn is_call_to(&self, name: &str) -> bool {
        match self {
            Shell::Call { head, .. } => head.atom_name() == Some(name),
            _ => false,
        }
    }
}

impl Node {
    pub fn atom(name: impl Into<String>) -> Self {
        Node::Leaf(Literal::Atom(name.into()))
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Node::Leaf(Literal::Identifier(name.into()))
    }

    pub fn int(value: i64) -> Self {
        Node::Leaf(Literal::Integer(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::Leaf(Literal::String(value.into()))
    }

    pub fn nil() -> Self {
        Node::Leaf(Literal::Nil)
    }

    pub fn pair(left: Node, right: Node) -> Self {
        Node::Pair(Box::new(left), Box::new(right))
    }

    /// Local call `name(args...)`
    pub fn call(name: impl Into<String>, meta: Meta, args: Vec<Node>) -> Self {
        Node::Call {
            head: Box::new(Node::atom(name)),
            meta,
            args,
        }
    }

    /// Module path `A.B.C`
    pub fn aliases<S: AsRef<str>>(segments: &[S], meta: Meta) -> Self {
        Node::call(
            ALIASES,
            meta,
            segments.iter().map(|s| Node::atom(s.as_ref())).collect(),
        )
    }

    /// Qualified call `receiver.fun(args...)`
    pub fn remote_call(receiver: Node, fun: impl Into<String>, meta: Meta, args: Vec<Node>) -> Self {
        Node::Call {
            head: Box::new(Node::call(DOT, meta, vec![receiver, Node::atom(fun)])),
            meta,
            args,
        }
    }

    pub fn block(meta: Meta, statements: Vec<Node>) -> Self {
        Node::call(BLOCK, meta, statements)
    }

    pub fn pipe(lhs: Node, rhs: Node, meta: Meta) -> Self {
        Node::call(PIPE, meta, vec![lhs, rhs])
    }

    /// Keyword list `[key: value, ...]`
    pub fn keyword<K: Into<String>>(entries: Vec<(K, Node)>) -> Self {
        Node::Sequence(
            entries
                .into_iter()
                .map(|(key, value)| Node::pair(Node::atom(key), value))
                .collect(),
        )
    }

    /// Declaration `alias A.B.C`
    pub fn alias_declaration<S: AsRef<str>>(segments: &[S], meta: Meta) -> Self {
        Node::call("alias", meta, vec![Node::aliases(segments, meta)])
    }

    /// Statements of a block, or the node itself when it is a single expression
    pub fn into_statements(self) -> Vec<Node> {
        match self {
            Node::Call { head, args, .. } if head.atom_name() == Some(BLOCK) => args,
            other => vec![other],
        }
    }

    /// Inverse of [`Node::into_statements`]
    pub fn from_statements(meta: Meta, mut statements: Vec<Node>) -> Self {
        if statements.len() == 1 {
            statements.remove(0)
        } else {
            Node::block(meta, statements)
        }
    }

    pub fn meta(&self) -> Option<&Meta> {
        match self {
            Node::Call { meta, .. } => Some(meta),
            _ => None,
        }
    }

    pub fn meta_mut(&mut self) -> Option<&mut Meta> {
        match self {
            Node::Call { meta, .. } => Some(meta),
            _ => None,
        }
    }

    /// Line of this node's own metadata
    pub fn line(&self) -> Option<u32> {
        self.meta().and_then(|meta| meta.line)
    }

    /// Set this node's own line; a no-op for nodes without metadata
    pub fn set_line(&mut self, line: u32) {
        if let Some(meta) = self.meta_mut() {
            meta.line = Some(line);
        }
    }

    /// Largest line recorded anywhere in this subtree
    pub fn max_line(&self) -> Option<u32> {
        self.preorder()
            .into_iter()
            .filter_map(|node| node.meta().and_then(Meta::max_line))
            .max()
    }

    /// Smallest line recorded anywhere in this subtree
    pub fn min_line(&self) -> Option<u32> {
        self.preorder()
            .into_iter()
            .filter_map(|node| node.line())
            .min()
    }

    /// Move every position in this subtree onto a single line
    pub fn set_line_recursive(&mut self, line: u32) {
        self.walk_mut(&mut |node| {
            if let Some(meta) = node.meta_mut() {
                meta.line = meta.line.map(|_| line);
                meta.closing_line = meta.closing_line.map(|_| line);
                meta.end_line = meta.end_line.map(|_| line);
            }
        });
    }

    /// Move every position in this subtree `delta` lines down
    pub fn shift_lines(&mut self, delta: u32) {
        self.walk_mut(&mut |node| {
            if let Some(meta) = node.meta_mut() {
                for line in [&mut meta.line, &mut meta.closing_line, &mut meta.end_line] {
                    *line = line.map(|line| line.saturating_add(delta));
                }
            }
        });
    }

    /// Name of an atom leaf
    pub fn atom_name(&self) -> Option<&str> {
        match self {
            Node::Leaf(Literal::Atom(name)) => Some(name),
            _ => None,
        }
    }

    /// Name of a local call, i.e. a call whose head is an atom
    pub fn call_name(&self) -> Option<&str> {
        match self {
            Node::Call { head, .. } => head.atom_name(),
            _ => None,
        }
    }

    pub fn is_call_to(&self, name: &str) -> bool {
        self.call_name() == Some(name)
    }

    pub fn args(&self) -> &[Node] {
        match self {
            Node::Call { args, .. } => args,
            _ => &[],
        }
    }

    pub fn args_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Call { args, .. } => Some(args),
            _ => None,
        }
    }

    /// Segments of a module path node, e.g. `["A", "B"]` for `A.B`
    pub fn alias_segments(&self) -> Option<Vec<&str>> {
        if !self.is_call_to(ALIASES) {
            return None;
        }
        self.args().iter().map(Node::atom_name).collect()
    }

    /// Module path and function name of a qualified call `A.B.fun(...)`
    pub fn remote_target(&self) -> Option<(Vec<&str>, &str)> {
        let Node::Call { head, .. } = self else {
            return None;
        };
        if !head.is_call_to(DOT) {
            return None;
        }
        match head.args() {
            [receiver, fun] => Some((receiver.alias_segments()?, fun.atom_name()?)),
            _ => None,
        }
    }

    /// Value stored under `key` in a keyword list
    pub fn keyword_get(&self, key: &str) -> Option<&Node> {
        let Node::Sequence(items) = self else {
            return None;
        };
        items.iter().find_map(|item| match item {
            Node::Pair(k, v) if k.atom_name() == Some(key) => Some(v.as_ref()),
            _ => None,
        })
    }

    /// Body of a `do` block given as the trailing keyword argument of a call
    pub fn do_body(&self) -> Option<&Node> {
        self.args().last()?.keyword_get("do")
    }

    pub fn do_body_mut(&mut self) -> Option<&mut Node> {
        let Node::Sequence(items) = self.args_mut()?.last_mut()? else {
            return None;
        };
        items.iter_mut().find_map(|item| match item {
            Node::Pair(k, v) if k.atom_name() == Some("do") => Some(v.as_mut()),
            _ => None,
        })
    }

    /// Children in zipper order
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Leaf(_) => Vec::new(),
            Node::Sequence(items) => items.iter().collect(),
            Node::Pair(left, right) => vec![left.as_ref(), right.as_ref()],
            Node::Call { head, args, .. } => {
                if matches!(head.as_ref(), Node::Call { .. }) {
                    std::iter::once(head.as_ref()).chain(args.iter()).collect()
                } else {
                    args.iter().collect()
                }
            }
        }
    }

    pub fn has_children(&self) -> bool {
        match self {
            Node::Leaf(_) => false,
            Node::Sequence(items) => !items.is_empty(),
            Node::Pair(..) => true,
            Node::Call { head, args, .. } => {
                matches!(head.as_ref(), Node::Call { .. }) || !args.is_empty()
            }
        }
    }

    /// Split a node into its shape and children; leaves cannot hold children
    pub fn into_parts(self) -> Option<(Shell, Vec<Node>)> {
        match self {
            Node::Leaf(_) => None,
            Node::Sequence(items) => Some((Shell::Sequence, items)),
            Node::Pair(left, right) => Some((Shell::Pair, vec![*left, *right])),
            Node::Call { head, meta, args } => {
                if matches!(head.as_ref(), Node::Call { .. }) {
                    let fallback = head.clone();
                    let mut children = Vec::with_capacity(args.len() + 1);
                    children.push(*head);
                    children.extend(args);
                    Some((
                        Shell::QualifiedCall {
                            head: fallback,
                            meta,
                        },
                        children,
                    ))
                } else {
                    Some((Shell::Call { head, meta }, args))
                }
            }
        }
    }

    /// Reference recursive pre-order enumeration
    pub fn preorder(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children().into_iter().rev());
        }
        out
    }

    /// Pre-order mutable walk
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        match self {
            Node::Leaf(_) => {}
            Node::Sequence(items) => items.iter_mut().for_each(|item| item.walk_mut(f)),
            Node::Pair(left, right) => {
                left.walk_mut(f);
                right.walk_mut(f);
            }
            Node::Call { head, args, .. } => {
                if matches!(head.as_ref(), Node::Call { .. }) {
                    head.walk_mut(f);
                }
                args.iter_mut().for_each(|arg| arg.walk_mut(f));
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, nodes: &[Node], sep: &str) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{node}")?;
    }
    Ok(())
}

/// Compact source-like rendering for diagnostics and tests
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(literal) => write!(f, "{literal}"),
            Node::Sequence(items) => {
                let keywords: Option<Vec<(&str, &Node)>> = items
                    .iter()
                    .map(|item| match item {
                        Node::Pair(k, v) => Some((k.atom_name()?, v.as_ref())),
                        _ => None,
                    })
                    .collect();
                match keywords {
                    Some(entries) if !entries.is_empty() => {
                        f.write_str("[")?;
                        for (i, (key, value)) in entries.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            write!(f, "{key}: {value}")?;
                        }
                        f.write_str("]")
                    }
                    _ => {
                        f.write_str("[")?;
                        write_joined(f, items, ", ")?;
                        f.write_str("]")
                    }
                }
            }
            Node::Pair(left, right) => write!(f, "{{{left}, {right}}}"),
            Node::Call { head, args, .. } => {
                if let Some(segments) = self.alias_segments() {
                    return f.write_str(&segments.join("."));
                }
                match (head.atom_name(), args.as_slice()) {
                    (Some(BLOCK), _) => {
                        f.write_str("(")?;
                        write_joined(f, args, "; ")?;
                        f.write_str(")")
                    }
                    (Some(PIPE), [lhs, rhs]) => write!(f, "{lhs} |> {rhs}"),
                    (Some(ATTRIBUTE), [attr]) => write!(f, "@{attr}"),
                    (Some(name), _) => {
                        write!(f, "{name}(")?;
                        write_joined(f, args, ", ")?;
                        f.write_str(")")
                    }
                    (None, _) => {
                        let dotted = match head.args() {
                            [receiver, fun] if head.is_call_to(DOT) => {
                                fun.atom_name().map(|name| (receiver, name))
                            }
                            _ => None,
                        };
                        match dotted {
                            Some((receiver, name)) => write!(f, "{receiver}.{name}")?,
                            None => write!(f, "{head}")?,
                        }
                        f.write_str("(")?;
                        write_joined(f, args, ", ")?;
                        f.write_str(")")
                    }
                }
            }
        }
    }
}
