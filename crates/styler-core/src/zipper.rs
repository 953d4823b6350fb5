//! Zipper over the syntax tree
//!
//! A [`Zipper`] is a cursor holding the focused node plus a trail of
//! [`Crumb`]s describing how to rebuild every ancestor. Moving between
//! siblings and editing the focus are O(1); moving up rebuilds a single parent
//! from its shell (see [`Shell`]).
//!
//! Navigation methods move the cursor in place and return `Option<&mut Zipper>`
//! so they compose with `?` and `and_then`. `None` means there is no such
//! neighbor, and the cursor is left exactly where it was.
//!
//! ```rust
//! use styler_core::ast::Node;
//! use styler_core::zipper::Zipper;
//!
//! let tree = Node::Sequence(vec![Node::int(1), Node::int(2)]);
//! let mut zipper = Zipper::new(tree);
//! zipper.down().and_then(Zipper::right).unwrap();
//! assert_eq!(zipper.node(), &Node::int(2));
//! zipper.replace(Node::int(3));
//! assert_eq!(zipper.into_root(), Node::Sequence(vec![Node::int(1), Node::int(3)]));
//! ```

use crate::ast::{BLOCK, Meta, Node, Shell};
use crate::error::StylerError;
use crate::result::Result;

/// Traversal direction for [`Zipper::skip`] and [`Zipper::find`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Next,
    Prev,
}

/// Control value returned by traversal callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep going, descending into the current focus
    Continue,
    /// Keep going, but do not descend into the current focus
    Skip,
    /// Stop the traversal immediately
    Halt,
}

/// Ancestor context of the focused node
#[derive(Debug, Clone)]
pub struct Crumb {
    /// Left siblings in source order, so the nearest one is last
    left: Vec<Node>,
    /// The parent without its children
    parent: Shell,
    /// Right siblings in reverse source order, so the nearest one is last
    right: Vec<Node>,
    up: Option<Box<Crumb>>,
}

/// Cursor over a syntax tree
#[derive(Debug, Clone)]
pub struct Zipper {
    node: Node,
    path: Option<Box<Crumb>>,
}

impl Zipper {
    /// Zipper focused on the root of `node`
    pub fn new(node: Node) -> Self {
        Self { node, path: None }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    /// The focused node, discarding the ancestors
    pub fn into_node(self) -> Node {
        self.node
    }

    pub fn is_root(&self) -> bool {
        self.path.is_none()
    }

    /// Number of ancestors above the focus
    pub fn depth(&self) -> usize {
        std::iter::successors(self.path.as_deref(), |crumb| crumb.up.as_deref()).count()
    }

    /// Shape of the parent node, if any
    pub fn parent(&self) -> Option<&Shell> {
        self.path.as_deref().map(|crumb| &crumb.parent)
    }

    /// Siblings before the focus, in source order
    pub fn left_siblings(&self) -> &[Node] {
        self.path
            .as_deref()
            .map(|crumb| crumb.left.as_slice())
            .unwrap_or_default()
    }

    /// Siblings after the focus, in source order
    pub fn right_siblings(&self) -> impl Iterator<Item = &Node> {
        self.path
            .as_deref()
            .into_iter()
            .flat_map(|crumb| crumb.right.iter().rev())
    }

    /// Left siblings of the focus and of every ancestor, innermost level first
    pub fn enclosing_left_siblings(&self) -> impl Iterator<Item = (&Shell, &[Node])> {
        std::iter::successors(self.path.as_deref(), |crumb| crumb.up.as_deref())
            .map(|crumb| (&crumb.parent, crumb.left.as_slice()))
    }

    fn take(&mut self) -> Node {
        std::mem::replace(&mut self.node, Node::nil())
    }

    /// Move to the first child
    pub fn down(&mut self) -> Option<&mut Self> {
        if !self.node.has_children() {
            return None;
        }
        let (shell, mut right) = self.take().into_parts()?;
        right.reverse();
        match right.pop() {
            Some(first) => {
                self.node = first;
                self.path = Some(Box::new(Crumb {
                    left: Vec::new(),
                    parent: shell,
                    right,
                    up: self.path.take(),
                }));
                Some(self)
            }
            None => {
                self.node = shell.rebuild(Vec::new());
                None
            }
        }
    }

    /// Rebuild the parent and move to it
    pub fn up(&mut self) -> Option<&mut Self> {
        let crumb = self.path.take()?;
        let Crumb {
            mut left,
            parent,
            mut right,
            up,
        } = *crumb;
        left.push(self.take());
        right.reverse();
        left.append(&mut right);
        self.node = parent.rebuild(left);
        self.path = up;
        Some(self)
    }

    pub fn left(&mut self) -> Option<&mut Self> {
        let crumb = self.path.as_deref_mut()?;
        let prev = crumb.left.pop()?;
        let current = std::mem::replace(&mut self.node, prev);
        crumb.right.push(current);
        Some(self)
    }

    pub fn right(&mut self) -> Option<&mut Self> {
        let crumb = self.path.as_deref_mut()?;
        let next = crumb.right.pop()?;
        let current = std::mem::replace(&mut self.node, next);
        crumb.left.push(current);
        Some(self)
    }

    /// Move to the first sibling; a no-op when already there
    pub fn leftmost(&mut self) -> &mut Self {
        while self.left().is_some() {}
        self
    }

    /// Move to the last sibling; a no-op when already there
    pub fn rightmost(&mut self) -> &mut Self {
        while self.right().is_some() {}
        self
    }

    /// Move back to the root of the tree
    pub fn top(&mut self) -> &mut Self {
        while self.up().is_some() {}
        self
    }

    /// Rebuild and return the whole tree
    pub fn into_root(mut self) -> Node {
        self.top();
        self.node
    }

    /// Depth-first pre-order successor
    pub fn next(&mut self) -> Option<&mut Self> {
        if self.node.has_children() {
            return self.down();
        }
        self.skip_next()
    }

    /// Depth-first pre-order predecessor, the exact inverse of [`Zipper::next`]
    pub fn prev(&mut self) -> Option<&mut Self> {
        if self.left().is_some() {
            self.descend_rightmost();
            return Some(self);
        }
        self.up()
    }

    /// Like `next`/`prev` without descending into the focus
    pub fn skip(&mut self, direction: Direction) -> Option<&mut Self> {
        match direction {
            Direction::Next => self.skip_next(),
            Direction::Prev => self.skip_prev(),
        }
    }

    fn skip_next(&mut self) -> Option<&mut Self> {
        let levels = self.levels_until(|crumb| !crumb.right.is_empty())?;
        for _ in 0..levels {
            self.up();
        }
        self.right()
    }

    fn skip_prev(&mut self) -> Option<&mut Self> {
        let levels = self.levels_until(|crumb| !crumb.left.is_empty())?;
        for _ in 0..levels {
            self.up();
        }
        self.left()
    }

    /// Number of `up` moves needed to reach the nearest level matching `pred`,
    /// without moving the cursor
    fn levels_until(&self, pred: impl Fn(&Crumb) -> bool) -> Option<usize> {
        std::iter::successors(self.path.as_deref(), |crumb| crumb.up.as_deref())
            .position(pred)
    }

    fn descend_rightmost(&mut self) {
        while self.down().is_some() {
            self.rightmost();
        }
    }

    /// Visit every node of the focused subtree in pre-order
    ///
    /// The cursor ends up on the (rewritten) subtree it started on, with its
    /// ancestors untouched.
    pub fn traverse<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(&mut Zipper),
    {
        self.traverse_while(|zipper| {
            f(zipper);
            Step::Continue
        })
    }

    /// [`Zipper::traverse`] threading an accumulator
    pub fn traverse_acc<A, F>(&mut self, mut acc: A, mut f: F) -> A
    where
        F: FnMut(&mut Zipper, &mut A),
    {
        self.traverse(|zipper| f(zipper, &mut acc));
        acc
    }

    /// Pre-order traversal steered by the callback's [`Step`]
    pub fn traverse_while<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(&mut Zipper) -> Step,
    {
        let mut sub = Zipper::new(self.take());
        loop {
            let moved = match f(&mut sub) {
                Step::Continue => sub.next().is_some(),
                Step::Skip => sub.skip(Direction::Next).is_some(),
                Step::Halt => false,
            };
            if !moved {
                break;
            }
        }
        self.node = sub.into_root();
        self
    }

    /// [`Zipper::traverse_while`] threading an accumulator
    pub fn traverse_while_acc<A, F>(&mut self, mut acc: A, mut f: F) -> A
    where
        F: FnMut(&mut Zipper, &mut A) -> Step,
    {
        self.traverse_while(|zipper| f(zipper, &mut acc));
        acc
    }

    pub fn replace(&mut self, node: Node) -> &mut Self {
        self.node = node;
        self
    }

    pub fn update(&mut self, f: impl FnOnce(Node) -> Node) -> &mut Self {
        let node = self.take();
        self.node = f(node);
        self
    }

    /// Give a root focus a synthetic block parent so it can have siblings
    fn ensure_parent(&mut self) -> &mut Crumb {
        self.path.get_or_insert_with(|| {
            Box::new(Crumb {
                left: Vec::new(),
                parent: Shell::Call {
                    head: Box::new(Node::atom(BLOCK)),
                    meta: Meta::default(),
                },
                right: Vec::new(),
                up: None,
            })
        })
    }

    pub fn insert_left(&mut self, node: Node) -> &mut Self {
        self.ensure_parent().left.push(node);
        self
    }

    pub fn insert_right(&mut self, node: Node) -> &mut Self {
        self.ensure_parent().right.push(node);
        self
    }

    /// Insert `child` as the first child of the focus
    ///
    /// Returns `None` (dropping `child`) when the focus is a leaf.
    pub fn insert_child(&mut self, child: Node) -> Option<&mut Self> {
        self.edit_children(|children| children.insert(0, child))
    }

    /// Insert `child` as the last child of the focus
    ///
    /// Returns `None` (dropping `child`) when the focus is a leaf.
    pub fn append_child(&mut self, child: Node) -> Option<&mut Self> {
        self.edit_children(|children| children.push(child))
    }

    fn edit_children(&mut self, edit: impl FnOnce(&mut Vec<Node>)) -> Option<&mut Self> {
        if matches!(self.node, Node::Leaf(_)) {
            return None;
        }
        let (shell, mut children) = self.take().into_parts()?;
        edit(&mut children);
        self.node = shell.rebuild(children);
        Some(self)
    }

    /// Delete the focus and move to the previous node in pre-order
    ///
    /// Fails when the focus is the root: there is nothing to move to.
    pub fn remove(&mut self) -> Result<&mut Self> {
        let crumb = self
            .path
            .as_deref_mut()
            .ok_or_else(|| StylerError::invalid_operation("cannot remove the root node"))?;

        if let Some(prev) = crumb.left.pop() {
            self.node = prev;
            self.descend_rightmost();
            return Ok(self);
        }

        let Some(crumb) = self.path.take() else {
            return Err(StylerError::internal_error("zipper path vanished during remove"));
        };
        let Crumb {
            parent,
            mut right,
            up,
            ..
        } = *crumb;
        right.reverse();
        self.node = parent.rebuild(right);
        self.path = up;
        Ok(self)
    }

    /// Walk from the current position (inclusive) until `pred` matches
    pub fn find<P>(&mut self, direction: Direction, mut pred: P) -> Option<&mut Self>
    where
        P: FnMut(&Node) -> bool,
    {
        loop {
            if pred(&self.node) {
                return Some(self);
            }
            let moved = match direction {
                Direction::Next => self.next().is_some(),
                Direction::Prev => self.prev().is_some(),
            };
            if !moved {
                return None;
            }
        }
    }
}
