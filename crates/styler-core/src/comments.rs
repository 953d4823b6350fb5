//! Line-anchored comment store
//!
//! Comments live beside the tree, keyed only by line. Whenever a rewrite
//! folds several lines into one or moves code around, the matching comments
//! have to be relocated here so they still sit next to the code they describe.
//!
//! The store is always ordered by ascending line. Comments sharing a line
//! keep their relative order through every operation, and no operation ever
//! drops a comment.

use serde::{Deserialize, Serialize};
use std::ops::{Range, RangeInclusive};

/// A single comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub line: u32,
    pub text: String,
}

impl Comment {
    pub fn new(line: u32, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }
}

/// Ordered collection of comments for one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentStore {
    comments: Vec<Comment>,
}

impl CommentStore {
    /// Create a store, ordering the comments by line
    pub fn new(mut comments: Vec<Comment>) -> Self {
        comments.sort_by_key(|comment| comment.line);
        Self { comments }
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter()
    }

    pub fn as_slice(&self) -> &[Comment] {
        &self.comments
    }

    pub fn into_vec(self) -> Vec<Comment> {
        self.comments
    }

    /// Lines of every comment, in store order
    pub fn lines(&self) -> Vec<u32> {
        self.comments.iter().map(|comment| comment.line).collect()
    }

    /// Insert a comment after any existing comments on the same line
    pub fn push(&mut self, comment: Comment) {
        let at = self.comments.partition_point(|c| c.line <= comment.line);
        self.comments.insert(at, comment);
    }

    /// Comments whose line falls within `range`
    pub fn lines_in(&self, range: RangeInclusive<u32>) -> impl Iterator<Item = &Comment> {
        self.comments
            .iter()
            .filter(move |comment| range.contains(&comment.line))
    }

    /// Index range of the comment run sitting directly above `line`
    ///
    /// The run is contiguous: it starts on `line - 1` and extends upward one
    /// line at a time. Several comments on the same line all belong to it. The
    /// first line without a comment ends the run.
    pub fn preceding_range(&self, line: u32) -> Range<usize> {
        let end = self.comments.partition_point(|c| c.line < line);
        let mut start = end;
        let mut expected = line;
        while start > 0 {
            let candidate = self.comments[start - 1].line;
            if expected.checked_sub(1) == Some(candidate) || candidate == expected {
                expected = candidate;
                start -= 1;
            } else {
                break;
            }
        }
        start..end
    }

    /// The comment run sitting directly above `line`
    pub fn preceding(&self, line: u32) -> &[Comment] {
        &self.comments[self.preceding_range(line)]
    }

    /// Move every comment inside `range` onto its first line
    ///
    /// Used when the code spanning `range` collapses onto a single line.
    pub fn displace_comments(&mut self, range: RangeInclusive<u32>) {
        let first = *range.start();
        for comment in &mut self.comments {
            if range.contains(&comment.line) {
                comment.line = first;
            }
        }
    }

    /// Add `delta` to the line of every comment inside `range`
    ///
    /// Comments outside `range`, including the ones after it, do not move.
    pub fn shift_comments(&mut self, range: RangeInclusive<u32>, delta: i32) {
        for comment in &mut self.comments {
            if range.contains(&comment.line) {
                comment.line = comment.line.saturating_add_signed(delta);
            }
        }
        self.sort();
    }

    /// Set the line of the comment at `index`
    ///
    /// The store may be out of order afterwards until [`CommentStore::sort`]
    /// is called.
    pub fn set_line(&mut self, index: usize, line: u32) {
        if let Some(comment) = self.comments.get_mut(index) {
            comment.line = line;
        }
    }

    /// Restore line order, keeping the relative order of equal lines
    pub fn sort(&mut self) {
        self.comments.sort_by_key(|comment| comment.line);
    }
}

impl From<Vec<Comment>> for CommentStore {
    fn from(comments: Vec<Comment>) -> Self {
        Self::new(comments)
    }
}

impl<'a> IntoIterator for &'a CommentStore {
    type Item = &'a Comment;
    type IntoIter = std::slice::Iter<'a, Comment>;

    fn into_iter(self) -> Self::IntoIter {
        self.comments.iter()
    }
}
