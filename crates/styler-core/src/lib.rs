//! Styler Core
//!
//! Tree-rewriting core of the styler source restyler. It provides the syntax
//! tree and its zipper, the line-anchored comment store, alias environments,
//! line fixup and the engine that runs rewrite rules over parsed files.
//!
//! Parsing and printing happen outside this crate: callers hand in a
//! [`SourceFile`] and get a rewritten one back.

pub mod alias_env;
pub mod ast;
pub mod comments;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fixup;
pub mod result;
pub mod zipper;

// Re-export commonly used types
pub use alias_env::AliasEnv;
pub use ast::{Literal, Meta, Node, Shell};
pub use comments::{Comment, CommentStore};
pub use config::{Config, parse_version};
pub use dispatch::{Context, Rule, RuleEngine, SourceFile};
pub use error::{ErrorKind, StylerError};
pub use fixup::{fix_block_lines, fix_line_numbers};
pub use result::{Result, ResultExt};
pub use zipper::{Direction, Step, Zipper};
