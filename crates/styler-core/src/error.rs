//! Error types and handling for restyling operations

use thiserror::Error;

/// Main error type for restyling operations
///
/// Ordinary "nothing there" outcomes (no sibling, no parent, no match) are
/// `Option::None`, never an error. The variants below are reserved for
/// broken preconditions and rule failures.
#[derive(Debug, Error)]
pub enum StylerError {
    /// An operation that has no valid result for the current zipper position
    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    /// Configuration construction or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// A rule failed while rewriting a file
    #[error("Rule error in '{rule_id}' while processing {file}: {message}")]
    RuleError {
        rule_id: String,
        file: String,
        message: String,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidOperation,
    Config,
    Rule,
    Internal,
}

impl StylerError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StylerError::InvalidOperation { .. } => ErrorKind::InvalidOperation,
            StylerError::ConfigError { .. } => ErrorKind::Config,
            StylerError::RuleError { .. } => ErrorKind::Rule,
            StylerError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (can continue processing other files)
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Rule)
    }

    /// Create an invalid operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a rule error
    pub fn rule_error(
        rule_id: impl Into<String>,
        file: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::RuleError {
            rule_id: rule_id.into(),
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Attach rule and file context to an error raised inside a rule.
    ///
    /// Errors that already carry rule context are returned unchanged, and so
    /// are invalid operations and internal errors, which stay fatal.
    pub fn in_rule(self, rule_id: &str, file: &str) -> Self {
        match self {
            err @ (StylerError::RuleError { .. }
            | StylerError::InvalidOperation { .. }
            | StylerError::InternalError { .. }) => err,
            other => Self::rule_error(rule_id, file, other.to_string()),
        }
    }
}

impl From<semver::Error> for StylerError {
    fn from(err: semver::Error) -> Self {
        Self::ConfigError {
            message: format!("invalid version: {err}"),
        }
    }
}
