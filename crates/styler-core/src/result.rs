//! Result alias and the recovery helper the engine applies to rule outcomes

use crate::error::StylerError;
use tracing::warn;

pub type Result<T> = std::result::Result<T, StylerError>;

pub trait ResultExt<T> {
    /// `Ok(None)` for an error the engine can step past, logged at `warn`
    ///
    /// Fatal errors are passed through untouched.
    fn recoverable(self) -> Result<Option<T>>;
}

impl<T> ResultExt<T> for Result<T> {
    fn recoverable(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "skipping failed rule");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_only_swallows_rule_errors() {
        let ok: Result<u32> = Ok(3);
        assert_eq!(ok.recoverable().unwrap(), Some(3));

        let rule: Result<u32> = Err(StylerError::rule_error("map_join", "a.ex", "boom"));
        assert_eq!(rule.recoverable().unwrap(), None);

        let fatal: Result<u32> = Err(StylerError::invalid_operation("root"));
        assert!(fatal.recoverable().is_err());

        let internal: Result<u32> = Err(StylerError::internal_error("lost path"));
        assert!(internal.recoverable().is_err());
    }
}
