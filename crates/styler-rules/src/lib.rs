//! Styler Rules
//!
//! The built-in rewrite rules and the engine that applies them in their
//! standard order.

pub mod builtin;

pub use builtin::{AliasLifting, AliasSort, Deprecations, MapJoin, SinglePipe};

use styler_core::{Rule, RuleEngine};

/// The built-in rules in application order
///
/// Order matters: `map_join` must run before `single_pipe` so that a merged
/// `Enum.map_join` pipe can collapse further at the same node, deprecations
/// see the call a collapsed pipe turned into, and aliases are sorted only
/// after lifting has inserted its declarations.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(MapJoin),
        Box::new(SinglePipe),
        Box::new(Deprecations),
        Box::new(AliasLifting),
        Box::new(AliasSort),
    ]
}

/// Engine running every built-in rule
pub fn default_engine() -> RuleEngine {
    RuleEngine::new(builtin_rules())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        assert_eq!(
            default_engine().rule_ids(),
            vec![
                builtin::map_join::MAP_JOIN,
                builtin::single_pipe::SINGLE_PIPE,
                builtin::deprecations::DEPRECATIONS,
                builtin::alias_lifting::ALIAS_LIFTING,
                builtin::alias_sort::ALIAS_SORT,
            ]
        );
    }

    #[test]
    fn test_rules_describe_themselves() {
        assert!(builtin_rules().iter().all(|rule| !rule.description().is_empty()));
    }
}
