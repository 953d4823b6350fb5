//! Deprecated function replacement
//!
//! Renames calls to deprecated standard-library functions. A replacement is
//! only applied when the configured minimum supported version already has it,
//! otherwise the rewritten code would not run on every supported version.

use once_cell::sync::Lazy;
use semver::Version;
use styler_core::{Context, Node, Result, Rule, Step, Zipper};
use tracing::debug;

/// Rule ID for deprecated call replacement
pub const DEPRECATIONS: &str = "deprecations";

/// A deprecated `module.from` call and what replaces it
#[derive(Debug, Clone)]
pub struct Replacement {
    pub module: &'static str,
    pub from: &'static str,
    pub to: &'static str,
    /// Version that introduced `to`
    pub since: Version,
    /// Largest argument count the rename is valid for
    pub max_arity: usize,
}

impl Replacement {
    fn new(module: &'static str, from: &'static str, to: &'static str, since: Version, max_arity: usize) -> Self {
        Self {
            module,
            from,
            to,
            since,
            max_arity,
        }
    }
}

/// Known replacements
pub static REPLACEMENTS: Lazy<Vec<Replacement>> = Lazy::new(|| {
    vec![
        Replacement::new("Logger", "warn", "warning", Version::new(1, 15, 0), 2),
        Replacement::new("Path", "safe_relative_to", "safe_relative", Version::new(1, 14, 0), 2),
        Replacement::new("String", "strip", "trim", Version::new(1, 3, 0), 1),
        Replacement::new("String", "lstrip", "trim_leading", Version::new(1, 3, 0), 1),
        Replacement::new("String", "rstrip", "trim_trailing", Version::new(1, 3, 0), 1),
        Replacement::new("Enum", "partition", "split_with", Version::new(1, 4, 0), 2),
    ]
});

/// Replaces deprecated calls with their successors
#[derive(Debug, Default)]
pub struct Deprecations;

impl Deprecations {
    fn replacement_for(node: &Node) -> Option<&'static Replacement> {
        let (path, fun) = node.remote_target()?;
        let [module] = path.as_slice() else {
            return None;
        };
        REPLACEMENTS.iter().find(|replacement| {
            replacement.module == *module
                && replacement.from == fun
                && node.args().len() <= replacement.max_arity
        })
    }
}

impl Rule for Deprecations {
    fn id(&self) -> &'static str {
        DEPRECATIONS
    }

    fn description(&self) -> &'static str {
        "Replace deprecated standard-library calls"
    }

    fn run(&self, zipper: &mut Zipper, ctx: &mut Context<'_>) -> Result<Step> {
        let Some(replacement) = Self::replacement_for(zipper.node()) else {
            return Ok(Step::Continue);
        };
        if !ctx.config().supports(&replacement.since) {
            return Ok(Step::Continue);
        }
        // a local alias can shadow the standard module
        if ctx.alias_env(zipper).contains(replacement.module) {
            return Ok(Step::Continue);
        }

        debug!(
            file = ctx.file(),
            line = ?zipper.node().line(),
            "{}.{} -> {}.{}",
            replacement.module,
            replacement.from,
            replacement.module,
            replacement.to
        );
        if let Node::Call { head, .. } = zipper.node_mut()
            && let Some(fun) = head.args_mut().and_then(|args| args.last_mut())
        {
            *fun = Node::atom(replacement.to);
        }
        Ok(Step::Continue)
    }
}
