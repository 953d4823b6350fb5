//! Rule dispatch engine
//!
//! The engine walks a file's tree once, depth first. At every node it runs
//! each rule in catalog order, so a rewrite made by an earlier rule is what
//! the later rules see at that same position. Once the walk is done, the
//! statement lines of every block are fixed up for the printer.

use crate::alias_env::AliasEnv;
use crate::ast::{BLOCK, Node};
use crate::comments::CommentStore;
use crate::config::Config;
use crate::fixup::fix_block_lines;
use crate::result::{Result, ResultExt};
use crate::zipper::{Step, Zipper};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// One parsed file: its tree, its comments and its name for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub ast: Node,
    #[serde(default)]
    pub comments: CommentStore,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, ast: Node, comments: CommentStore) -> Self {
        Self {
            name: name.into(),
            ast,
            comments,
        }
    }
}

/// Per-file state handed to every rule
pub struct Context<'a> {
    file: &'a str,
    config: &'a Config,
    comments: &'a mut CommentStore,
}

impl<'a> Context<'a> {
    pub fn new(file: &'a str, config: &'a Config, comments: &'a mut CommentStore) -> Self {
        Self {
            file,
            config,
            comments,
        }
    }

    /// Name of the file being rewritten
    pub fn file(&self) -> &str {
        self.file
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn comments(&self) -> &CommentStore {
        self.comments
    }

    pub fn comments_mut(&mut self) -> &mut CommentStore {
        self.comments
    }

    /// Aliases in effect at the focus of `zipper`
    ///
    /// Every enclosing block contributes the declarations that precede the
    /// focus path in it. Levels are composed from the outermost inwards, so
    /// an inner declaration shadows an outer one with the same short name.
    pub fn alias_env(&self, zipper: &Zipper) -> AliasEnv {
        let levels: Vec<AliasEnv> = zipper
            .enclosing_left_siblings()
            .filter(|(parent, _)| parent.is_call_to(BLOCK))
            .map(|(_, left)| AliasEnv::from_declarations(left))
            .collect();
        levels
            .iter()
            .rev()
            .fold(AliasEnv::new(), |outer, inner| AliasEnv::compose(&outer, inner))
    }
}

/// A context-aware rewrite applied at every node of the tree
///
/// `run` may rewrite the focus (and only the focus) in place. The returned
/// [`Step`] tells the engine what to do next:
///
/// - [`Step::Continue`] hands the possibly rewritten focus to the next rule
/// - [`Step::Skip`] ends the rule chain here and does not descend into the focus
/// - [`Step::Halt`] stops the whole traversal
pub trait Rule: Send + Sync {
    /// Stable identifier used in logs and errors
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    fn run(&self, zipper: &mut Zipper, ctx: &mut Context<'_>) -> Result<Step>;
}

/// Applies a fixed, ordered list of rules to files
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleEngine {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Rule ids in application order
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    /// Rewrite one file
    ///
    /// A rule failure is logged and the remaining rules still run at that
    /// node. Only invalid operations abort the file.
    pub fn rewrite(&self, file: SourceFile, config: &Config) -> Result<SourceFile> {
        let SourceFile {
            name,
            ast,
            mut comments,
        } = file;
        debug!(file = %name, rules = self.rules.len(), "restyling file");

        let mut zipper = Zipper::new(ast);
        let mut failure = None;
        {
            let mut ctx = Context::new(&name, config, &mut comments);
            zipper.traverse_while(|zipper| match self.apply(zipper, &mut ctx) {
                Ok(step) => step,
                Err(err) => {
                    failure = Some(err);
                    Step::Halt
                }
            });
        }
        if let Some(err) = failure {
            return Err(err);
        }

        let mut ast = zipper.into_root();
        fix_block_lines(&mut ast);
        comments.sort();
        debug!(file = %name, comments = comments.len(), "finished file");

        Ok(SourceFile {
            name,
            ast,
            comments,
        })
    }

    /// Rewrite many files in parallel, keeping their order
    pub fn rewrite_all(&self, files: Vec<SourceFile>, config: &Config) -> Vec<Result<SourceFile>> {
        let count = files.len();
        let results: Vec<Result<SourceFile>> = files
            .into_par_iter()
            .map(|file| self.rewrite(file, config))
            .collect();
        let failed = results.iter().filter(|result| result.is_err()).count();
        info!(files = count, failed, "restyled files");
        results
    }

    fn apply(&self, zipper: &mut Zipper, ctx: &mut Context<'_>) -> Result<Step> {
        for rule in &self.rules {
            let step = rule
                .run(zipper, ctx)
                .map_err(|err| err.in_rule(rule.id(), ctx.file()))
                .recoverable()?;
            match step {
                Some(Step::Continue) | None => {}
                Some(step) => {
                    trace!(rule = rule.id(), ?step, "rule ended the chain");
                    return Ok(step);
                }
            }
        }
        Ok(Step::Continue)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_ids())
            .finish()
    }
}
