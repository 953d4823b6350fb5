//! Alias lifting
//!
//! A module path with three or more segments that a module body mentions
//! repeatedly gets an `alias` declaration at the top of the body, and every
//! mention is shortened to its last segment:
//!
//! ```text
//! defmodule Shop do                 defmodule Shop do
//!   def a, do: My.App.Repo.all()      alias My.App.Repo
//!   def b, do: My.App.Repo.one()  =>  def a, do: Repo.all()
//! end                                 def b, do: Repo.one()
//!                                   end
//! ```
//!
//! The rule works in two phases per `defmodule`. [`analyze`] walks a read-only
//! body and builds the candidate table, then a single rewrite pass applies
//! every accepted lift. A candidate is dropped, without any error, when
//! lifting it could change what a name refers to.

use indexmap::IndexMap;
use std::collections::BTreeSet;
use styler_core::ast::{ATTRIBUTE, BLOCK};
use styler_core::{AliasEnv, Config, Context, Meta, Node, Result, Rule, Step, Zipper};
use tracing::{debug, trace};

/// Rule ID for alias lifting
pub const ALIAS_LIFTING: &str = "alias_lifting";

/// Shortest path worth lifting
pub const MIN_SEGMENTS: usize = 3;

/// Fewest mentions that justify a new alias
pub const MIN_OCCURRENCES: usize = 2;

/// Why a candidate is not lifted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disqualification {
    TooFewOccurrences,
    /// The full path already has an alias in scope
    AlreadyAliased,
    /// The short name is bound to some other path
    ShortNameBound,
    /// The short name is a standard-library or configured exclusion
    Excluded,
    /// Another path in scope starts with the short name
    RootCollision,
    /// An earlier candidate claimed the same short name
    CandidateCollision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub short_name: String,
    pub occurrences: usize,
    pub disqualified: Option<Disqualification>,
}

impl Candidate {
    pub fn is_lifted(&self) -> bool {
        self.disqualified.is_none()
    }
}

/// Candidates keyed by full path, in order of first mention
pub type CandidateTable = IndexMap<Vec<String>, Candidate>;

fn is_scope_boundary(node: &Node) -> bool {
    node.is_call_to("alias") || node.is_call_to("defmodule")
}

#[derive(Default)]
struct Scan {
    table: CandidateTable,
    roots: BTreeSet<String>,
}

impl Scan {
    fn visit(&mut self, node: &Node, env: &AliasEnv) {
        if is_scope_boundary(node) {
            return;
        }
        if let Some(segments) = node.alias_segments() {
            let Some((first, last)) = segments.first().zip(segments.last()) else {
                return;
            };
            self.roots.insert(first.to_string());
            if segments.len() >= MIN_SEGMENTS && !env.contains(first) {
                let path: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
                self.table
                    .entry(path)
                    .or_insert_with(|| Candidate {
                        short_name: last.to_string(),
                        occurrences: 0,
                        disqualified: None,
                    })
                    .occurrences += 1;
            }
            return;
        }
        for child in node.children() {
            self.visit(child, env);
        }
    }
}

/// Build the candidate table for one module body
///
/// `env` holds every alias visible in the body. Candidates are judged in
/// order of first mention, so when two eligible paths share a short name the
/// one mentioned first wins.
pub fn analyze(body: &Node, env: &AliasEnv, config: &Config) -> CandidateTable {
    let mut scan = Scan::default();
    scan.visit(body, env);

    let aliased = env.invert();
    let mut claimed = BTreeSet::new();
    for (path, candidate) in scan.table.iter_mut() {
        let short = candidate.short_name.as_str();
        candidate.disqualified = if candidate.occurrences < MIN_OCCURRENCES {
            Some(Disqualification::TooFewOccurrences)
        } else if aliased.contains_key(path) {
            Some(Disqualification::AlreadyAliased)
        } else if env.contains(short) {
            Some(Disqualification::ShortNameBound)
        } else if config.is_lifting_excluded(short) {
            Some(Disqualification::Excluded)
        } else if scan.roots.contains(short) {
            Some(Disqualification::RootCollision)
        } else if !claimed.insert(short.to_string()) {
            Some(Disqualification::CandidateCollision)
        } else {
            None
        };
    }
    scan.table
}

/// Shorten every mention of a lifted path
fn shorten(node: &mut Node, lifts: &IndexMap<Vec<String>, String>) {
    if is_scope_boundary(node) {
        return;
    }
    if let Some(segments) = node.alias_segments() {
        let path: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
        if let Some(short) = lifts.get(&path)
            && let Some(args) = node.args_mut()
        {
            *args = vec![Node::atom(short)];
        }
        return;
    }
    match node {
        Node::Leaf(_) => {}
        Node::Sequence(items) => items.iter_mut().for_each(|item| shorten(item, lifts)),
        Node::Pair(left, right) => {
            shorten(left, lifts);
            shorten(right, lifts);
        }
        Node::Call { head, args, .. } => {
            if matches!(head.as_ref(), Node::Call { .. }) {
                shorten(head, lifts);
            }
            args.iter_mut().for_each(|arg| shorten(arg, lifts));
        }
    }
}

fn is_module_doc(statement: &Node) -> bool {
    statement.is_call_to(ATTRIBUTE)
        && statement
            .args()
            .first()
            .and_then(Node::call_name)
            .is_some_and(|name| matches!(name, "moduledoc" | "shortdoc"))
}

/// Apply the accepted lifts to a module body
fn lift(body: Node, lifts: &IndexMap<Vec<String>, String>) -> Node {
    let block_meta = if body.is_call_to(BLOCK) {
        body.meta().copied()
    } else {
        None
    };
    let mut body = body;
    shorten(&mut body, lifts);

    let mut statements = body.into_statements();
    let at = statements.iter().take_while(|s| is_module_doc(s)).count();
    let line = statements
        .get(at)
        .and_then(Node::min_line)
        .or_else(|| statements.last().and_then(Node::max_line));
    let meta = line.map(Meta::at).unwrap_or_default();

    let declarations: Vec<Node> = lifts
        .keys()
        .map(|path| Node::alias_declaration(path.as_slice(), meta))
        .collect();
    statements.splice(at..at, declarations);

    Node::from_statements(block_meta.unwrap_or(meta), statements)
}

#[derive(Debug, Default)]
pub struct AliasLifting;

impl Rule for AliasLifting {
    fn id(&self) -> &'static str {
        ALIAS_LIFTING
    }

    fn description(&self) -> &'static str {
        "Alias module paths mentioned repeatedly in a module body"
    }

    fn run(&self, zipper: &mut Zipper, ctx: &mut Context<'_>) -> Result<Step> {
        if !zipper.node().is_call_to("defmodule") {
            return Ok(Step::Continue);
        }
        let Some(body) = zipper.node().do_body() else {
            return Ok(Step::Continue);
        };

        let statements: &[Node] = if body.is_call_to(BLOCK) {
            body.args()
        } else {
            std::slice::from_ref(body)
        };
        let local = AliasEnv::from_declarations(statements);
        let env = AliasEnv::compose(&ctx.alias_env(zipper), &local);
        let table = analyze(body, &env, ctx.config());

        let mut lifts = IndexMap::new();
        for (path, candidate) in &table {
            match candidate.disqualified {
                None => {
                    debug!(file = ctx.file(), path = %path.join("."), "lifting alias");
                    lifts.insert(path.clone(), candidate.short_name.clone());
                }
                Some(reason) => {
                    trace!(file = ctx.file(), path = %path.join("."), ?reason, "not lifting alias");
                }
            }
        }
        if lifts.is_empty() {
            return Ok(Step::Continue);
        }

        if let Some(body) = zipper.node_mut().do_body_mut() {
            let taken = std::mem::replace(body, Node::nil());
            *body = lift(taken, &lifts);
        }
        Ok(Step::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use styler_core::{CommentStore, RuleEngine, SourceFile};

    fn remote(path: &[&str], fun: &str, line: u32) -> Node {
        Node::remote_call(Node::aliases(path, Meta::at(line)), fun, Meta::at(line), vec![])
    }

    fn module(statements: Vec<Node>) -> Node {
        Node::call(
            "defmodule",
            Meta::at(1),
            vec![
                Node::aliases(&["Shop"], Meta::at(1)),
                Node::keyword(vec![("do", Node::block(Meta::at(2), statements))]),
            ],
        )
    }

    fn run(ast: Node, config: &Config) -> String {
        let engine = RuleEngine::new(vec![Box::new(AliasLifting)]);
        engine
            .rewrite(SourceFile::new("lib/shop.ex", ast, CommentStore::default()), config)
            .unwrap()
            .ast
            .to_string()
    }

    #[test]
    fn test_repeated_path_is_lifted() {
        let ast = module(vec![
            remote(&["My", "App", "Repo"], "all", 2),
            remote(&["My", "App", "Repo"], "one", 3),
        ]);
        assert_eq!(
            run(ast, &Config::default()),
            "defmodule(Shop, [do: (alias(My.App.Repo); Repo.all(); Repo.one())])"
        );
    }

    #[test]
    fn test_single_mention_is_kept() {
        let ast = module(vec![remote(&["My", "App", "Repo"], "all", 2), Node::int(1)]);
        let rendered = ast.to_string();
        assert_eq!(run(ast, &Config::default()), rendered);
    }

    #[test]
    fn test_first_of_colliding_candidates_wins() {
        let ast = module(vec![
            remote(&["A", "B", "Same"], "x", 2),
            remote(&["C", "D", "Same"], "y", 3),
            remote(&["A", "B", "Same"], "x", 4),
            remote(&["C", "D", "Same"], "y", 5),
        ]);
        assert_eq!(
            run(ast, &Config::default()),
            "defmodule(Shop, [do: (alias(A.B.Same); Same.x(); C.D.Same.y(); Same.x(); C.D.Same.y())])"
        );
    }

    #[test]
    fn test_collisions_disqualify() {
        let env = AliasEnv::new().define(&Node::alias_declaration(&["Other", "Bound"], Meta::at(1)));
        let config = Config::new().with_alias_lifting_exclude(["Repo"]);
        let body = Node::block(
            Meta::at(2),
            vec![
                remote(&["X", "Y", "Bound"], "a", 2),
                remote(&["X", "Y", "Bound"], "a", 3),
                remote(&["X", "Y", "Repo"], "a", 4),
                remote(&["X", "Y", "Repo"], "a", 5),
                remote(&["X", "Y", "Enum"], "a", 6),
                remote(&["X", "Y", "Enum"], "a", 7),
                remote(&["X", "Y", "Root"], "a", 8),
                remote(&["X", "Y", "Root"], "a", 9),
                remote(&["Root"], "a", 10),
                remote(&["Bound", "Z", "W"], "a", 11),
                remote(&["Bound", "Z", "W"], "a", 12),
                remote(&["Once", "Only", "Here"], "a", 13),
            ],
        );

        let table = analyze(&body, &env, &config);
        let reason = |path: &str| {
            let key: Vec<String> = path.split('.').map(String::from).collect();
            table.get(&key).and_then(|candidate| candidate.disqualified)
        };

        assert_eq!(reason("X.Y.Bound"), Some(Disqualification::ShortNameBound));
        assert_eq!(reason("X.Y.Repo"), Some(Disqualification::Excluded));
        assert_eq!(reason("X.Y.Enum"), Some(Disqualification::Excluded));
        assert_eq!(reason("X.Y.Root"), Some(Disqualification::RootCollision));
        assert_eq!(reason("Once.Only.Here"), Some(Disqualification::TooFewOccurrences));
        // relative to an existing alias, so never a candidate
        assert!(!table.contains_key(&vec!["Bound".to_string(), "Z".to_string(), "W".to_string()]));
        assert!(table.values().all(|candidate| !candidate.is_lifted()));
    }

    #[test]
    fn test_existing_alias_of_full_path() {
        let env = AliasEnv::new().define(&Node::alias_declaration(&["My", "App", "Repo"], Meta::at(1)));
        let body = Node::block(
            Meta::at(2),
            vec![remote(&["My", "App", "Repo"], "a", 2), remote(&["My", "App", "Repo"], "b", 3)],
        );
        let table = analyze(&body, &env, &Config::default());
        assert_eq!(
            table.values().next().and_then(|c| c.disqualified),
            Some(Disqualification::AlreadyAliased)
        );
    }

    #[test]
    fn test_aliases_go_after_moduledoc() {
        let doc = Node::call(
            ATTRIBUTE,
            Meta::at(2),
            vec![Node::call("moduledoc", Meta::at(2), vec![Node::string("Shop")])],
        );
        let ast = module(vec![
            doc,
            remote(&["My", "App", "Repo"], "all", 4),
            remote(&["My", "App", "Repo"], "one", 5),
        ]);
        assert_eq!(
            run(ast, &Config::default()),
            "defmodule(Shop, [do: (@moduledoc(\"Shop\"); alias(My.App.Repo); Repo.all(); Repo.one())])"
        );
    }

    #[test]
    fn test_nested_modules_and_declarations_are_not_counted() {
        let nested = Node::call(
            "defmodule",
            Meta::at(3),
            vec![
                Node::aliases(&["Inner"], Meta::at(3)),
                Node::keyword(vec![("do", remote(&["My", "App", "Repo"], "all", 4))]),
            ],
        );
        let body = Node::block(
            Meta::at(2),
            vec![
                Node::alias_declaration(&["My", "App", "Other"], Meta::at(2)),
                nested,
                remote(&["My", "App", "Repo"], "one", 6),
            ],
        );
        let table = analyze(&body, &AliasEnv::new(), &Config::default());
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].occurrences, 1);
    }
}
