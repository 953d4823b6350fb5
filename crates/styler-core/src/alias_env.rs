//! Alias environments
//!
//! An [`AliasEnv`] maps a short module name (a single path segment) to the
//! full path it stands for inside one lexical scope:
//!
//! ```text
//! alias A.B              B => [A, B]
//! alias C.D, as: X       X => [C, D]
//! alias E.{F, G.H}       F => [E, F], H => [E, G, H]
//! ```
//!
//! Environments are values. Each nested scope builds its own from the
//! declarations it sees and throws it away on exit; an outer scope's bindings
//! only become visible through an explicit [`AliasEnv::compose`].

use crate::ast::Node;
use indexmap::IndexMap;

/// Scoped table of short name => full path bindings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasEnv {
    bindings: IndexMap<String, Vec<String>>,
}

impl AliasEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an environment from a run of declarations, in order
    pub fn from_declarations<'a>(declarations: impl IntoIterator<Item = &'a Node>) -> Self {
        declarations
            .into_iter()
            .fold(Self::new(), |env, declaration| env.define(declaration))
    }

    /// Add the bindings introduced by an `alias` declaration
    ///
    /// Anything that is not a recognized declaration shape leaves the
    /// environment unchanged.
    pub fn define(mut self, declaration: &Node) -> Self {
        for (short, path) in declaration_bindings(declaration) {
            self.bindings.insert(short, path);
        }
        self
    }

    /// Bindings of `outer` overlaid with the bindings of `inner`
    pub fn compose(outer: &AliasEnv, inner: &AliasEnv) -> AliasEnv {
        let mut bindings = outer.bindings.clone();
        for (short, path) in &inner.bindings {
            bindings.insert(short.clone(), path.clone());
        }
        AliasEnv { bindings }
    }

    pub fn get(&self, short: &str) -> Option<&[String]> {
        self.bindings.get(short).map(Vec::as_slice)
    }

    pub fn contains(&self, short: &str) -> bool {
        self.bindings.contains_key(short)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.bindings
            .iter()
            .map(|(short, path)| (short.as_str(), path.as_slice()))
    }

    /// Replace a bound first segment with the full path it stands for
    pub fn expand<S: AsRef<str>>(&self, segments: &[S]) -> Vec<String> {
        let mut expanded = Vec::with_capacity(segments.len());
        let mut rest = segments.iter();
        if let Some(first) = rest.next() {
            match self.get(first.as_ref()) {
                Some(path) => expanded.extend(path.iter().cloned()),
                None => expanded.push(first.as_ref().to_string()),
            }
        }
        expanded.extend(rest.map(|segment| segment.as_ref().to_string()));
        expanded
    }

    /// Expand every module path in a subtree
    pub fn expand_ast(&self, mut node: Node) -> Node {
        if self.is_empty() {
            return node;
        }
        node.walk_mut(&mut |node| {
            let expanded = match node.alias_segments() {
                Some(segments) if segments.first().is_some_and(|s| self.contains(s)) => {
                    self.expand(&segments)
                }
                _ => return,
            };
            if let Some(args) = node.args_mut() {
                *args = expanded.into_iter().map(Node::atom).collect();
            }
        });
        node
    }

    /// Full path => short name, for reusing an existing binding
    pub fn invert(&self) -> IndexMap<Vec<String>, String> {
        self.bindings
            .iter()
            .map(|(short, path)| (path.clone(), short.clone()))
            .collect()
    }
}

fn owned(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

/// Bindings introduced by a declaration node, in source order
pub fn declaration_bindings(declaration: &Node) -> Vec<(String, Vec<String>)> {
    if !declaration.is_call_to("alias") {
        return Vec::new();
    }

    match declaration.args() {
        [target] => {
            if let Some(segments) = target.alias_segments() {
                return segments
                    .last()
                    .map(|last| vec![(last.to_string(), owned(&segments))])
                    .unwrap_or_default();
            }
            multi_alias_bindings(target)
        }
        [target, options] => {
            let (Some(segments), Some(short)) = (
                target.alias_segments(),
                options.keyword_get("as").and_then(Node::alias_segments),
            ) else {
                return Vec::new();
            };
            match short.as_slice() {
                [name] if !segments.is_empty() => vec![(name.to_string(), owned(&segments))],
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// `alias Base.{One, Two.Three}`
fn multi_alias_bindings(target: &Node) -> Vec<(String, Vec<String>)> {
    let Some((base, "{}")) = target.remote_target() else {
        return Vec::new();
    };
    target
        .args()
        .iter()
        .filter_map(|leaf| {
            let tail = leaf.alias_segments()?;
            let last = tail.last()?;
            let path = base.iter().chain(tail.iter()).copied().collect::<Vec<_>>();
            Some((last.to_string(), owned(&path)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Meta;

    fn alias(segments: &[&str]) -> Node {
        Node::alias_declaration(segments, Meta::at(1))
    }

    fn alias_as(segments: &[&str], short: &str) -> Node {
        Node::call(
            "alias",
            Meta::at(1),
            vec![
                Node::aliases(segments, Meta::at(1)),
                Node::keyword(vec![("as", Node::aliases(&[short], Meta::at(1)))]),
            ],
        )
    }

    #[test]
    fn test_expand_first_bound_segment() {
        let env = AliasEnv::new()
            .define(&alias(&["A", "B"]))
            .define(&alias_as(&["C", "D"], "X"));

        assert_eq!(env.expand(&["B", "C", "D"]), vec!["A", "B", "C", "D"]);
        assert_eq!(env.expand(&["X", "Y"]), vec!["C", "D", "Y"]);
        assert_eq!(env.expand(&["Not", "Present"]), vec!["Not", "Present"]);
        assert_eq!(env.expand(&["C", "B"]), vec!["C", "B"]);
    }

    #[test]
    fn test_irregular_declarations_pass_through() {
        let env = AliasEnv::new().define(&alias(&["A", "B"]));
        let irregular = vec![
            Node::call("alias", Meta::at(2), vec![Node::ident("__MODULE__")]),
            Node::call("import", Meta::at(2), vec![Node::aliases(&["Enum"], Meta::at(2))]),
            Node::call(
                "alias",
                Meta::at(2),
                vec![
                    Node::aliases(&["C", "D"], Meta::at(2)),
                    Node::keyword(vec![("as", Node::aliases(&["Not", "Single"], Meta::at(2)))]),
                ],
            ),
            Node::int(3),
        ];
        for declaration in &irregular {
            assert_eq!(env.clone().define(declaration), env);
        }
    }

    #[test]
    fn test_multi_alias_defines_every_leaf() {
        let multi = Node::call(
            "alias",
            Meta::at(1),
            vec![Node::remote_call(
                Node::aliases(&["Base"], Meta::at(1)),
                "{}",
                Meta::at(1),
                vec![
                    Node::aliases(&["One"], Meta::at(1)),
                    Node::aliases(&["Two", "Three"], Meta::at(1)),
                ],
            )],
        );
        let env = AliasEnv::new().define(&multi);
        assert_eq!(env.len(), 2);
        assert_eq!(env.get("One"), Some(&["Base".to_string(), "One".to_string()][..]));
        assert_eq!(env.expand(&["Three"]), vec!["Base", "Two", "Three"]);
    }

    #[test]
    fn test_expand_ast_rewrites_nested_paths() {
        let env = AliasEnv::new().define(&alias(&["My", "App", "Repo"]));
        let call = Node::remote_call(
            Node::aliases(&["Repo"], Meta::at(3)),
            "all",
            Meta::at(3),
            vec![Node::aliases(&["Query"], Meta::at(3))],
        );
        let expanded = env.expand_ast(call);
        assert_eq!(expanded.to_string(), "My.App.Repo.all(Query)");
    }

    #[test]
    fn test_expand_ast_with_empty_env_is_identity() {
        let node = Node::aliases(&["Repo"], Meta::at(1));
        assert_eq!(AliasEnv::new().expand_ast(node.clone()), node);
    }

    #[test]
    fn test_invert_and_compose() {
        let outer = AliasEnv::from_declarations(&[alias(&["A", "B"]), alias(&["C", "D"])]);
        let inner = AliasEnv::new().define(&alias_as(&["E", "F"], "B"));

        let composed = AliasEnv::compose(&outer, &inner);
        assert_eq!(composed.expand(&["B"]), vec!["E", "F"]);
        assert_eq!(composed.expand(&["D"]), vec!["C", "D"]);
        // neither input is modified
        assert_eq!(outer.expand(&["B"]), vec!["A", "B"]);

        let inverted = composed.invert();
        assert_eq!(inverted.get(&owned(&["C", "D"])), Some(&"D".to_string()));
        assert!(!inverted.contains_key(&owned(&["A", "B"])));
    }
}
