//! Built-in rewrite rules, in the order the default engine applies them

pub mod alias_lifting;
pub mod alias_sort;
pub mod deprecations;
pub mod map_join;
pub mod single_pipe;

pub use alias_lifting::AliasLifting;
pub use alias_sort::AliasSort;
pub use deprecations::Deprecations;
pub use map_join::MapJoin;
pub use single_pipe::SinglePipe;

use styler_core::Node;

/// Arguments of `Module.fun(...)` when `node` is exactly that qualified call
pub(crate) fn remote_call_args<'a>(node: &'a Node, module: &[&str], fun: &str) -> Option<&'a [Node]> {
    let (path, name) = node.remote_target()?;
    (path == module && name == fun).then(|| node.args())
}

/// Split a qualified call into its receiver, function name, meta and arguments
pub(crate) fn into_remote_parts(node: Node) -> Option<(Node, String, styler_core::Meta, Vec<Node>)> {
    let Node::Call { head, meta, args } = node else {
        return None;
    };
    let Node::Call { args: head_args, .. } = *head else {
        return None;
    };
    let [receiver, fun] = <[Node; 2]>::try_from(head_args).ok()?;
    let name = fun.atom_name()?.to_string();
    Some((receiver, name, meta, args))
}
