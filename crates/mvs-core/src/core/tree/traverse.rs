use super::ids::NodeId;
use super::node::{Node, Tree};
use std::convert::Infallible;

enum Visit {
    Enter(NodeId, Option<NodeId>),
    Exit(NodeId, Option<NodeId>),
}

/// Walks the subtree rooted at `start` depth-first in document order.
///
/// `pre` runs before a node's children and `post` after them; both receive the
/// node id, the node and its parent (`None` for the tree root). The walk keeps an
/// explicit work stack, so tree depth is bounded by memory rather than by the
/// call stack. The first error returned by either callback stops the walk.
pub fn try_dfs<E, Pre, Post>(
    tree: &Tree,
    start: NodeId,
    mut pre: Pre,
    mut post: Post,
) -> Result<(), E>
where
    Pre: FnMut(NodeId, &Node, Option<NodeId>) -> Result<(), E>,
    Post: FnMut(NodeId, &Node, Option<NodeId>) -> Result<(), E>,
{
    let Some(start_node) = tree.node(start) else {
        return Ok(());
    };
    let mut stack = vec![Visit::Enter(start, start_node.parent())];

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(id, parent) => {
                let Some(node) = tree.node(id) else {
                    continue;
                };
                pre(id, node, parent)?;
                stack.push(Visit::Exit(id, parent));
                // Reversed so the first child is popped first.
                for child in node.children().iter().rev() {
                    stack.push(Visit::Enter(*child, Some(id)));
                }
            }
            Visit::Exit(id, parent) => {
                if let Some(node) = tree.node(id) {
                    post(id, node, parent)?;
                }
            }
        }
    }
    Ok(())
}

/// Infallible form of [`try_dfs`].
pub fn dfs<Pre, Post>(tree: &Tree, start: NodeId, mut pre: Pre, mut post: Post)
where
    Pre: FnMut(NodeId, &Node, Option<NodeId>),
    Post: FnMut(NodeId, &Node, Option<NodeId>),
{
    let result: Result<(), Infallible> = try_dfs(
        tree,
        start,
        |id, node, parent| {
            pre(id, node, parent);
            Ok(())
        },
        |id, node, parent| {
            post(id, node, parent);
            Ok(())
        },
    );
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

/// Collects the subtree rooted at `start` in pre-order.
pub fn preorder(tree: &Tree, start: NodeId) -> Vec<NodeId> {
    let mut order = Vec::new();
    dfs(tree, start, |id, _, _| order.push(id), |_, _, _| {});
    order
}
