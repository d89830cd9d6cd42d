use super::ids::NodeId;
use super::params::{NodeKind, NodeParams};
use slotmap::SlotMap;

/// A single node of an MVS tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    params: NodeParams,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(params: NodeParams, parent: Option<NodeId>) -> Self {
        Self {
            params,
            parent,
            children: Vec::new(),
        }
    }

    pub fn params(&self) -> &NodeParams {
        &self.params
    }

    pub fn kind(&self) -> NodeKind {
        self.params.kind()
    }

    /// The kind tag as written in the document, including unrecognized kinds.
    pub fn kind_name(&self) -> &str {
        self.params.kind_name()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// An arena-backed MVS tree.
///
/// Nodes are addressed by identity: two nodes with identical kind and params at
/// different positions have different [`NodeId`]s, so every side table computed
/// over a tree (annotation ids, nearest representations, action results) is a
/// `SecondaryMap` keyed by these ids.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates a tree holding only the `root` node.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(NodeParams::Root, None));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn params(&self, id: NodeId) -> Option<&NodeParams> {
        self.nodes.get(id).map(Node::params)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id).map(Node::kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(Node::parent)
    }

    /// Returns the children of `id` in document order, or an empty slice if the
    /// node does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], Node::children)
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root, so this is only true for no tree at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a new node as the last child of `parent`.
    ///
    /// # Arguments
    ///
    /// * `parent` - The node that receives the new child.
    /// * `params` - The typed params, which also determine the node's kind.
    ///
    /// # Return
    ///
    /// Returns the id of the new node, or `None` if `parent` is not in the tree.
    pub fn add_child(&mut self, parent: NodeId, params: NodeParams) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let id = self.nodes.insert(Node::new(params, Some(parent)));
        self.nodes[parent].children.push(id);
        Some(id)
    }

    /// Iterates over the ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::params::{DownloadParams, ParseFormat, ParseParams};

    #[test]
    fn new_tree_holds_only_the_root() {
        let tree = Tree::new();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.kind(tree.root()), Some(NodeKind::Root));
        assert!(tree.children(tree.root()).is_empty());
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn add_child_preserves_insertion_order_and_links_parent() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree
            .add_child(root, NodeParams::Download(DownloadParams { url: "a".into() }))
            .unwrap();
        let b = tree
            .add_child(root, NodeParams::Download(DownloadParams { url: "b".into() }))
            .unwrap();
        let parse = tree
            .add_child(
                a,
                NodeParams::Parse(ParseParams {
                    format: ParseFormat::Mmcif,
                }),
            )
            .unwrap();

        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.parent(parse), Some(a));
        assert_eq!(tree.ancestors(parse).collect::<Vec<_>>(), vec![a, root]);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn identical_nodes_at_different_positions_are_distinct() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.add_child(root, NodeParams::Focus).unwrap();
        let b = tree.add_child(root, NodeParams::Focus).unwrap();
        assert_ne!(a, b);
        assert_eq!(tree.params(a), tree.params(b));
    }

    #[test]
    fn add_child_to_missing_parent_returns_none() {
        let mut tree = Tree::new();
        let mut other = Tree::new();
        let foreign = other.add_child(other.root(), NodeParams::Focus).unwrap();
        assert!(tree.add_child(foreign, NodeParams::Focus).is_none());
    }
}
