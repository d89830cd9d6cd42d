use super::ids::NodeId;
use super::node::Tree;
use super::params::{NodeKind, NodeParams};
use super::traverse::preorder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slotmap::SecondaryMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Invalid MVS JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("The top-level node must have kind 'root', found '{found}'")]
    InvalidRoot { found: String },

    #[error("Invalid params for '{kind}' node: {message}")]
    InvalidParams { kind: String, message: String },
}

/// The `{kind, params, children}` JSON form of a node.
///
/// Deserialized recursively, so parsing inherits serde_json's nesting limit of
/// 128. Each tree level costs two (the node object and its `children` array),
/// which caps parsed documents at about 60 levels; deeper input fails with
/// [`TreeError::Json`]. Trees built in code have no such limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawNode {
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<RawNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Wrapped {
        root: RawNode,
        #[serde(default)]
        metadata: Option<DocumentMetadata>,
    },
    Bare(RawNode),
}

#[derive(Serialize)]
struct RawDocumentRef<'a> {
    root: &'a RawNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a DocumentMetadata>,
}

/// An MVS document: a tree plus optional metadata.
#[derive(Debug, Clone)]
pub struct MvsDocument {
    pub tree: Tree,
    pub metadata: Option<DocumentMetadata>,
}

impl MvsDocument {
    /// Parses either the `{root, metadata}` wrapper or a bare tree.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        match serde_json::from_str::<RawDocument>(json)? {
            RawDocument::Wrapped { root, metadata } => Ok(Self {
                tree: build_tree(root)?,
                metadata,
            }),
            RawDocument::Bare(root) => Ok(Self {
                tree: build_tree(root)?,
                metadata: None,
            }),
        }
    }

    pub fn to_json(&self) -> Result<String, TreeError> {
        let root = raw_tree(&self.tree)?;
        let document = RawDocumentRef {
            root: &root,
            metadata: self.metadata.as_ref(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

impl Tree {
    /// Parses a bare tree (`{"kind": "root", ...}`).
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        let raw: RawNode = serde_json::from_str(json)?;
        build_tree(raw)
    }

    pub fn from_value(value: Value) -> Result<Self, TreeError> {
        let raw: RawNode = serde_json::from_value(value)?;
        build_tree(raw)
    }

    pub fn to_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string(&raw_tree(self)?)?)
    }

    pub fn to_value(&self) -> Result<Value, TreeError> {
        Ok(serde_json::to_value(raw_tree(self)?)?)
    }
}

// Iterative from here on; only the serde pass above is depth-limited.
fn build_tree(raw: RawNode) -> Result<Tree, TreeError> {
    if NodeKind::from_name(&raw.kind) != NodeKind::Root {
        return Err(TreeError::InvalidRoot { found: raw.kind });
    }
    NodeParams::decode(&raw.kind, raw.params)?;

    let mut tree = Tree::new();
    let mut pending: Vec<(NodeId, RawNode)> = raw
        .children
        .into_iter()
        .rev()
        .map(|child| (tree.root(), child))
        .collect();

    while let Some((parent, node)) = pending.pop() {
        let params = NodeParams::decode(&node.kind, node.params)?;
        let id = tree.add_child(parent, params).ok_or_else(|| TreeError::InvalidParams {
            kind: node.kind.clone(),
            message: "parent node vanished while building the tree".to_string(),
        })?;
        pending.extend(node.children.into_iter().rev().map(|child| (id, child)));
    }
    Ok(tree)
}

fn raw_tree(tree: &Tree) -> Result<RawNode, TreeError> {
    // Children follow their parent in pre-order, so walking it backwards builds
    // every subtree before the node that owns it.
    let mut built: SecondaryMap<NodeId, RawNode> = SecondaryMap::new();
    for id in preorder(tree, tree.root()).into_iter().rev() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        let children = node
            .children()
            .iter()
            .filter_map(|child| built.remove(*child))
            .collect();
        built.insert(
            id,
            RawNode {
                kind: node.kind_name().to_string(),
                params: node.params().encode()?,
                children,
            },
        );
    }

    built
        .remove(tree.root())
        .ok_or_else(|| TreeError::InvalidRoot {
            found: String::new(),
        })
}
