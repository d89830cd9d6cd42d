use super::ids::NodeId;
use super::node::Tree;
use super::params::NodeKind;
use super::traverse::dfs;
use std::fmt;

/// A structural problem found in an MVS tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub node: NodeId,
    pub kind: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' node: {}", self.kind, self.message)
    }
}

const COMPONENT_KINDS: &[NodeKind] = &[
    NodeKind::Component,
    NodeKind::ComponentFromUri,
    NodeKind::ComponentFromSource,
];
const FOCUS_PARENTS: &[NodeKind] = &[
    NodeKind::Structure,
    NodeKind::Component,
    NodeKind::ComponentFromUri,
    NodeKind::ComponentFromSource,
];

fn allowed_parents(kind: NodeKind) -> Option<&'static [NodeKind]> {
    use NodeKind::*;
    let allowed: &'static [NodeKind] = match kind {
        Download | Camera | Canvas => &[Root],
        Parse => &[Download],
        Structure => &[Parse],
        Transform | Component | ComponentFromUri | ComponentFromSource | LabelFromUri
        | LabelFromSource | TooltipFromUri | TooltipFromSource => &[Structure],
        Representation | Label | Tooltip => COMPONENT_KINDS,
        Color | ColorFromUri | ColorFromSource => &[Representation],
        Focus => FOCUS_PARENTS,
        Root | Unknown => return None,
    };
    Some(allowed)
}

/// Checks every node against the MVS parent-kind rules.
///
/// Unknown kinds are never reported, and neither are children of unknown
/// kinds, so documents written for newer viewers still validate.
pub fn validate_tree(tree: &Tree) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    dfs(
        tree,
        tree.root(),
        |id, node, parent| {
            let kind = node.kind();
            let Some(parent) = parent else {
                return;
            };
            if kind == NodeKind::Root {
                issues.push(ValidationIssue {
                    node: id,
                    kind: kind.to_string(),
                    message: "'root' may only appear at the top of the tree".to_string(),
                });
                return;
            }
            let Some(parent_kind) = tree.kind(parent) else {
                return;
            };
            if parent_kind == NodeKind::Unknown {
                return;
            }
            if let Some(allowed) = allowed_parents(kind) {
                if !allowed.contains(&parent_kind) {
                    let expected = allowed
                        .iter()
                        .map(|k| format!("'{k}'"))
                        .collect::<Vec<_>>()
                        .join(" or ");
                    issues.push(ValidationIssue {
                        node: id,
                        kind: kind.to_string(),
                        message: format!("must be a child of {expected}, found '{parent_kind}'"),
                    });
                }
            }
        },
        |_, _, _| {},
    );
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::params::{
        ComponentParams, DownloadParams, NodeParams, ParseFormat, ParseParams, StructureParams,
        StructureType, UnknownParams,
    };

    fn structure_tree() -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let download = tree
            .add_child(tree.root(), NodeParams::Download(DownloadParams { url: "x".into() }))
            .unwrap();
        let parse = tree
            .add_child(
                download,
                NodeParams::Parse(ParseParams {
                    format: ParseFormat::Mmcif,
                }),
            )
            .unwrap();
        let structure = tree
            .add_child(parse, NodeParams::Structure(StructureParams::new(StructureType::Model)))
            .unwrap();
        (tree, structure)
    }

    #[test]
    fn well_formed_tree_has_no_issues() {
        let (mut tree, structure) = structure_tree();
        let component = tree
            .add_child(structure, NodeParams::Component(ComponentParams::default()))
            .unwrap();
        tree.add_child(component, NodeParams::Focus).unwrap();
        assert!(validate_tree(&tree).is_empty());
    }

    #[test]
    fn misplaced_node_is_reported() {
        let (mut tree, _) = structure_tree();
        let root = tree.root();
        let component = tree
            .add_child(root, NodeParams::Component(ComponentParams::default()))
            .unwrap();
        let issues = validate_tree(&tree);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].node, component);
        assert!(issues[0].message.contains("'structure'"));
    }

    #[test]
    fn nested_root_is_reported() {
        let (mut tree, structure) = structure_tree();
        tree.add_child(structure, NodeParams::Root).unwrap();
        let issues = validate_tree(&tree);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, "root");
    }

    #[test]
    fn unknown_kinds_and_their_children_are_not_reported() {
        let mut tree = Tree::new();
        let unknown = tree
            .add_child(
                tree.root(),
                NodeParams::Unknown(UnknownParams {
                    kind: "volume".into(),
                    params: None,
                }),
            )
            .unwrap();
        tree.add_child(unknown, NodeParams::Component(ComponentParams::default()))
            .unwrap();
        assert!(validate_tree(&tree).is_empty());
    }
}
