use crate::core::tree::ids::NodeId;
use crate::core::tree::node::Tree;
use crate::core::tree::params::NodeKind;
use crate::core::tree::traverse::dfs;
use slotmap::SecondaryMap;

/// Maps every node to the representation that governs it.
///
/// The first pass runs bottom-up: a representation maps to itself and every
/// node except a structure hands its mapping to a parent that has none yet.
/// The second pass runs top-down and fills unmapped nodes from their parent.
/// Because structures never hand their mapping upward, a representation never
/// governs nodes outside the structure that encloses it.
pub(crate) fn make_nearest_repr_map(tree: &Tree) -> SecondaryMap<NodeId, NodeId> {
    let mut map: SecondaryMap<NodeId, NodeId> = SecondaryMap::new();

    dfs(
        tree,
        tree.root(),
        |_, _, _| {},
        |id, node, parent| {
            if node.kind() == NodeKind::Representation {
                map.insert(id, id);
            }
            if node.kind() == NodeKind::Structure {
                return;
            }
            if let (Some(repr), Some(parent)) = (map.get(id).copied(), parent) {
                if !map.contains_key(parent) {
                    map.insert(parent, repr);
                }
            }
        },
    );

    dfs(
        tree,
        tree.root(),
        |id, _, parent| {
            if map.contains_key(id) {
                return;
            }
            if let Some(repr) = parent.and_then(|p| map.get(p).copied()) {
                map.insert(id, repr);
            }
        },
        |_, _, _| {},
    );

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::params::{
        ComponentParams, NodeParams, RepresentationParams, RepresentationType, StructureParams,
        StructureType, TextParams,
    };

    fn structure() -> NodeParams {
        NodeParams::Structure(StructureParams::new(StructureType::Model))
    }

    fn representation() -> NodeParams {
        NodeParams::Representation(RepresentationParams {
            kind: RepresentationType::Cartoon,
        })
    }

    fn label() -> NodeParams {
        NodeParams::Label(TextParams { text: "L".into() })
    }

    #[test]
    fn sibling_label_resolves_to_sibling_representation() {
        let mut tree = Tree::new();
        let s = tree.add_child(tree.root(), structure()).unwrap();
        let r = tree.add_child(s, representation()).unwrap();
        let l = tree.add_child(s, label()).unwrap();
        let map = make_nearest_repr_map(&tree);
        assert_eq!(map.get(l), Some(&r));
        assert_eq!(map.get(r), Some(&r));
    }

    #[test]
    fn nested_structure_falls_back_to_outer_representation() {
        let mut tree = Tree::new();
        let s1 = tree.add_child(tree.root(), structure()).unwrap();
        let r1 = tree.add_child(s1, representation()).unwrap();
        let s2 = tree.add_child(r1, structure()).unwrap();
        let l = tree.add_child(s2, label()).unwrap();
        let map = make_nearest_repr_map(&tree);
        assert_eq!(map.get(l), Some(&r1));
    }

    #[test]
    fn nested_structure_prefers_its_own_representation() {
        let mut tree = Tree::new();
        let s1 = tree.add_child(tree.root(), structure()).unwrap();
        let r1 = tree.add_child(s1, representation()).unwrap();
        let s2 = tree.add_child(r1, structure()).unwrap();
        let r2 = tree.add_child(s2, representation()).unwrap();
        let l = tree.add_child(s2, label()).unwrap();
        let map = make_nearest_repr_map(&tree);
        assert_eq!(map.get(l), Some(&r2));
        assert_eq!(map.get(r1), Some(&r1));
    }

    #[test]
    fn representations_do_not_escape_their_structure() {
        let mut tree = Tree::new();
        let download = tree.add_child(tree.root(), NodeParams::Focus).unwrap();
        let s = tree.add_child(download, structure()).unwrap();
        let c = tree.add_child(s, NodeParams::Component(ComponentParams::default())).unwrap();
        let r = tree.add_child(c, representation()).unwrap();
        let other = tree.add_child(tree.root(), label()).unwrap();
        let map = make_nearest_repr_map(&tree);
        assert_eq!(map.get(c), Some(&r));
        assert_eq!(map.get(s), Some(&r));
        assert!(map.get(download).is_none());
        assert!(map.get(other).is_none());
    }

    #[test]
    fn lowest_representation_wins_the_upward_push() {
        let mut tree = Tree::new();
        let s = tree.add_child(tree.root(), structure()).unwrap();
        let c = tree.add_child(s, NodeParams::Component(ComponentParams::default())).unwrap();
        let first = tree.add_child(c, representation()).unwrap();
        let _second = tree.add_child(c, representation()).unwrap();
        let l = tree.add_child(c, label()).unwrap();
        let map = make_nearest_repr_map(&tree);
        assert_eq!(map.get(c), Some(&first));
        assert_eq!(map.get(l), Some(&first));
    }
}
