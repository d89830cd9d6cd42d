use super::error::EngineError;
use crate::core::annotations::spec::{AnnotationSpec, RegisteredAnnotation, content_id_of};
use crate::core::tree::ids::NodeId;
use crate::core::tree::node::Tree;
use crate::core::tree::traverse::try_dfs;
use slotmap::SecondaryMap;
use std::collections::HashMap;

/// The distinct annotation sources of a tree and the node that references each.
#[derive(Debug, Default)]
pub(crate) struct AnnotationReferences {
    /// First-encountered order.
    pub specs: Vec<RegisteredAnnotation>,
    pub node_ids: SecondaryMap<NodeId, String>,
}

/// Collects and deduplicates the annotation specs of every `*_from_uri` and
/// `*_from_source` node in one forward walk.
pub(crate) fn collect_annotation_references(
    tree: &Tree,
) -> Result<AnnotationReferences, EngineError> {
    let mut references = AnnotationReferences::default();
    let mut registry: HashMap<String, String> = HashMap::new();

    try_dfs(
        tree,
        tree.root(),
        |id, node, _| {
            let Some(params) = node.params().annotation() else {
                return Ok(());
            };
            let spec = AnnotationSpec::from_params(params);
            let canonical = spec.canonical_json()?;
            let annotation_id = match registry.get(&canonical) {
                Some(existing) => existing.clone(),
                None => {
                    let annotation_id = content_id_of(&canonical);
                    registry.insert(canonical, annotation_id.clone());
                    references.specs.push(RegisteredAnnotation {
                        id: annotation_id.clone(),
                        spec,
                    });
                    annotation_id
                }
            };
            references.node_ids.insert(id, annotation_id);
            Ok::<(), EngineError>(())
        },
        |_, _, _| Ok(()),
    )?;

    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::io::TreeError;
    use serde_json::json;

    fn tree_with_annotations(a: serde_json::Value, b: serde_json::Value) -> Result<Tree, TreeError> {
        Tree::from_value(json!({
            "kind": "root",
            "children": [{ "kind": "download", "params": { "url": "x" }, "children": [
                { "kind": "parse", "params": { "format": "mmcif" }, "children": [
                    { "kind": "structure", "params": { "type": "model" }, "children": [
                        { "kind": "component_from_uri", "params": a },
                        { "kind": "label_from_uri", "params": b }
                    ] }
                ] }
            ] }]
        }))
    }

    #[test]
    fn field_identical_params_share_one_spec() {
        let tree = tree_with_annotations(
            json!({ "uri": "https://a/ann.cif", "format": "cif", "schema": "residue", "field_name": "component" }),
            json!({ "schema": "residue", "format": "cif", "uri": "https://a/ann.cif", "block_index": 0, "field_name": "label" }),
        )
        .unwrap();
        let references = collect_annotation_references(&tree).unwrap();
        assert_eq!(references.specs.len(), 1);
        let ids: Vec<&String> = references.node_ids.values().collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[0], &references.specs[0].id);
    }

    #[test]
    fn one_differing_field_gives_a_new_spec() {
        let tree = tree_with_annotations(
            json!({ "uri": "https://a/ann.cif", "format": "cif", "schema": "residue" }),
            json!({ "uri": "https://a/ann.cif", "format": "cif", "schema": "residue", "category_name": "x" }),
        )
        .unwrap();
        let references = collect_annotation_references(&tree).unwrap();
        assert_eq!(references.specs.len(), 2);
        assert_ne!(references.specs[0].id, references.specs[1].id);
    }

    #[test]
    fn ids_are_deterministic_across_runs() {
        let build = || {
            tree_with_annotations(
                json!({ "uri": "u", "format": "json", "schema": "chain" }),
                json!({ "uri": "v", "format": "json", "schema": "chain" }),
            )
            .unwrap()
        };
        let first = collect_annotation_references(&build()).unwrap();
        let second = collect_annotation_references(&build()).unwrap();
        assert_eq!(first.specs, second.specs);
    }
}
