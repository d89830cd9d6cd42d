use super::annotations::collect_annotation_references;
use super::error::EngineError;
use super::host::{CameraUpdate, CellRef, SceneSettings};
use super::nearest_repr::make_nearest_repr_map;
use crate::core::annotations::spec::RegisteredAnnotation;
use crate::core::tree::ids::NodeId;
use crate::core::tree::node::Tree;
use crate::core::tree::params::{CameraParams, CanvasParams};
use slotmap::SecondaryMap;

/// A camera request recorded by a `focus` or `camera` node.
#[derive(Debug, Clone, PartialEq)]
pub enum FocusRequest {
    Target(CellRef),
    Camera(CameraParams),
}

/// State shared by the actions of one interpretation run.
///
/// Created fresh for every run and dropped when the run ends; nothing in it
/// outlives the tree it was prepared from.
#[derive(Debug, Default)]
pub struct LoadingContext {
    annotation_map: SecondaryMap<NodeId, String>,
    annotation_specs: Vec<RegisteredAnnotation>,
    nearest_repr_map: SecondaryMap<NodeId, NodeId>,
    pub(crate) focus: Option<FocusRequest>,
    pub(crate) canvas: Option<CanvasParams>,
}

impl LoadingContext {
    /// Precomputes the annotation ids and nearest representations of `tree`.
    pub fn prepare(tree: &Tree) -> Result<Self, EngineError> {
        let references = collect_annotation_references(tree)?;
        Ok(Self {
            annotation_map: references.node_ids,
            annotation_specs: references.specs,
            nearest_repr_map: make_nearest_repr_map(tree),
            focus: None,
            canvas: None,
        })
    }

    pub fn annotation_id(&self, node: NodeId) -> Option<&str> {
        self.annotation_map.get(node).map(String::as_str)
    }

    pub fn annotation(&self, annotation_id: &str) -> Option<&RegisteredAnnotation> {
        self.annotation_specs.iter().find(|a| a.id == annotation_id)
    }

    /// Distinct annotation specs in first-encountered order.
    pub fn annotation_specs(&self) -> &[RegisteredAnnotation] {
        &self.annotation_specs
    }

    pub fn nearest_representation(&self, node: NodeId) -> Option<NodeId> {
        self.nearest_repr_map.get(node).copied()
    }

    pub fn focus(&self) -> Option<&FocusRequest> {
        self.focus.as_ref()
    }

    /// What the host should do after the commit. `keep_camera` suppresses
    /// every camera change; otherwise the last focus or camera request wins and
    /// the camera is reset when there is none.
    pub fn scene_settings(&self, keep_camera: bool) -> SceneSettings {
        let camera = match &self.focus {
            _ if keep_camera => CameraUpdate::Keep,
            Some(FocusRequest::Camera(params)) => CameraUpdate::Camera(params.clone()),
            Some(FocusRequest::Target(cell)) => CameraUpdate::Focus { cell: *cell },
            None => CameraUpdate::Reset,
        };
        SceneSettings {
            canvas: self.canvas.clone(),
            camera,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::Color;

    #[test]
    fn settings_without_requests_reset_or_keep() {
        let context = LoadingContext::default();
        assert_eq!(context.scene_settings(true).camera, CameraUpdate::Keep);
        assert_eq!(context.scene_settings(false).camera, CameraUpdate::Reset);
        assert!(context.scene_settings(false).canvas.is_none());
    }

    #[test]
    fn focus_request_applies_unless_camera_is_kept() {
        let mut context = LoadingContext::default();
        context.focus = Some(FocusRequest::Target(CellRef(4)));
        context.canvas = Some(CanvasParams {
            background_color: Color::from_hex(0x000000),
        });
        let settings = context.scene_settings(false);
        assert_eq!(settings.camera, CameraUpdate::Focus { cell: CellRef(4) });
        assert_eq!(settings.canvas.unwrap().background_color, Color::from_hex(0));

        let kept = context.scene_settings(true);
        assert_eq!(kept.camera, CameraUpdate::Keep);
        assert!(kept.canvas.is_some());
    }
}
