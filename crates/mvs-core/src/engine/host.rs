use super::color_theme::ColorTheme;
use super::transaction::Batch;
use crate::core::annotations::spec::{CifBlock, RegisteredAnnotation};
use crate::core::selection::selector::Selector;
use crate::core::tree::params::{CameraParams, CanvasParams, ParseFormat, RepresentationType};
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque handle to a cell of the host's scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef(pub u64);

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructureKind {
    Model,
    Assembly {
        #[serde(skip_serializing_if = "Option::is_none")]
        assembly_id: Option<String>,
    },
    Symmetry {
        ijk_min: [i32; 3],
        ijk_max: [i32; 3],
    },
    SymmetryMates {
        radius: f64,
    },
}

/// What a new cell materializes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "transform", rename_all = "snake_case")]
pub enum SceneTransform {
    Download {
        url: String,
        is_binary: bool,
    },
    Parse {
        format: ParseFormat,
    },
    Model {
        block: CifBlock,
        model_index: usize,
    },
    Structure {
        kind: StructureKind,
    },
    TransformConformation {
        matrix: Matrix4<f64>,
    },
    Component {
        selector: Selector,
        label: String,
    },
    Representation {
        kind: RepresentationType,
        color_theme: ColorTheme,
    },
    Label {
        text: String,
        color_theme: ColorTheme,
    },
    AnnotationLabel {
        annotation_id: String,
        field_name: String,
        color_theme: ColorTheme,
    },
}

impl SceneTransform {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Download { .. } => "download",
            Self::Parse { .. } => "parse",
            Self::Model { .. } => "model",
            Self::Structure { .. } => "structure",
            Self::TransformConformation { .. } => "transform_conformation",
            Self::Component { .. } => "component",
            Self::Representation { .. } => "representation",
            Self::Label { .. } => "label",
            Self::AnnotationLabel { .. } => "annotation_label",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineTooltip {
    pub text: String,
    pub selector: Selector,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationTooltip {
    pub annotation_id: String,
    pub field_name: String,
}

/// Custom properties a host attaches to a structure cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CellProperties {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<RegisteredAnnotation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inline_tooltips: Vec<InlineTooltip>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotation_tooltips: Vec<AnnotationTooltip>,
}

impl CellProperties {
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
            && self.inline_tooltips.is_empty()
            && self.annotation_tooltips.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddChild {
        parent: CellRef,
        cell: CellRef,
        transform: SceneTransform,
    },
    RemoveChildren {
        parent: CellRef,
    },
    SetProperties {
        cell: CellRef,
        properties: CellProperties,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Unknown cell {0}")]
    UnknownCell(CellRef),

    #[error("Cell {0} already exists")]
    DuplicateCell(CellRef),

    #[error("{0}")]
    Rejected(String),
}

/// The scene graph an interpretation run writes into.
///
/// Implementations must make [`SceneHost::apply`] atomic: either every
/// mutation takes effect or none does. A host that commits asynchronously
/// blocks inside `apply` until the commit has settled.
pub trait SceneHost {
    /// The cell new content is attached under.
    fn root(&self) -> CellRef;

    /// Reserves a fresh cell reference. Reserving does not change the scene.
    fn allocate_ref(&mut self) -> CellRef;

    fn apply(&mut self, mutations: Vec<Mutation>) -> Result<(), HostError>;

    fn begin_batch(&mut self, anchor: CellRef) -> Batch<'_, Self>
    where
        Self: Sized,
    {
        Batch::new(self, anchor)
    }
}

/// What the host should do with the camera once the batch is committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CameraUpdate {
    /// Place the camera exactly as described.
    Camera(CameraParams),
    /// Frame the content of a cell.
    Focus { cell: CellRef },
    Keep,
    /// Frame the whole scene.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasParams>,
    pub camera: CameraUpdate,
}
