use super::io::TreeError;
use crate::core::annotations::spec::{AnnotationFormat, AnnotationSchema, AnnotationSource};
use crate::core::color::Color;
use crate::core::selection::selector::ComponentSelector;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The closed set of node kinds an MVS tree may contain.
///
/// Anything else decodes as [`NodeKind::Unknown`] and is carried through
/// unchanged so newer documents still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Download,
    Parse,
    Structure,
    Transform,
    Component,
    ComponentFromUri,
    ComponentFromSource,
    Representation,
    Color,
    ColorFromUri,
    ColorFromSource,
    Label,
    LabelFromUri,
    LabelFromSource,
    Tooltip,
    TooltipFromUri,
    TooltipFromSource,
    Focus,
    Camera,
    Canvas,
    Unknown,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Download => "download",
            Self::Parse => "parse",
            Self::Structure => "structure",
            Self::Transform => "transform",
            Self::Component => "component",
            Self::ComponentFromUri => "component_from_uri",
            Self::ComponentFromSource => "component_from_source",
            Self::Representation => "representation",
            Self::Color => "color",
            Self::ColorFromUri => "color_from_uri",
            Self::ColorFromSource => "color_from_source",
            Self::Label => "label",
            Self::LabelFromUri => "label_from_uri",
            Self::LabelFromSource => "label_from_source",
            Self::Tooltip => "tooltip",
            Self::TooltipFromUri => "tooltip_from_uri",
            Self::TooltipFromSource => "tooltip_from_source",
            Self::Focus => "focus",
            Self::Camera => "camera",
            Self::Canvas => "canvas",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "root" => Self::Root,
            "download" => Self::Download,
            "parse" => Self::Parse,
            "structure" => Self::Structure,
            "transform" => Self::Transform,
            "component" => Self::Component,
            "component_from_uri" => Self::ComponentFromUri,
            "component_from_source" => Self::ComponentFromSource,
            "representation" => Self::Representation,
            "color" => Self::Color,
            "color_from_uri" => Self::ColorFromUri,
            "color_from_source" => Self::ColorFromSource,
            "label" => Self::Label,
            "label_from_uri" => Self::LabelFromUri,
            "label_from_source" => Self::LabelFromSource,
            "tooltip" => Self::Tooltip,
            "tooltip_from_uri" => Self::TooltipFromUri,
            "tooltip_from_source" => Self::TooltipFromSource,
            "focus" => Self::Focus,
            "camera" => Self::Camera,
            "canvas" => Self::Canvas,
            _ => Self::Unknown,
        }
    }

    pub fn is_color(self) -> bool {
        matches!(self, Self::Color | Self::ColorFromUri | Self::ColorFromSource)
    }

    pub fn is_tooltip(self) -> bool {
        matches!(
            self,
            Self::Tooltip | Self::TooltipFromUri | Self::TooltipFromSource
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFormat {
    Mmcif,
    Bcif,
    Pdb,
}

impl ParseFormat {
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Bcif)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureType {
    Model,
    Assembly,
    Symmetry,
    SymmetryMates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationType {
    BallAndStick,
    Cartoon,
    Surface,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadParams {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParseParams {
    pub format: ParseFormat,
}

/// Params of a `structure` node. Defaults are applied when the structure is
/// built, so an absent field and its default serialize differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructureParams {
    #[serde(rename = "type")]
    pub kind: StructureType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assembly_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ijk_min: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ijk_max: Option<Vec<i32>>,
}

impl StructureParams {
    pub fn new(kind: StructureType) -> Self {
        Self {
            kind,
            block_header: None,
            block_index: None,
            model_index: None,
            assembly_id: None,
            radius: None,
            ijk_min: None,
            ijk_max: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformParams {
    /// Row-major 3x3 rotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<ComponentSelector>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepresentationParams {
    #[serde(rename = "type")]
    pub kind: RepresentationType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorParams {
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<ComponentSelector>,
}

/// Params of `label` and `tooltip` nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextParams {
    pub text: String,
}

fn default_up() -> [f64; 3] {
    [0.0, 1.0, 0.0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraParams {
    pub target: [f64; 3],
    pub position: [f64; 3],
    #[serde(default = "default_up")]
    pub up: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanvasParams {
    pub background_color: Color,
}

/// Params shared by every `*_from_uri` and `*_from_source` node.
///
/// `source` is `Url` for the `_from_uri` kinds and `SourceCif` for the
/// `_from_source` kinds; the remaining fields locate the annotation inside that
/// source and pick the field to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationParams {
    pub source: AnnotationSource,
    pub schema: AnnotationSchema,
    pub block_header: Option<String>,
    pub block_index: Option<usize>,
    pub category_name: Option<String>,
    pub field_name: Option<String>,
    pub field_values: Option<Vec<String>>,
}

impl AnnotationParams {
    pub fn new(source: AnnotationSource, schema: AnnotationSchema) -> Self {
        Self {
            source,
            schema,
            block_header: None,
            block_index: None,
            category_name: None,
            field_name: None,
            field_values: None,
        }
    }

    /// The field to read, falling back to the default for the node's kind.
    pub fn field_name_or(&self, default: &str) -> String {
        self.field_name.as_deref().unwrap_or(default).to_string()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnnotationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<AnnotationFormat>,
    schema: AnnotationSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    block_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    block_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_values: Option<Vec<String>>,
}

impl RawAnnotationParams {
    fn into_params(self, kind: &str, from_uri: bool) -> Result<AnnotationParams, TreeError> {
        let source = if from_uri {
            match (self.uri, self.format) {
                (Some(url), Some(format)) => AnnotationSource::Url { url, format },
                (None, _) => return Err(missing_field(kind, "uri")),
                (_, None) => return Err(missing_field(kind, "format")),
            }
        } else {
            if self.uri.is_some() || self.format.is_some() {
                return Err(TreeError::InvalidParams {
                    kind: kind.to_string(),
                    message: "`uri` and `format` are only valid on *_from_uri nodes".to_string(),
                });
            }
            AnnotationSource::SourceCif
        };
        Ok(AnnotationParams {
            source,
            schema: self.schema,
            block_header: self.block_header,
            block_index: self.block_index,
            category_name: self.category_name,
            field_name: self.field_name,
            field_values: self.field_values,
        })
    }
}

impl From<&AnnotationParams> for RawAnnotationParams {
    fn from(params: &AnnotationParams) -> Self {
        let (uri, format) = match &params.source {
            AnnotationSource::Url { url, format } => (Some(url.clone()), Some(*format)),
            AnnotationSource::SourceCif => (None, None),
        };
        Self {
            uri,
            format,
            schema: params.schema,
            block_header: params.block_header.clone(),
            block_index: params.block_index,
            category_name: params.category_name.clone(),
            field_name: params.field_name.clone(),
            field_values: params.field_values.clone(),
        }
    }
}

/// A node kind that this interpreter does not know, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownParams {
    pub kind: String,
    pub params: Option<Value>,
}

/// Typed params of a node. The variant is the node's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeParams {
    Root,
    Download(DownloadParams),
    Parse(ParseParams),
    Structure(StructureParams),
    Transform(TransformParams),
    Component(ComponentParams),
    ComponentFromUri(AnnotationParams),
    ComponentFromSource(AnnotationParams),
    Representation(RepresentationParams),
    Color(ColorParams),
    ColorFromUri(AnnotationParams),
    ColorFromSource(AnnotationParams),
    Label(TextParams),
    LabelFromUri(AnnotationParams),
    LabelFromSource(AnnotationParams),
    Tooltip(TextParams),
    TooltipFromUri(AnnotationParams),
    TooltipFromSource(AnnotationParams),
    Focus,
    Camera(CameraParams),
    Canvas(CanvasParams),
    Unknown(UnknownParams),
}

impl NodeParams {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Root => NodeKind::Root,
            Self::Download(_) => NodeKind::Download,
            Self::Parse(_) => NodeKind::Parse,
            Self::Structure(_) => NodeKind::Structure,
            Self::Transform(_) => NodeKind::Transform,
            Self::Component(_) => NodeKind::Component,
            Self::ComponentFromUri(_) => NodeKind::ComponentFromUri,
            Self::ComponentFromSource(_) => NodeKind::ComponentFromSource,
            Self::Representation(_) => NodeKind::Representation,
            Self::Color(_) => NodeKind::Color,
            Self::ColorFromUri(_) => NodeKind::ColorFromUri,
            Self::ColorFromSource(_) => NodeKind::ColorFromSource,
            Self::Label(_) => NodeKind::Label,
            Self::LabelFromUri(_) => NodeKind::LabelFromUri,
            Self::LabelFromSource(_) => NodeKind::LabelFromSource,
            Self::Tooltip(_) => NodeKind::Tooltip,
            Self::TooltipFromUri(_) => NodeKind::TooltipFromUri,
            Self::TooltipFromSource(_) => NodeKind::TooltipFromSource,
            Self::Focus => NodeKind::Focus,
            Self::Camera(_) => NodeKind::Camera,
            Self::Canvas(_) => NodeKind::Canvas,
            Self::Unknown(_) => NodeKind::Unknown,
        }
    }

    pub fn kind_name(&self) -> &str {
        match self {
            Self::Unknown(unknown) => &unknown.kind,
            other => other.kind().as_str(),
        }
    }

    /// The annotation params of any `*_from_uri` / `*_from_source` node.
    pub fn annotation(&self) -> Option<&AnnotationParams> {
        match self {
            Self::ComponentFromUri(p)
            | Self::ComponentFromSource(p)
            | Self::ColorFromUri(p)
            | Self::ColorFromSource(p)
            | Self::LabelFromUri(p)
            | Self::LabelFromSource(p)
            | Self::TooltipFromUri(p)
            | Self::TooltipFromSource(p) => Some(p),
            _ => None,
        }
    }

    /// Decodes the JSON params of a node of kind `kind`.
    ///
    /// A `null` params value is treated as absent. Unknown kinds keep their raw
    /// params.
    pub fn decode(kind: &str, params: Option<Value>) -> Result<Self, TreeError> {
        let params = params.filter(|value| !value.is_null());
        match NodeKind::from_name(kind) {
            NodeKind::Root => no_params(kind, params).map(|_| Self::Root),
            NodeKind::Download => typed(kind, params).map(Self::Download),
            NodeKind::Parse => typed(kind, params).map(Self::Parse),
            NodeKind::Structure => typed(kind, params).map(Self::Structure),
            NodeKind::Transform => typed(kind, params).map(Self::Transform),
            NodeKind::Component => typed(kind, params).map(Self::Component),
            NodeKind::ComponentFromUri => annotation(kind, params, true).map(Self::ComponentFromUri),
            NodeKind::ComponentFromSource => {
                annotation(kind, params, false).map(Self::ComponentFromSource)
            }
            NodeKind::Representation => typed(kind, params).map(Self::Representation),
            NodeKind::Color => typed(kind, params).map(Self::Color),
            NodeKind::ColorFromUri => annotation(kind, params, true).map(Self::ColorFromUri),
            NodeKind::ColorFromSource => annotation(kind, params, false).map(Self::ColorFromSource),
            NodeKind::Label => typed(kind, params).map(Self::Label),
            NodeKind::LabelFromUri => annotation(kind, params, true).map(Self::LabelFromUri),
            NodeKind::LabelFromSource => annotation(kind, params, false).map(Self::LabelFromSource),
            NodeKind::Tooltip => typed(kind, params).map(Self::Tooltip),
            NodeKind::TooltipFromUri => annotation(kind, params, true).map(Self::TooltipFromUri),
            NodeKind::TooltipFromSource => {
                annotation(kind, params, false).map(Self::TooltipFromSource)
            }
            NodeKind::Focus => no_params(kind, params).map(|_| Self::Focus),
            NodeKind::Camera => typed(kind, params).map(Self::Camera),
            NodeKind::Canvas => typed(kind, params).map(Self::Canvas),
            NodeKind::Unknown => Ok(Self::Unknown(UnknownParams {
                kind: kind.to_string(),
                params,
            })),
        }
    }

    /// Encodes the params back into their JSON form. Kinds without params
    /// encode as `None`.
    pub fn encode(&self) -> Result<Option<Value>, serde_json::Error> {
        match self {
            Self::Root | Self::Focus => Ok(None),
            Self::Download(p) => encoded(p),
            Self::Parse(p) => encoded(p),
            Self::Structure(p) => encoded(p),
            Self::Transform(p) => encoded(p),
            Self::Component(p) => encoded(p),
            Self::Representation(p) => encoded(p),
            Self::Color(p) => encoded(p),
            Self::Label(p) | Self::Tooltip(p) => encoded(p),
            Self::Camera(p) => encoded(p),
            Self::Canvas(p) => encoded(p),
            Self::ComponentFromUri(p)
            | Self::ComponentFromSource(p)
            | Self::ColorFromUri(p)
            | Self::ColorFromSource(p)
            | Self::LabelFromUri(p)
            | Self::LabelFromSource(p)
            | Self::TooltipFromUri(p)
            | Self::TooltipFromSource(p) => encoded(&RawAnnotationParams::from(p)),
            Self::Unknown(unknown) => Ok(unknown.params.clone()),
        }
    }
}

fn missing_field(kind: &str, field: &str) -> TreeError {
    TreeError::InvalidParams {
        kind: kind.to_string(),
        message: format!("missing field `{field}`"),
    }
}

fn typed<T: DeserializeOwned>(kind: &str, params: Option<Value>) -> Result<T, TreeError> {
    let value = params.unwrap_or_else(|| Value::Object(Map::new()));
    serde_json::from_value(value).map_err(|e| TreeError::InvalidParams {
        kind: kind.to_string(),
        message: e.to_string(),
    })
}

fn annotation(
    kind: &str,
    params: Option<Value>,
    from_uri: bool,
) -> Result<AnnotationParams, TreeError> {
    typed::<RawAnnotationParams>(kind, params)?.into_params(kind, from_uri)
}

fn no_params(kind: &str, params: Option<Value>) -> Result<(), TreeError> {
    match params {
        None => Ok(()),
        Some(Value::Object(map)) if map.is_empty() => Ok(()),
        Some(_) => Err(TreeError::InvalidParams {
            kind: kind.to_string(),
            message: "this node kind takes no params".to_string(),
        }),
    }
}

fn encoded<T: Serialize>(params: &T) -> Result<Option<Value>, serde_json::Error> {
    serde_json::to_value(params).map(Some)
}
