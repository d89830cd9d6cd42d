use super::color_theme::{ColorTheme, color_theme_for_node};
use super::config::LoadOptions;
use super::context::{FocusRequest, LoadingContext};
use super::error::{EngineError, ParameterError};
use super::host::{
    AnnotationTooltip, CellProperties, CellRef, InlineTooltip, SceneHost, SceneTransform,
    StructureKind,
};
use super::transaction::Batch;
use crate::core::annotations::spec::CifBlock;
use crate::core::selection::selector::Selector;
use crate::core::tree::ids::NodeId;
use crate::core::tree::node::Tree;
use crate::core::tree::params::{
    AnnotationParams, ComponentParams, DownloadParams, NodeKind, NodeParams, StructureParams,
    StructureType, TextParams,
};
use crate::core::tree::traverse::preorder;
use crate::core::utils::geometry::transform_matrix;
use std::collections::HashSet;
use tracing::debug;

const DEFAULT_SYMMETRY_RADIUS: f64 = 5.0;
const DEFAULT_IJK_MIN: [i32; 3] = [-1, -1, -1];
const DEFAULT_IJK_MAX: [i32; 3] = [1, 1, 1];

/// How the compiler treats a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// Runs an action that may add cells.
    Action,
    /// Consumed by the parent's action; children inherit the parent's result.
    PassThrough,
    Unrecognized,
}

pub(crate) fn role(params: &NodeParams) -> Role {
    match params {
        NodeParams::Root
        | NodeParams::Download(_)
        | NodeParams::Parse(_)
        | NodeParams::Structure(_)
        | NodeParams::Component(_)
        | NodeParams::ComponentFromUri(_)
        | NodeParams::ComponentFromSource(_)
        | NodeParams::Representation(_)
        | NodeParams::Label(_)
        | NodeParams::LabelFromUri(_)
        | NodeParams::LabelFromSource(_)
        | NodeParams::Focus
        | NodeParams::Camera(_)
        | NodeParams::Canvas(_) => Role::Action,
        NodeParams::Transform(_)
        | NodeParams::Color(_)
        | NodeParams::ColorFromUri(_)
        | NodeParams::ColorFromSource(_)
        | NodeParams::Tooltip(_)
        | NodeParams::TooltipFromUri(_)
        | NodeParams::TooltipFromSource(_) => Role::PassThrough,
        NodeParams::Unknown(_) => Role::Unrecognized,
    }
}

/// Everything an action can see and touch during one run.
pub(crate) struct ActionScope<'s, 'h, H: SceneHost + ?Sized> {
    pub tree: &'s Tree,
    pub context: &'s mut LoadingContext,
    pub batch: &'s mut Batch<'h, H>,
    pub options: &'s LoadOptions,
}

/// Runs the action registered for `params`, adding cells under `parent`.
///
/// Returns the cell the node's children attach to.
pub(crate) fn run<H: SceneHost + ?Sized>(
    scope: &mut ActionScope<'_, '_, H>,
    node: NodeId,
    params: &NodeParams,
    parent: CellRef,
) -> Result<Option<CellRef>, EngineError> {
    let result = match params {
        NodeParams::Root => Some(parent),
        NodeParams::Download(download) => Some(download_action(scope, node, download, parent)),
        NodeParams::Parse(parse) => Some(
            scope
                .batch
                .add_child(parent, SceneTransform::Parse { format: parse.format }),
        ),
        NodeParams::Structure(structure) => {
            Some(structure_action(scope, node, structure, parent)?)
        }
        NodeParams::Component(component) => Some(component_action(scope, node, component, parent)),
        NodeParams::ComponentFromUri(annotation) | NodeParams::ComponentFromSource(annotation) => {
            Some(annotation_component_action(scope, node, annotation, parent)?)
        }
        NodeParams::Representation(representation) => {
            let color_theme = color_theme_for_node(
                scope.tree,
                node,
                scope.context,
                scope.options.default_color,
            )?;
            Some(scope.batch.add_child(
                parent,
                SceneTransform::Representation {
                    kind: representation.kind,
                    color_theme,
                },
            ))
        }
        NodeParams::Label(label) => Some(label_action(scope, node, label, parent)?),
        NodeParams::LabelFromUri(annotation) | NodeParams::LabelFromSource(annotation) => {
            Some(annotation_label_action(scope, node, annotation, parent)?)
        }
        NodeParams::Focus => {
            scope.context.focus = Some(FocusRequest::Target(parent));
            Some(parent)
        }
        NodeParams::Camera(camera) => {
            scope.context.focus = Some(FocusRequest::Camera(camera.clone()));
            Some(parent)
        }
        NodeParams::Canvas(canvas) => {
            scope.context.canvas = Some(canvas.clone());
            Some(parent)
        }
        other @ (NodeParams::Transform(_)
        | NodeParams::Color(_)
        | NodeParams::ColorFromUri(_)
        | NodeParams::ColorFromSource(_)
        | NodeParams::Tooltip(_)
        | NodeParams::TooltipFromUri(_)
        | NodeParams::TooltipFromSource(_)
        | NodeParams::Unknown(_)) => {
            return Err(EngineError::Internal(format!(
                "No action registered for '{}' nodes",
                other.kind_name()
            )));
        }
    };

    debug!(node = ?node, kind = params.kind_name(), cell = ?result, "Executed action");
    Ok(result)
}

fn download_action<H: SceneHost + ?Sized>(
    scope: &mut ActionScope<'_, '_, H>,
    node: NodeId,
    params: &DownloadParams,
    parent: CellRef,
) -> CellRef {
    let url = resolve_url(&params.url, scope.options.source_url.as_deref());
    let is_binary = scope.tree.children(node).iter().any(|child| {
        matches!(scope.tree.params(*child), Some(NodeParams::Parse(parse)) if parse.format.is_binary())
    });
    scope
        .batch
        .add_child(parent, SceneTransform::Download { url, is_binary })
}

/// Resolves `url` against the document address `base`.
///
/// Absolute URLs and any URL without a usable base are returned unchanged. A
/// leading `/` resolves against the base origin; anything else against the
/// base's directory, consuming `./` and `../` segments.
pub(crate) fn resolve_url(url: &str, base: Option<&str>) -> String {
    let Some(base) = base else {
        return url.to_string();
    };
    if url.contains("://") {
        return url.to_string();
    }
    let base = base.split(['?', '#']).next().unwrap_or(base);
    let Some(scheme_end) = base.find("://").map(|i| i + 3) else {
        return url.to_string();
    };
    let authority_end = base[scheme_end..]
        .find('/')
        .map_or(base.len(), |i| scheme_end + i);

    if let Some(path) = url.strip_prefix('/') {
        return format!("{}/{}", &base[..authority_end], path);
    }

    let mut dir = match base[authority_end..].rfind('/') {
        Some(i) => &base[..authority_end + i],
        None => &base[..authority_end],
    };
    let mut relative = url;
    loop {
        if let Some(rest) = relative.strip_prefix("./") {
            relative = rest;
        } else if let Some(rest) = relative.strip_prefix("../") {
            relative = rest;
            dir = match dir[authority_end..].rfind('/') {
                Some(i) => &dir[..authority_end + i],
                None => &dir[..authority_end],
            };
        } else {
            break;
        }
    }
    format!("{dir}/{relative}")
}

fn cell_vector(
    param: &'static str,
    values: Option<&[i32]>,
    default: [i32; 3],
) -> Result<[i32; 3], ParameterError> {
    match values {
        None => Ok(default),
        Some(values) => <[i32; 3]>::try_from(values).map_err(|_| ParameterError::VectorLength {
            param,
            actual: values.len(),
        }),
    }
}

fn structure_kind(params: &StructureParams) -> Result<StructureKind, ParameterError> {
    let ijk_min = cell_vector("ijk_min", params.ijk_min.as_deref(), DEFAULT_IJK_MIN)?;
    let ijk_max = cell_vector("ijk_max", params.ijk_max.as_deref(), DEFAULT_IJK_MAX)?;
    if ijk_min.iter().zip(&ijk_max).any(|(lo, hi)| lo > hi) {
        return Err(ParameterError::EmptyCellRange);
    }
    let radius = params.radius.unwrap_or(DEFAULT_SYMMETRY_RADIUS);
    if !radius.is_finite() || radius < 0.0 {
        return Err(ParameterError::InvalidRadius(radius));
    }

    Ok(match params.kind {
        StructureType::Model => StructureKind::Model,
        StructureType::Assembly => StructureKind::Assembly {
            assembly_id: params.assembly_id.clone(),
        },
        StructureType::Symmetry => StructureKind::Symmetry { ijk_min, ijk_max },
        StructureType::SymmetryMates => StructureKind::SymmetryMates { radius },
    })
}

fn structure_action<H: SceneHost + ?Sized>(
    scope: &mut ActionScope<'_, '_, H>,
    node: NodeId,
    params: &StructureParams,
    parent: CellRef,
) -> Result<CellRef, EngineError> {
    let kind = structure_kind(params).map_err(|source| EngineError::InvalidParameter {
        node,
        kind: "structure",
        source,
    })?;
    let block = match &params.block_header {
        Some(header) => CifBlock::Header(header.clone()),
        None => CifBlock::Index(params.block_index.unwrap_or(0)),
    };

    let model = scope.batch.add_child(
        parent,
        SceneTransform::Model {
            block,
            model_index: params.model_index.unwrap_or(0),
        },
    );
    let structure = scope
        .batch
        .add_child(model, SceneTransform::Structure { kind });

    let mut last = structure;
    for child in scope.tree.children(node) {
        let Some(NodeParams::Transform(transform)) = scope.tree.params(*child) else {
            continue;
        };
        let matrix = transform_matrix(
            transform.rotation.as_deref(),
            transform.translation.as_deref(),
        )
        .map_err(|e| EngineError::InvalidParameter {
            node: *child,
            kind: "transform",
            source: e.into(),
        })?;
        last = scope
            .batch
            .add_child(last, SceneTransform::TransformConformation { matrix });
    }

    let properties = structure_properties(scope.tree, scope.context, node)?;
    if !properties.is_empty() {
        scope.batch.set_properties(structure, properties);
    }
    Ok(last)
}

/// Collects the annotations and tooltips a structure cell carries.
fn structure_properties(
    tree: &Tree,
    context: &LoadingContext,
    structure: NodeId,
) -> Result<CellProperties, EngineError> {
    let mut properties = CellProperties::default();
    let mut seen = HashSet::new();

    for id in preorder(tree, structure) {
        let Some(params) = tree.params(id) else {
            continue;
        };
        if let Some(annotation_id) = context.annotation_id(id) {
            if seen.insert(annotation_id) {
                if let Some(annotation) = context.annotation(annotation_id) {
                    properties.annotations.push(annotation.clone());
                }
            }
        }

        match params {
            NodeParams::Tooltip(tooltip) => {
                let Some(component) = tree.parent(id) else {
                    continue;
                };
                if let Some(selector) = component_selector(tree, context, component)? {
                    properties.inline_tooltips.push(InlineTooltip {
                        text: tooltip.text.clone(),
                        selector,
                    });
                }
            }
            NodeParams::TooltipFromUri(annotation) | NodeParams::TooltipFromSource(annotation) => {
                properties.annotation_tooltips.push(AnnotationTooltip {
                    annotation_id: required_annotation_id(context, id)?.to_string(),
                    field_name: annotation.field_name_or("tooltip"),
                });
            }
            _ => {}
        }
    }
    Ok(properties)
}

fn required_annotation_id(context: &LoadingContext, node: NodeId) -> Result<&str, EngineError> {
    context
        .annotation_id(node)
        .ok_or_else(|| EngineError::Internal(format!("No annotation id recorded for node {node:?}")))
}

/// The selector of a component node, or `None` if `node` is not one.
fn component_selector(
    tree: &Tree,
    context: &LoadingContext,
    node: NodeId,
) -> Result<Option<Selector>, EngineError> {
    match tree.params(node) {
        Some(NodeParams::Component(component)) => {
            Ok(Some(Selector::from_component(component.selector.as_ref())))
        }
        Some(NodeParams::ComponentFromUri(annotation) | NodeParams::ComponentFromSource(annotation)) => {
            Ok(Some(Selector::Annotation {
                annotation_id: required_annotation_id(context, node)?.to_string(),
                field_name: annotation.field_name_or("component"),
                field_values: annotation.field_values.clone(),
            }))
        }
        _ => Ok(None),
    }
}

/// A component whose only children are tooltips adds no cell; its tooltips
/// live on the structure.
fn is_phantom_component(tree: &Tree, node: NodeId) -> bool {
    let children = tree.children(node);
    !children.is_empty()
        && children
            .iter()
            .all(|child| tree.kind(*child).is_some_and(NodeKind::is_tooltip))
}

fn component_action<H: SceneHost + ?Sized>(
    scope: &mut ActionScope<'_, '_, H>,
    node: NodeId,
    params: &ComponentParams,
    parent: CellRef,
) -> CellRef {
    if is_phantom_component(scope.tree, node) {
        return parent;
    }
    let selector = Selector::from_component(params.selector.as_ref());
    let label = selector.label();
    scope
        .batch
        .add_child(parent, SceneTransform::Component { selector, label })
}

fn annotation_component_action<H: SceneHost + ?Sized>(
    scope: &mut ActionScope<'_, '_, H>,
    node: NodeId,
    params: &AnnotationParams,
    parent: CellRef,
) -> Result<CellRef, EngineError> {
    if is_phantom_component(scope.tree, node) {
        return Ok(parent);
    }
    let selector = Selector::Annotation {
        annotation_id: required_annotation_id(scope.context, node)?.to_string(),
        field_name: params.field_name_or("component"),
        field_values: params.field_values.clone(),
    };
    let label = selector.label();
    Ok(scope
        .batch
        .add_child(parent, SceneTransform::Component { selector, label }))
}

/// The theme of the representation nearest to `node`, or the default color.
fn nearest_theme(
    tree: &Tree,
    context: &LoadingContext,
    options: &LoadOptions,
    node: NodeId,
) -> Result<ColorTheme, EngineError> {
    match context.nearest_representation(node) {
        Some(representation) => {
            color_theme_for_node(tree, representation, context, options.default_color)
        }
        None => Ok(ColorTheme::uniform(options.default_color)),
    }
}

fn label_action<H: SceneHost + ?Sized>(
    scope: &mut ActionScope<'_, '_, H>,
    node: NodeId,
    params: &TextParams,
    parent: CellRef,
) -> Result<CellRef, EngineError> {
    let color_theme = nearest_theme(scope.tree, scope.context, scope.options, node)?;
    Ok(scope.batch.add_child(
        parent,
        SceneTransform::Label {
            text: params.text.clone(),
            color_theme,
        },
    ))
}

fn annotation_label_action<H: SceneHost + ?Sized>(
    scope: &mut ActionScope<'_, '_, H>,
    node: NodeId,
    params: &AnnotationParams,
    parent: CellRef,
) -> Result<CellRef, EngineError> {
    let color_theme = nearest_theme(scope.tree, scope.context, scope.options, node)?;
    let annotation_id = required_annotation_id(scope.context, node)?.to_string();
    Ok(scope.batch.add_child(
        parent,
        SceneTransform::AnnotationLabel {
            annotation_id,
            field_name: params.field_name_or("label"),
            color_theme,
        },
    ))
}
