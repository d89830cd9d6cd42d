use super::context::LoadingContext;
use super::error::EngineError;
use crate::core::annotations::table::AnnotationLookup;
use crate::core::color::Color;
use crate::core::models::structure::StructureData;
use crate::core::selection::element_set::{ElementLocation, ElementSet};
use crate::core::selection::error::SelectionError;
use crate::core::selection::selector::Selector;
use crate::core::tree::ids::NodeId;
use crate::core::tree::node::Tree;
use crate::core::tree::params::NodeParams;
use serde::Serialize;

/// How a representation or label is colored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ColorTheme {
    Uniform {
        color: Color,
    },
    /// Colors read per element from an annotation field.
    Annotation {
        annotation_id: String,
        field_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        background: Option<Color>,
    },
    /// Later layers override earlier ones where their selections overlap.
    Layered {
        layers: Vec<ColorLayer>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorLayer {
    pub theme: ColorTheme,
    pub selection: Selector,
}

impl ColorTheme {
    pub fn uniform(color: Color) -> Self {
        Self::Uniform { color }
    }

    /// Resolves every layer selection against `structure` so the theme can be
    /// evaluated per element.
    pub fn bind<'a>(
        &'a self,
        structure: &StructureData,
        annotations: &'a dyn AnnotationLookup,
    ) -> Result<BoundColorTheme<'a>, SelectionError> {
        let bound = match self {
            Self::Uniform { color } => BoundColorTheme::Uniform(*color),
            Self::Annotation {
                annotation_id,
                field_name,
                background,
            } => BoundColorTheme::Annotation {
                annotation_id,
                field_name,
                background: *background,
                lookup: annotations,
            },
            Self::Layered { layers } => BoundColorTheme::Layered(
                layers
                    .iter()
                    .map(|layer| {
                        let set = ElementSet::from_selector(
                            Some(structure),
                            &layer.selection,
                            annotations,
                        )?;
                        Ok((set, layer.theme.bind(structure, annotations)?))
                    })
                    .collect::<Result<Vec<_>, SelectionError>>()?,
            ),
        };
        Ok(bound)
    }
}

/// A color theme with its selections resolved against one structure.
pub enum BoundColorTheme<'a> {
    Uniform(Color),
    Annotation {
        annotation_id: &'a str,
        field_name: &'a str,
        background: Option<Color>,
        lookup: &'a dyn AnnotationLookup,
    },
    Layered(Vec<(ElementSet, BoundColorTheme<'a>)>),
}

impl BoundColorTheme<'_> {
    /// The color of one element, or `None` when no layer colors it.
    pub fn color_at(&self, location: ElementLocation) -> Option<Color> {
        match self {
            Self::Uniform(color) => Some(*color),
            Self::Annotation {
                annotation_id,
                field_name,
                background,
                lookup,
            } => lookup
                .field_value(annotation_id, location, field_name)
                .and_then(|value| Color::decode(value).ok())
                .or(*background),
            Self::Layered(layers) => layers
                .iter()
                .rev()
                .filter(|(set, _)| set.has(location))
                .find_map(|(_, theme)| theme.color_at(location)),
        }
    }
}

fn is_color_node(tree: &Tree, node: NodeId) -> bool {
    tree.kind(node).is_some_and(|kind| kind.is_color())
}

/// Whether a lone color child colors the whole representation.
fn covers_whole_representation(params: &NodeParams) -> bool {
    match params {
        NodeParams::Color(color) => color.selector.as_ref().is_none_or(|s| s.is_all()),
        NodeParams::ColorFromUri(_) | NodeParams::ColorFromSource(_) => true,
        _ => false,
    }
}

fn layer_selection(params: &NodeParams) -> Selector {
    match params {
        NodeParams::Color(color) => Selector::from_component(color.selector.as_ref()),
        _ => Selector::all(),
    }
}

/// Builds the color theme contributed by `node`.
///
/// A representation composes its direct color children: none gives the
/// uniform default, one whole-representation child gives that child's theme,
/// anything else a layer per child in document order. A `color` node is
/// uniform; an annotation color node reads its field, falling back to the
/// default when the node has no annotation id.
///
/// # Errors
///
/// Returns [`EngineError::UnsupportedColorNode`] for any other kind.
pub fn color_theme_for_node(
    tree: &Tree,
    node: NodeId,
    context: &LoadingContext,
    default_color: Color,
) -> Result<ColorTheme, EngineError> {
    let params = tree
        .params(node)
        .ok_or_else(|| EngineError::Internal(format!("Node {node:?} is not in the tree")))?;

    match params {
        NodeParams::Representation(_) => {
            let color_children: Vec<NodeId> = tree
                .children(node)
                .iter()
                .copied()
                .filter(|child| is_color_node(tree, *child))
                .collect();

            match color_children.as_slice() {
                [] => Ok(ColorTheme::uniform(default_color)),
                [only]
                    if tree
                        .params(*only)
                        .is_some_and(covers_whole_representation) =>
                {
                    color_theme_for_node(tree, *only, context, default_color)
                }
                children => {
                    let layers = children
                        .iter()
                        .map(|child| {
                            let theme = color_theme_for_node(tree, *child, context, default_color)?;
                            let selection = tree.params(*child).map_or_else(Selector::all, layer_selection);
                            Ok(ColorLayer { theme, selection })
                        })
                        .collect::<Result<Vec<_>, EngineError>>()?;
                    Ok(ColorTheme::Layered { layers })
                }
            }
        }
        NodeParams::Color(color) => Ok(ColorTheme::uniform(color.color)),
        NodeParams::ColorFromUri(annotation) | NodeParams::ColorFromSource(annotation) => {
            match context.annotation_id(node) {
                Some(annotation_id) => Ok(ColorTheme::Annotation {
                    annotation_id: annotation_id.to_string(),
                    field_name: annotation.field_name_or("color"),
                    background: None,
                }),
                None => Ok(ColorTheme::uniform(default_color)),
            }
        }
        other => Err(EngineError::UnsupportedColorNode {
            node,
            kind: other.kind_name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotations::spec::{AnnotationFormat, AnnotationSchema, AnnotationSource};
    use crate::core::annotations::table::{AnnotationRegistry, AnnotationTable, NoAnnotations};
    use crate::core::models::atom::Atom;
    use crate::core::models::ids::ModelId;
    use crate::core::selection::expression::ComponentExpression;
    use crate::core::selection::selector::{ComponentSelector, StaticSelector};
    use crate::core::tree::params::{
        AnnotationParams, ColorParams, RepresentationParams, RepresentationType,
    };

    const RED: Color = Color::from_hex(0xff0000);
    const BLUE: Color = Color::from_hex(0x0000ff);

    fn representation(tree: &mut Tree) -> NodeId {
        tree.add_child(
            tree.root(),
            NodeParams::Representation(RepresentationParams {
                kind: RepresentationType::Cartoon,
            }),
        )
        .unwrap()
    }

    fn color(color: Color, selector: Option<ComponentSelector>) -> NodeParams {
        NodeParams::Color(ColorParams { color, selector })
    }

    fn chain(id: &str) -> ComponentSelector {
        ComponentSelector::Expression(ComponentExpression {
            label_asym_id: Some(id.into()),
            ..Default::default()
        })
    }

    fn theme_of(tree: &Tree, node: NodeId) -> ColorTheme {
        let context = LoadingContext::prepare(tree).unwrap();
        color_theme_for_node(tree, node, &context, Color::DEFAULT).unwrap()
    }

    #[test]
    fn no_color_children_gives_uniform_default() {
        let mut tree = Tree::new();
        let repr = representation(&mut tree);
        assert_eq!(theme_of(&tree, repr), ColorTheme::uniform(Color::WHITE));
    }

    #[test]
    fn single_unscoped_color_is_uniform() {
        let mut tree = Tree::new();
        let repr = representation(&mut tree);
        tree.add_child(repr, color(RED, None)).unwrap();
        assert_eq!(theme_of(&tree, repr), ColorTheme::uniform(RED));

        let mut tree = Tree::new();
        let repr = representation(&mut tree);
        tree.add_child(repr, color(RED, Some(ComponentSelector::Static(StaticSelector::All))))
            .unwrap();
        assert_eq!(theme_of(&tree, repr), ColorTheme::uniform(RED));
    }

    #[test]
    fn scoped_children_become_ordered_layers() {
        let mut tree = Tree::new();
        let repr = representation(&mut tree);
        tree.add_child(repr, color(RED, Some(chain("A")))).unwrap();
        tree.add_child(repr, color(BLUE, Some(chain("B")))).unwrap();
        let ColorTheme::Layered { layers } = theme_of(&tree, repr) else {
            panic!("expected a layered theme");
        };
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].theme, ColorTheme::uniform(RED));
        assert_eq!(layers[1].theme, ColorTheme::uniform(BLUE));
        assert!(!layers[0].selection.is_all());
    }

    #[test]
    fn single_scoped_color_is_still_layered() {
        let mut tree = Tree::new();
        let repr = representation(&mut tree);
        tree.add_child(repr, color(RED, Some(chain("A")))).unwrap();
        assert!(matches!(theme_of(&tree, repr), ColorTheme::Layered { layers } if layers.len() == 1));
    }

    #[test]
    fn annotation_color_uses_context_id_and_default_field() {
        let mut tree = Tree::new();
        let repr = representation(&mut tree);
        let node = tree
            .add_child(
                repr,
                NodeParams::ColorFromUri(AnnotationParams::new(
                    AnnotationSource::Url {
                        url: "https://a/colors.json".into(),
                        format: AnnotationFormat::Json,
                    },
                    AnnotationSchema::Chain,
                )),
            )
            .unwrap();
        let context = LoadingContext::prepare(&tree).unwrap();
        let expected_id = context.annotation_id(node).unwrap().to_string();
        let theme = color_theme_for_node(&tree, repr, &context, Color::DEFAULT).unwrap();
        assert_eq!(
            theme,
            ColorTheme::Annotation {
                annotation_id: expected_id,
                field_name: "color".into(),
                background: None
            }
        );
    }

    #[test]
    fn non_color_node_is_unsupported() {
        let mut tree = Tree::new();
        let focus = tree.add_child(tree.root(), NodeParams::Focus).unwrap();
        let context = LoadingContext::prepare(&tree).unwrap();
        let err = color_theme_for_node(&tree, focus, &context, Color::DEFAULT).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedColorNode { ref kind, .. } if kind == "focus"));
    }

    fn two_chain_structure() -> (StructureData, ModelId) {
        let mut data = StructureData::new();
        let model = data.add_model();
        data.add_atom(model, Atom::new(1, "C", "CA", "ALA", "A", "1", Some(1)));
        data.add_atom(model, Atom::new(2, "C", "CA", "ALA", "B", "1", Some(1)));
        data.add_atom(model, Atom::new(3, "C", "CA", "ALA", "C", "1", Some(1)));
        (data, model)
    }

    #[test]
    fn later_layers_override_earlier_ones() {
        let (data, model) = two_chain_structure();
        let theme = ColorTheme::Layered {
            layers: vec![
                ColorLayer {
                    theme: ColorTheme::uniform(RED),
                    selection: Selector::all(),
                },
                ColorLayer {
                    theme: ColorTheme::uniform(BLUE),
                    selection: Selector::from_component(Some(&chain("B"))),
                },
            ],
        };
        let bound = theme.bind(&data, &NoAnnotations).unwrap();
        assert_eq!(bound.color_at(ElementLocation::new(model, 0)), Some(RED));
        assert_eq!(bound.color_at(ElementLocation::new(model, 1)), Some(BLUE));
    }

    #[test]
    fn annotation_theme_decodes_field_values_and_falls_back_to_background() {
        let (data, model) = two_chain_structure();
        let table = AnnotationTable::from_json(
            r##"[ { "label_asym_id": "A", "color": "#0000ff" }, { "label_asym_id": "B", "color": "nope" } ]"##,
            AnnotationSchema::Chain,
        )
        .unwrap();
        let mut registry = AnnotationRegistry::new();
        registry.insert("ann-x", table.resolve(&data));

        let theme = ColorTheme::Annotation {
            annotation_id: "ann-x".into(),
            field_name: "color".into(),
            background: Some(RED),
        };
        let bound = theme.bind(&data, &registry).unwrap();
        assert_eq!(bound.color_at(ElementLocation::new(model, 0)), Some(BLUE));
        assert_eq!(bound.color_at(ElementLocation::new(model, 1)), Some(RED));
        assert_eq!(bound.color_at(ElementLocation::new(model, 2)), Some(RED));
    }

    #[test]
    fn uncolored_layer_elements_fall_through_to_earlier_layers() {
        let (data, model) = two_chain_structure();
        let theme = ColorTheme::Layered {
            layers: vec![
                ColorLayer {
                    theme: ColorTheme::uniform(RED),
                    selection: Selector::all(),
                },
                ColorLayer {
                    theme: ColorTheme::Annotation {
                        annotation_id: "missing".into(),
                        field_name: "color".into(),
                        background: None,
                    },
                    selection: Selector::all(),
                },
            ],
        };
        let bound = theme.bind(&data, &NoAnnotations).unwrap();
        assert_eq!(bound.color_at(ElementLocation::new(model, 2)), Some(RED));
    }
}
