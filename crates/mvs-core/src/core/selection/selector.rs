use super::expression::ComponentExpression;
use crate::core::models::atom::Atom;
use crate::core::models::entity::{EntityType, PolymerKind};
use crate::core::models::ids::ElementIndex;
use crate::core::models::structure::Model;
use crate::core::utils::identifiers;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticSelector {
    #[default]
    All,
    Polymer,
    Protein,
    Nucleic,
    Branched,
    Ligand,
    Ion,
    Water,
}

impl StaticSelector {
    pub fn matches(self, model: &Model, atom: &Atom) -> bool {
        if self == Self::All {
            return true;
        }
        let entity_type = model.entity_type_of(atom);
        match self {
            Self::All => true,
            Self::Polymer => entity_type.is_polymer(),
            Self::Protein => entity_type == EntityType::Polymer(PolymerKind::Protein),
            Self::Nucleic => entity_type == EntityType::Polymer(PolymerKind::Nucleic),
            Self::Branched => entity_type == EntityType::Branched,
            Self::Water => entity_type == EntityType::Water,
            Self::Ion => {
                entity_type == EntityType::NonPolymer && identifiers::is_ion(&atom.label_comp_id)
            }
            Self::Ligand => {
                entity_type == EntityType::NonPolymer && !identifiers::is_ion(&atom.label_comp_id)
            }
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Polymer => "Polymer",
            Self::Protein => "Protein",
            Self::Nucleic => "Nucleic",
            Self::Branched => "Branched",
            Self::Ligand => "Ligand",
            Self::Ion => "Ion",
            Self::Water => "Water",
        }
    }
}

/// The `selector` param as written in a document: a static name, one
/// expression, or a list of expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentSelector {
    Static(StaticSelector),
    Expression(ComponentExpression),
    Expressions(Vec<ComponentExpression>),
}

impl ComponentSelector {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::Static(StaticSelector::All))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptLanguage {
    Pymol,
    Vmd,
    Jmol,
    MolScript,
}

impl fmt::Display for ScriptLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pymol => "pymol",
            Self::Vmd => "vmd",
            Self::Jmol => "jmol",
            Self::MolScript => "mol-script",
        })
    }
}

/// Precomputed element indices for one model, addressed by model position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleEntry {
    pub model_index: usize,
    pub elements: Vec<ElementIndex>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementBundle {
    pub entries: Vec<BundleEntry>,
}

/// A resolved selection request handed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Selector {
    Static {
        selector: StaticSelector,
    },
    /// Union of the expressions.
    Expression {
        expressions: Vec<ComponentExpression>,
    },
    Bundle {
        bundle: ElementBundle,
    },
    Script {
        language: ScriptLanguage,
        text: String,
    },
    /// Elements whose annotation field equals one of `field_values`, or is
    /// non-empty when no values are given.
    Annotation {
        annotation_id: String,
        field_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field_values: Option<Vec<String>>,
    },
}

impl Default for Selector {
    fn default() -> Self {
        Self::all()
    }
}

impl Selector {
    pub fn all() -> Self {
        Self::Static {
            selector: StaticSelector::All,
        }
    }

    /// Converts a document selector, where an absent selector means `all`.
    pub fn from_component(selector: Option<&ComponentSelector>) -> Self {
        match selector {
            None => Self::all(),
            Some(ComponentSelector::Static(selector)) => Self::Static {
                selector: *selector,
            },
            Some(ComponentSelector::Expression(expression)) => Self::Expression {
                expressions: vec![expression.clone()],
            },
            Some(ComponentSelector::Expressions(expressions)) => Self::Expression {
                expressions: expressions.clone(),
            },
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(
            self,
            Self::Static {
                selector: StaticSelector::All
            }
        )
    }

    /// Human-readable name for the component built from this selector.
    pub fn label(&self) -> String {
        match self {
            Self::Static { selector } => selector.display_name().to_string(),
            Self::Expression { .. } => "Custom Selection".to_string(),
            Self::Bundle { .. } => "Element Bundle".to_string(),
            Self::Script { language, .. } => format!("Script ({language})"),
            Self::Annotation { field_name, .. } => format!("Annotation: {field_name}"),
        }
    }
}
