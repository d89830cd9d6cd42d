use super::error::SelectionError;
use super::script::ScriptQuery;
use super::selector::Selector;
use crate::core::annotations::table::AnnotationLookup;
use crate::core::models::atom::Atom;
use crate::core::models::ids::{ElementIndex, ModelId};
use crate::core::models::structure::{Model, StructureData};
use std::collections::BTreeMap;

/// Address of one element: the model it lives in and its index there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementLocation {
    pub model: ModelId,
    pub element: ElementIndex,
}

impl ElementLocation {
    pub fn new(model: ModelId, element: ElementIndex) -> Self {
        Self { model, element }
    }
}

/// The elements a selector picks out of one structure.
///
/// Indices are stored per model, strictly increasing, so membership is a
/// binary search. Models with no selected element have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSet {
    elements: BTreeMap<ModelId, Vec<ElementIndex>>,
}

impl ElementSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolves `selector` against `structure`.
    ///
    /// # Arguments
    ///
    /// * `structure` - The structural data, or `None` when the host has none yet.
    /// * `selector` - What to select.
    /// * `annotations` - Field lookup used by annotation selectors.
    ///
    /// # Return
    ///
    /// The selected elements. An absent or empty structure yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] when a script selector cannot be compiled.
    pub fn from_selector(
        structure: Option<&StructureData>,
        selector: &Selector,
        annotations: &dyn AnnotationLookup,
    ) -> Result<Self, SelectionError> {
        let Some(structure) = structure.filter(|s| !s.is_empty()) else {
            return Ok(Self::empty());
        };

        let set = match selector {
            Selector::Static { selector } => {
                Self::collect(structure, |_, model, _, atom| selector.matches(model, atom))
            }
            Selector::Expression { expressions } => Self::collect(structure, |_, _, index, atom| {
                expressions.iter().any(|e| e.matches(atom, index))
            }),
            Selector::Script { language, text } => {
                let query = ScriptQuery::compile(*language, text)?;
                Self::collect(structure, |_, model, _, atom| query.matches(model, atom))
            }
            Selector::Annotation {
                annotation_id,
                field_name,
                field_values,
            } => Self::collect(structure, |model_id, _, index, _| {
                let location = ElementLocation::new(model_id, index);
                match annotations.field_value(annotation_id, location, field_name) {
                    Some(value) => match field_values {
                        Some(values) => values.iter().any(|v| v == value),
                        None => !value.is_empty(),
                    },
                    None => false,
                }
            }),
            Selector::Bundle { bundle } => {
                let mut elements = BTreeMap::new();
                for entry in &bundle.entries {
                    let Some(model_id) = structure.model_at(entry.model_index) else {
                        continue;
                    };
                    let count = structure.model(model_id).map_or(0, Model::len);
                    let indices: &mut Vec<ElementIndex> = elements.entry(model_id).or_default();
                    indices.extend(entry.elements.iter().copied().filter(|i| *i < count));
                }
                for indices in elements.values_mut() {
                    indices.sort_unstable();
                    indices.dedup();
                }
                elements.retain(|_, indices| !indices.is_empty());
                Self { elements }
            }
        };
        Ok(set)
    }

    fn collect<F>(structure: &StructureData, mut predicate: F) -> Self
    where
        F: FnMut(ModelId, &Model, ElementIndex, &Atom) -> bool,
    {
        let mut elements = BTreeMap::new();
        for (model_id, model) in structure.models() {
            let indices: Vec<ElementIndex> = model
                .atoms()
                .iter()
                .enumerate()
                .filter(|(index, atom)| predicate(model_id, model, *index, *atom))
                .map(|(index, _)| index)
                .collect();
            if !indices.is_empty() {
                elements.insert(model_id, indices);
            }
        }
        Self { elements }
    }

    pub fn has(&self, location: ElementLocation) -> bool {
        self.elements
            .get(&location.model)
            .is_some_and(|indices| indices.binary_search(&location.element).is_ok())
    }

    /// The sorted indices selected in `model`.
    pub fn indices(&self, model: ModelId) -> &[ElementIndex] {
        self.elements.get(&model).map_or(&[], Vec::as_slice)
    }

    pub fn models(&self) -> impl Iterator<Item = (ModelId, &[ElementIndex])> {
        self.elements
            .iter()
            .map(|(model, indices)| (*model, indices.as_slice()))
    }

    /// Total number of selected elements.
    pub fn len(&self) -> usize {
        self.elements.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotations::table::NoAnnotations;
    use crate::core::selection::expression::ComponentExpression;
    use crate::core::selection::selector::{
        BundleEntry, ElementBundle, ScriptLanguage, StaticSelector,
    };

    fn two_model_structure() -> (StructureData, ModelId, ModelId) {
        let mut data = StructureData::new();
        let first = data.add_model();
        let second = data.add_model();
        for (i, chain) in ["A", "A", "B"].iter().enumerate() {
            data.add_atom(first, Atom::new(i as i64 + 1, "C", "CA", "ALA", chain, "1", Some(i as i64 + 1)));
        }
        data.add_atom(second, Atom::new(1, "O", "O", "HOH", "W", "2", None));
        data.add_atom(second, Atom::new(2, "C", "CA", "ALA", "A", "1", Some(1)));
        (data, first, second)
    }

    #[test]
    fn all_selects_every_element_in_increasing_order() {
        let (data, first, second) = two_model_structure();
        let set = ElementSet::from_selector(Some(&data), &Selector::all(), &NoAnnotations).unwrap();
        assert_eq!(set.len(), data.element_count());
        for (_, indices) in set.models() {
            assert!(indices.windows(2).all(|w| w[0] < w[1]));
        }
        assert!(set.has(ElementLocation::new(first, 2)));
        assert!(set.has(ElementLocation::new(second, 1)));
        assert!(!set.has(ElementLocation::new(second, 2)));
    }

    #[test]
    fn missing_or_empty_structure_gives_empty_set() {
        let set = ElementSet::from_selector(None, &Selector::all(), &NoAnnotations).unwrap();
        assert!(set.is_empty());
        let empty = StructureData::new();
        let set = ElementSet::from_selector(Some(&empty), &Selector::all(), &NoAnnotations).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn expressions_are_a_union() {
        let (data, first, second) = two_model_structure();
        let selector = Selector::Expression {
            expressions: vec![
                ComponentExpression {
                    label_asym_id: Some("B".into()),
                    ..Default::default()
                },
                ComponentExpression {
                    label_asym_id: Some("W".into()),
                    ..Default::default()
                },
            ],
        };
        let set = ElementSet::from_selector(Some(&data), &selector, &NoAnnotations).unwrap();
        assert_eq!(set.indices(first), &[2]);
        assert_eq!(set.indices(second), &[0]);
    }

    #[test]
    fn static_selector_skips_models_without_matches() {
        let (data, first, second) = two_model_structure();
        let selector = Selector::Static {
            selector: StaticSelector::Water,
        };
        let set = ElementSet::from_selector(Some(&data), &selector, &NoAnnotations).unwrap();
        assert!(set.indices(first).is_empty());
        assert_eq!(set.indices(second), &[0]);
        assert_eq!(set.models().count(), 1);
    }

    #[test]
    fn bundle_is_sorted_deduplicated_and_bounded() {
        let (data, first, _) = two_model_structure();
        let selector = Selector::Bundle {
            bundle: ElementBundle {
                entries: vec![
                    BundleEntry {
                        model_index: 0,
                        elements: vec![2, 0, 2, 99],
                    },
                    BundleEntry {
                        model_index: 7,
                        elements: vec![0],
                    },
                ],
            },
        };
        let set = ElementSet::from_selector(Some(&data), &selector, &NoAnnotations).unwrap();
        assert_eq!(set.indices(first), &[0, 2]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn script_errors_propagate() {
        let (data, _, _) = two_model_structure();
        let selector = Selector::Script {
            language: ScriptLanguage::Pymol,
            text: "chain".into(),
        };
        let err = ElementSet::from_selector(Some(&data), &selector, &NoAnnotations).unwrap_err();
        assert!(matches!(err, SelectionError::Syntax { .. }));
    }

    #[test]
    fn script_selects_like_expressions() {
        let (data, first, second) = two_model_structure();
        let selector = Selector::Script {
            language: ScriptLanguage::Pymol,
            text: "chain A".into(),
        };
        let set = ElementSet::from_selector(Some(&data), &selector, &NoAnnotations).unwrap();
        assert_eq!(set.indices(first), &[0, 1]);
        assert_eq!(set.indices(second), &[1]);
    }
}
