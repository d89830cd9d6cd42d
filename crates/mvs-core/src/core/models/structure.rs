use super::atom::Atom;
use super::entity::EntityType;
use super::ids::{ElementIndex, ModelId};
use crate::core::utils::identifiers;
use slotmap::SlotMap;
use std::collections::HashMap;

/// A single model: an ordered list of atoms plus entity annotations.
#[derive(Debug, Clone, Default)]
pub struct Model {
    atoms: Vec<Atom>,
    entity_types: HashMap<String, EntityType>,
}

impl Model {
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, index: ElementIndex) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Classifies the entity an atom belongs to.
    ///
    /// Declared entity types win. Otherwise the component id decides: water
    /// names are water, standard residues are polymer, anything else is a
    /// non-polymer.
    pub fn entity_type_of(&self, atom: &Atom) -> EntityType {
        if let Some(entity_type) = self.entity_types.get(&atom.label_entity_id) {
            return *entity_type;
        }
        let comp_id = atom.label_comp_id.as_str();
        if identifiers::is_water(comp_id) {
            EntityType::Water
        } else if let Some(kind) = identifiers::standard_polymer_kind(comp_id) {
            EntityType::Polymer(kind)
        } else {
            EntityType::NonPolymer
        }
    }
}

/// Decoded structural data for one `structure` node.
#[derive(Debug, Clone, Default)]
pub struct StructureData {
    models: SlotMap<ModelId, Model>,
    order: Vec<ModelId>,
}

impl StructureData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty model and returns its id.
    pub fn add_model(&mut self) -> ModelId {
        let id = self.models.insert(Model::default());
        self.order.push(id);
        id
    }

    /// Appends an atom to a model.
    ///
    /// # Return
    ///
    /// Returns the atom's element index, or `None` if the model does not exist.
    pub fn add_atom(&mut self, model: ModelId, atom: Atom) -> Option<ElementIndex> {
        let model = self.models.get_mut(model)?;
        model.atoms.push(atom);
        Some(model.atoms.len() - 1)
    }

    /// Records the declared type of an entity within a model.
    pub fn set_entity_type(&mut self, model: ModelId, entity_id: &str, entity_type: EntityType) {
        if let Some(model) = self.models.get_mut(model) {
            model.entity_types.insert(entity_id.to_string(), entity_type);
        }
    }

    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id)
    }

    /// Iterates over models in insertion order.
    pub fn models(&self) -> impl Iterator<Item = (ModelId, &Model)> {
        self.order
            .iter()
            .filter_map(|id| self.models.get(*id).map(|model| (*id, model)))
    }

    /// The `index`-th model in insertion order.
    pub fn model_at(&self, index: usize) -> Option<ModelId> {
        self.order.get(index).copied()
    }

    /// Total number of atoms across all models.
    pub fn element_count(&self) -> usize {
        self.models().map(|(_, model)| model.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::entity::PolymerKind;

    #[test]
    fn atoms_get_sequential_indices_per_model() {
        let mut data = StructureData::new();
        let first = data.add_model();
        let second = data.add_model();
        assert_eq!(data.add_atom(first, Atom::new(1, "C", "CA", "ALA", "A", "1", Some(1))), Some(0));
        assert_eq!(data.add_atom(first, Atom::new(2, "N", "N", "ALA", "A", "1", Some(1))), Some(1));
        assert_eq!(data.add_atom(second, Atom::new(1, "O", "O", "HOH", "B", "2", None)), Some(0));
        assert_eq!(data.element_count(), 3);
        assert_eq!(data.model_at(1), Some(second));
        assert_eq!(data.models().map(|(id, _)| id).collect::<Vec<_>>(), vec![first, second]);
    }

    #[test]
    fn entity_type_falls_back_on_component_id() {
        let model = Model::default();
        let protein = Atom::new(1, "C", "CA", "GLY", "A", "1", Some(1));
        let water = Atom::new(2, "O", "O", "HOH", "W", "3", None);
        let ligand = Atom::new(3, "C", "C1", "REA", "B", "2", None);
        assert_eq!(model.entity_type_of(&protein), EntityType::Polymer(PolymerKind::Protein));
        assert_eq!(model.entity_type_of(&water), EntityType::Water);
        assert_eq!(model.entity_type_of(&ligand), EntityType::NonPolymer);
    }

    #[test]
    fn declared_entity_type_wins() {
        let mut data = StructureData::new();
        let model = data.add_model();
        data.set_entity_type(model, "2", EntityType::Branched);
        let sugar = Atom::new(1, "C", "C1", "NAG", "C", "2", None);
        data.add_atom(model, sugar.clone());
        assert_eq!(data.model(model).unwrap().entity_type_of(&sugar), EntityType::Branched);
    }
}
