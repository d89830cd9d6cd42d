use slotmap::new_key_type;

new_key_type! {
    pub struct ModelId;
}

/// Position of an atom inside its model.
pub type ElementIndex = usize;
