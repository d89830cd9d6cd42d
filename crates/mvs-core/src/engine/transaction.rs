use super::host::{CellProperties, CellRef, HostError, Mutation, SceneHost, SceneTransform};

/// Mutations recorded against a host and applied in one commit.
///
/// Nothing reaches the host until [`Batch::commit`]; dropping a batch discards
/// everything it recorded. Holding the batch borrows the host mutably, so two
/// runs can never interleave on the same host.
pub struct Batch<'h, H: SceneHost + ?Sized> {
    host: &'h mut H,
    anchor: CellRef,
    mutations: Vec<Mutation>,
}

impl<'h, H: SceneHost + ?Sized> Batch<'h, H> {
    pub fn new(host: &'h mut H, anchor: CellRef) -> Self {
        Self {
            host,
            anchor,
            mutations: Vec::new(),
        }
    }

    pub fn anchor(&self) -> CellRef {
        self.anchor
    }

    /// Records a new cell under `parent` and returns its reference.
    pub fn add_child(&mut self, parent: CellRef, transform: SceneTransform) -> CellRef {
        let cell = self.host.allocate_ref();
        self.mutations.push(Mutation::AddChild {
            parent,
            cell,
            transform,
        });
        cell
    }

    pub fn remove_children(&mut self, parent: CellRef) {
        self.mutations.push(Mutation::RemoveChildren { parent });
    }

    pub fn set_properties(&mut self, cell: CellRef, properties: CellProperties) {
        self.mutations
            .push(Mutation::SetProperties { cell, properties });
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Hands every recorded mutation to the host at once.
    ///
    /// # Return
    ///
    /// The number of mutations applied.
    pub fn commit(self) -> Result<usize, HostError> {
        let count = self.mutations.len();
        self.host.apply(self.mutations)?;
        Ok(count)
    }
}
