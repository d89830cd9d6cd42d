use super::host::{CellProperties, CellRef, HostError, Mutation, SceneHost, SceneTransform};
use crate::core::utils::geometry::compose_transforms;
use nalgebra::Matrix4;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub parent: Option<CellRef>,
    pub transform: Option<SceneTransform>,
    pub children: Vec<CellRef>,
    pub properties: CellProperties,
}

/// One cell in a flattened, depth-first view of the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneEntry<'a> {
    pub cell: CellRef,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<&'a SceneTransform>,
    #[serde(skip_serializing_if = "CellProperties::is_empty")]
    pub properties: &'a CellProperties,
}

/// An in-memory scene graph implementing [`SceneHost`].
///
/// Batches are applied to a copy of the cell table which replaces the live
/// table only after every mutation succeeded.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    cells: BTreeMap<CellRef, Cell>,
    root: CellRef,
    next_ref: u64,
    commits: usize,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = CellRef(0);
        let mut cells = BTreeMap::new();
        cells.insert(root, Cell::default());
        Self {
            cells,
            root,
            next_ref: 1,
            commits: 0,
        }
    }

    pub fn cell(&self, cell: CellRef) -> Option<&Cell> {
        self.cells.get(&cell)
    }

    pub fn children(&self, cell: CellRef) -> &[CellRef] {
        self.cells.get(&cell).map_or(&[], |c| c.children.as_slice())
    }

    pub fn transform(&self, cell: CellRef) -> Option<&SceneTransform> {
        self.cells.get(&cell)?.transform.as_ref()
    }

    /// Number of cells, the root included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of batches applied successfully.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    /// Cells whose transform satisfies `predicate`, in depth-first order.
    pub fn find<P>(&self, predicate: P) -> Vec<CellRef>
    where
        P: Fn(&SceneTransform) -> bool,
    {
        self.entries()
            .into_iter()
            .filter(|entry| entry.transform.is_some_and(&predicate))
            .map(|entry| entry.cell)
            .collect()
    }

    /// The combined conformation transform that applies to content under
    /// `cell`, outermost transform first.
    pub fn conformation_transform(&self, cell: CellRef) -> Matrix4<f64> {
        let mut chain = Vec::new();
        let mut current = Some(cell);
        while let Some(id) = current {
            let Some(entry) = self.cells.get(&id) else {
                break;
            };
            if let Some(SceneTransform::TransformConformation { matrix }) = &entry.transform {
                chain.push(*matrix);
            }
            current = entry.parent;
        }
        chain.reverse();
        compose_transforms(&chain)
    }

    /// Flattens the scene depth-first, children in insertion order.
    pub fn entries(&self) -> Vec<SceneEntry<'_>> {
        let mut entries = Vec::with_capacity(self.cells.len());
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(cell) = self.cells.get(&id) else {
                continue;
            };
            entries.push(SceneEntry {
                cell: id,
                depth,
                transform: cell.transform.as_ref(),
                properties: &cell.properties,
            });
            stack.extend(cell.children.iter().rev().map(|child| (*child, depth + 1)));
        }
        entries
    }
}

fn apply_mutation(cells: &mut BTreeMap<CellRef, Cell>, mutation: Mutation) -> Result<(), HostError> {
    match mutation {
        Mutation::AddChild {
            parent,
            cell,
            transform,
        } => {
            if cells.contains_key(&cell) {
                return Err(HostError::DuplicateCell(cell));
            }
            let parent_cell = cells.get_mut(&parent).ok_or(HostError::UnknownCell(parent))?;
            parent_cell.children.push(cell);
            cells.insert(
                cell,
                Cell {
                    parent: Some(parent),
                    transform: Some(transform),
                    ..Cell::default()
                },
            );
        }
        Mutation::RemoveChildren { parent } => {
            let parent_cell = cells.get_mut(&parent).ok_or(HostError::UnknownCell(parent))?;
            let mut doomed = std::mem::take(&mut parent_cell.children);
            while let Some(id) = doomed.pop() {
                if let Some(removed) = cells.remove(&id) {
                    doomed.extend(removed.children);
                }
            }
        }
        Mutation::SetProperties { cell, properties } => {
            cells.get_mut(&cell).ok_or(HostError::UnknownCell(cell))?.properties = properties;
        }
    }
    Ok(())
}

impl SceneHost for SceneGraph {
    fn root(&self) -> CellRef {
        self.root
    }

    fn allocate_ref(&mut self) -> CellRef {
        let cell = CellRef(self.next_ref);
        self.next_ref += 1;
        cell
    }

    fn apply(&mut self, mutations: Vec<Mutation>) -> Result<(), HostError> {
        let mut staged = self.cells.clone();
        for mutation in mutations {
            apply_mutation(&mut staged, mutation)?;
        }
        self.cells = staged;
        self.commits += 1;
        Ok(())
    }
}
