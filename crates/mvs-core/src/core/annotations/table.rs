use super::spec::AnnotationSchema;
use crate::core::models::ids::ModelId;
use crate::core::models::structure::StructureData;
use crate::core::selection::element_set::ElementLocation;
use crate::core::selection::expression::ComponentExpression;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Annotation data must be a JSON array of row objects: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Annotation row {row} is not a JSON object")]
    NotAnObject { row: usize },

    #[error("Annotation row {row} has an invalid selector: {message}")]
    InvalidSelector { row: usize, message: String },
}

/// Per-element access to annotation field values.
pub trait AnnotationLookup {
    /// The value of `field_name` for the element at `location` in the annotation
    /// `annotation_id`, if the annotation covers that element.
    fn field_value(
        &self,
        annotation_id: &str,
        location: ElementLocation,
        field_name: &str,
    ) -> Option<&str>;
}

/// Lookup used when no annotation data is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnnotations;

impl AnnotationLookup for NoAnnotations {
    fn field_value(&self, _: &str, _: ElementLocation, _: &str) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRow {
    pub selector: ComponentExpression,
    pub fields: BTreeMap<String, String>,
}

/// Rows of one annotation source, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationTable {
    rows: Vec<AnnotationRow>,
}

impl AnnotationTable {
    pub fn new(rows: Vec<AnnotationRow>) -> Self {
        Self { rows }
    }

    pub fn from_json(json: &str, schema: AnnotationSchema) -> Result<Self, AnnotationError> {
        let records: Vec<Value> = serde_json::from_str(json)?;
        Self::from_records(&records, schema)
    }

    /// Splits each record into selector keys (as allowed by `schema`) and
    /// field values. Non-string scalar values are stored in their JSON text
    /// form; `null` values are skipped.
    pub fn from_records(records: &[Value], schema: AnnotationSchema) -> Result<Self, AnnotationError> {
        let selector_keys = schema.selector_fields();
        let mut rows = Vec::with_capacity(records.len());

        for (row, record) in records.iter().enumerate() {
            let Value::Object(object) = record else {
                return Err(AnnotationError::NotAnObject { row });
            };
            let mut selector = Map::new();
            let mut fields = BTreeMap::new();
            for (key, value) in object {
                if value.is_null() {
                    continue;
                }
                if selector_keys.contains(&key.as_str()) {
                    selector.insert(key.clone(), value.clone());
                } else {
                    let text = match value {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    };
                    fields.insert(key.clone(), text);
                }
            }
            let selector = serde_json::from_value(Value::Object(selector)).map_err(|e| {
                AnnotationError::InvalidSelector {
                    row,
                    message: e.to_string(),
                }
            })?;
            rows.push(AnnotationRow { selector, fields });
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[AnnotationRow] {
        &self.rows
    }

    /// Assigns every element of `structure` the last row whose selector
    /// matches it.
    pub fn resolve(self, structure: &StructureData) -> ResolvedAnnotation {
        let mut row_of = BTreeMap::new();
        for (model_id, model) in structure.models() {
            let assignment: Vec<Option<usize>> = model
                .atoms()
                .iter()
                .enumerate()
                .map(|(index, atom)| {
                    self.rows
                        .iter()
                        .rposition(|row| row.selector.matches(atom, index))
                })
                .collect();
            row_of.insert(model_id, assignment);
        }
        ResolvedAnnotation {
            table: self,
            row_of,
        }
    }
}

/// An annotation table bound to one structure.
#[derive(Debug, Clone)]
pub struct ResolvedAnnotation {
    table: AnnotationTable,
    row_of: BTreeMap<ModelId, Vec<Option<usize>>>,
}

impl ResolvedAnnotation {
    pub fn row_at(&self, location: ElementLocation) -> Option<&AnnotationRow> {
        let row = (*self.row_of.get(&location.model)?.get(location.element)?)?;
        self.table.rows.get(row)
    }

    pub fn field_value(&self, location: ElementLocation, field_name: &str) -> Option<&str> {
        self.row_at(location)?
            .fields
            .get(field_name)
            .map(String::as_str)
    }
}

/// Resolved annotations keyed by annotation id.
#[derive(Debug, Default)]
pub struct AnnotationRegistry {
    annotations: HashMap<String, ResolvedAnnotation>,
}

impl AnnotationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, annotation_id: impl Into<String>, annotation: ResolvedAnnotation) {
        self.annotations.insert(annotation_id.into(), annotation);
    }

    pub fn get(&self, annotation_id: &str) -> Option<&ResolvedAnnotation> {
        self.annotations.get(annotation_id)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

impl AnnotationLookup for AnnotationRegistry {
    fn field_value(
        &self,
        annotation_id: &str,
        location: ElementLocation,
        field_name: &str,
    ) -> Option<&str> {
        self.get(annotation_id)?.field_value(location, field_name)
    }
}
