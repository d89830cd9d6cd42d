use crate::core::tree::params::AnnotationParams;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

const ID_PREFIX: &str = "ann-";
const ID_HEX_DIGITS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationFormat {
    Cif,
    Bcif,
    Json,
}

/// How annotation rows address the atoms they describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationSchema {
    WholeStructure,
    Entity,
    Chain,
    AuthChain,
    Residue,
    AuthResidue,
    ResidueRange,
    AuthResidueRange,
    Atom,
    AuthAtom,
    AllAtomic,
}

impl AnnotationSchema {
    /// Row keys that act as selectors under this schema. All other keys are
    /// annotation fields.
    pub fn selector_fields(self) -> &'static [&'static str] {
        match self {
            Self::WholeStructure => &[],
            Self::Entity => &["label_entity_id"],
            Self::Chain => &["label_entity_id", "label_asym_id"],
            Self::AuthChain => &["auth_asym_id"],
            Self::Residue => &["label_entity_id", "label_asym_id", "label_seq_id"],
            Self::AuthResidue => &["auth_asym_id", "auth_seq_id", "pdbx_PDB_ins_code"],
            Self::ResidueRange => &[
                "label_entity_id",
                "label_asym_id",
                "beg_label_seq_id",
                "end_label_seq_id",
            ],
            Self::AuthResidueRange => &["auth_asym_id", "beg_auth_seq_id", "end_auth_seq_id"],
            Self::Atom => &[
                "label_entity_id",
                "label_asym_id",
                "label_seq_id",
                "label_atom_id",
                "type_symbol",
                "atom_id",
                "atom_index",
            ],
            Self::AuthAtom => &[
                "auth_asym_id",
                "auth_seq_id",
                "pdbx_PDB_ins_code",
                "auth_atom_id",
                "type_symbol",
                "atom_id",
                "atom_index",
            ],
            Self::AllAtomic => &[
                "label_entity_id",
                "label_asym_id",
                "auth_asym_id",
                "label_seq_id",
                "auth_seq_id",
                "pdbx_PDB_ins_code",
                "beg_label_seq_id",
                "end_label_seq_id",
                "beg_auth_seq_id",
                "end_auth_seq_id",
                "label_atom_id",
                "auth_atom_id",
                "type_symbol",
                "atom_id",
                "atom_index",
            ],
        }
    }
}

/// Where annotation rows come from: an external file, or the structure's own
/// CIF data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum AnnotationSource {
    Url { url: String, format: AnnotationFormat },
    SourceCif,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CifBlock {
    Index(usize),
    Header(String),
}

/// Identity of an annotation source, independent of which field is read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationSpec {
    pub source: AnnotationSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<AnnotationSchema>,
    pub cif_block: CifBlock,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cif_category: Option<String>,
}

impl AnnotationSpec {
    pub fn from_params(params: &AnnotationParams) -> Self {
        let cif_block = match &params.block_header {
            Some(header) => CifBlock::Header(header.clone()),
            None => CifBlock::Index(params.block_index.unwrap_or(0)),
        };
        Self {
            source: params.source.clone(),
            schema: Some(params.schema),
            cif_block,
            cif_category: params.category_name.clone(),
        }
    }

    /// Sorted-key JSON with absent and `null` fields removed.
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        let value = serde_json::to_value(self)?;
        serde_json::to_string(&canonicalize(value))
    }

    /// `ann-` followed by the first 16 hex digits of the SHA-256 of the
    /// canonical JSON.
    pub fn content_id(&self) -> Result<String, serde_json::Error> {
        Ok(content_id_of(&self.canonical_json()?))
    }
}

pub fn content_id_of(canonical: &str) -> String {
    let digest = Sha256::digest(canonical.as_bytes());
    let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
    format!("{ID_PREFIX}{}", &hex[..ID_HEX_DIGITS])
}

/// Recursively sorts object keys and drops `null` members.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// A deduplicated annotation spec together with its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredAnnotation {
    pub id: String,
    #[serde(flatten)]
    pub spec: AnnotationSpec,
}
