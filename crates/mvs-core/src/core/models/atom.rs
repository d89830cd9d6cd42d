use nalgebra::Point3;

/// One row of an mmCIF `atom_site` category.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub id: i64,
    pub type_symbol: String,
    pub label_atom_id: String,
    pub auth_atom_id: String,
    pub label_comp_id: String,
    pub label_asym_id: String,
    pub auth_asym_id: String,
    pub label_entity_id: String,
    /// Absent for non-polymer entities.
    pub label_seq_id: Option<i64>,
    pub auth_seq_id: Option<i64>,
    pub pdbx_pdb_ins_code: Option<String>,
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates an atom whose label and auth identifiers coincide.
    pub fn new(
        id: i64,
        type_symbol: &str,
        atom_name: &str,
        comp_id: &str,
        chain_id: &str,
        entity_id: &str,
        seq_id: Option<i64>,
    ) -> Self {
        Self {
            id,
            type_symbol: type_symbol.to_string(),
            label_atom_id: atom_name.to_string(),
            auth_atom_id: atom_name.to_string(),
            label_comp_id: comp_id.to_string(),
            label_asym_id: chain_id.to_string(),
            auth_asym_id: chain_id.to_string(),
            label_entity_id: entity_id.to_string(),
            label_seq_id: seq_id,
            auth_seq_id: seq_id,
            pdbx_pdb_ins_code: None,
            position: Point3::origin(),
        }
    }

    pub fn with_auth_ids(mut self, auth_asym_id: &str, auth_seq_id: Option<i64>) -> Self {
        self.auth_asym_id = auth_asym_id.to_string();
        self.auth_seq_id = auth_seq_id;
        self
    }

    pub fn with_position(mut self, position: Point3<f64>) -> Self {
        self.position = position;
        self
    }
}
