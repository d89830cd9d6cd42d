use crate::core::models::atom::Atom;
use crate::core::models::ids::ElementIndex;
use serde::{Deserialize, Serialize};

/// A conjunction of `atom_site` field constraints.
///
/// Every present field must match; absent fields match anything. `beg_*` and
/// `end_*` bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentExpression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_asym_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_asym_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_seq_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_seq_id: Option<i64>,
    #[serde(
        rename = "pdbx_PDB_ins_code",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pdbx_pdb_ins_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beg_label_seq_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_label_seq_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beg_auth_seq_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_auth_seq_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_atom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_atom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atom_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atom_index: Option<usize>,
}

fn field_matches<T: PartialEq + ?Sized>(expected: Option<&T>, actual: &T) -> bool {
    expected.is_none_or(|expected| expected == actual)
}

fn seq_matches(
    exact: Option<i64>,
    beg: Option<i64>,
    end: Option<i64>,
    actual: Option<i64>,
) -> bool {
    if exact.is_none() && beg.is_none() && end.is_none() {
        return true;
    }
    let Some(seq) = actual else {
        return false;
    };
    exact.is_none_or(|v| v == seq) && beg.is_none_or(|b| seq >= b) && end.is_none_or(|e| seq <= e)
}

impl ComponentExpression {
    pub fn matches(&self, atom: &Atom, index: ElementIndex) -> bool {
        field_matches(self.label_entity_id.as_deref(), atom.label_entity_id.as_str())
            && field_matches(self.label_asym_id.as_deref(), atom.label_asym_id.as_str())
            && field_matches(self.auth_asym_id.as_deref(), atom.auth_asym_id.as_str())
            && seq_matches(
                self.label_seq_id,
                self.beg_label_seq_id,
                self.end_label_seq_id,
                atom.label_seq_id,
            )
            && seq_matches(
                self.auth_seq_id,
                self.beg_auth_seq_id,
                self.end_auth_seq_id,
                atom.auth_seq_id,
            )
            && field_matches(
                self.pdbx_pdb_ins_code.as_deref(),
                atom.pdbx_pdb_ins_code.as_deref().unwrap_or(""),
            )
            && field_matches(self.label_atom_id.as_deref(), atom.label_atom_id.as_str())
            && field_matches(self.auth_atom_id.as_deref(), atom.auth_atom_id.as_str())
            && self
                .type_symbol
                .as_deref()
                .is_none_or(|symbol| symbol.eq_ignore_ascii_case(&atom.type_symbol))
            && field_matches(self.atom_id.as_ref(), &atom.id)
            && field_matches(self.atom_index.as_ref(), &index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom() -> Atom {
        Atom::new(42, "C", "CA", "LYS", "A", "1", Some(15)).with_auth_ids("X", Some(115))
    }

    #[test]
    fn empty_expression_matches_everything() {
        assert!(ComponentExpression::default().matches(&atom(), 0));
    }

    #[test]
    fn all_present_fields_must_match() {
        let expression = ComponentExpression {
            label_asym_id: Some("A".into()),
            auth_seq_id: Some(115),
            ..Default::default()
        };
        assert!(expression.matches(&atom(), 0));

        let wrong_chain = ComponentExpression {
            auth_asym_id: Some("A".into()),
            ..expression
        };
        assert!(!wrong_chain.matches(&atom(), 0));
    }

    #[test]
    fn ranges_are_inclusive() {
        let range = ComponentExpression {
            beg_label_seq_id: Some(10),
            end_label_seq_id: Some(15),
            ..Default::default()
        };
        assert!(range.matches(&atom(), 0));
        let below = ComponentExpression {
            beg_label_seq_id: Some(16),
            ..Default::default()
        };
        assert!(!below.matches(&atom(), 0));
    }

    #[test]
    fn seq_constraint_excludes_atoms_without_seq_id() {
        let ligand = Atom::new(1, "C", "C1", "REA", "B", "2", None);
        let expression = ComponentExpression {
            end_auth_seq_id: Some(100),
            ..Default::default()
        };
        assert!(!expression.matches(&ligand, 0));
    }

    #[test]
    fn atom_index_and_id_refer_to_different_things() {
        let by_index = ComponentExpression {
            atom_index: Some(3),
            ..Default::default()
        };
        assert!(by_index.matches(&atom(), 3));
        assert!(!by_index.matches(&atom(), 42));
        let by_id = ComponentExpression {
            atom_id: Some(42),
            ..Default::default()
        };
        assert!(by_id.matches(&atom(), 0));
    }

    #[test]
    fn ins_code_uses_mmcif_field_name() {
        let expression: ComponentExpression =
            serde_json::from_str(r#"{ "pdbx_PDB_ins_code": "" }"#).unwrap();
        assert_eq!(expression.pdbx_pdb_ins_code.as_deref(), Some(""));
        assert!(expression.matches(&atom(), 0));
        assert!(serde_json::from_str::<ComponentExpression>(r#"{ "chain": "A" }"#).is_err());
    }
}
