use crate::core::models::entity::PolymerKind;
use phf::{Set, phf_set};

static WATER_COMP_IDS: Set<&'static str> = phf_set! {
    "HOH", "WAT", "DOD", "H2O", "SOL", "TIP", "TIP3", "SPC",
};

static ION_COMP_IDS: Set<&'static str> = phf_set! {
    "NA", "K", "LI", "RB", "CS", "MG", "CA", "SR", "BA", "ZN", "CU", "CU1", "FE", "FE2",
    "MN", "MN3", "CO", "NI", "CD", "HG", "PB", "PT", "AU", "AG", "AL", "GA", "IN",
    "CL", "BR", "IOD", "F", "SO4", "PO4", "NO3", "NH4", "OH", "CO3", "YB", "SM", "EU",
    "GD", "TB", "LA", "CE", "PR", "ND", "IR", "OS", "RU", "RH", "PD", "W", "MO", "V", "CR",
};

static AMINO_ACID_COMP_IDS: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    "SEC", "PYL", "MSE", "HID", "HIE", "HIP", "HSD", "HSE", "HSP", "CYX", "ASH", "GLH", "LYN",
};

static NUCLEOTIDE_COMP_IDS: Set<&'static str> = phf_set! {
    "A", "C", "G", "U", "I", "T", "N",
    "DA", "DC", "DG", "DT", "DU", "DI", "DN",
};

pub fn is_water(comp_id: &str) -> bool {
    WATER_COMP_IDS.contains(comp_id)
}

pub fn is_ion(comp_id: &str) -> bool {
    ION_COMP_IDS.contains(comp_id)
}

/// The polymer kind of a standard residue, if `comp_id` is one.
pub fn standard_polymer_kind(comp_id: &str) -> Option<PolymerKind> {
    if AMINO_ACID_COMP_IDS.contains(comp_id) {
        Some(PolymerKind::Protein)
    } else if NUCLEOTIDE_COMP_IDS.contains(comp_id) {
        Some(PolymerKind::Nucleic)
    } else {
        None
    }
}
