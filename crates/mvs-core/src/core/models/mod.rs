//! Structural data that selections and color themes are resolved against.
//!
//! Decoding of mmCIF or PDB files is a host concern. This module holds the
//! already-decoded result: models of atoms carrying their `atom_site`
//! identifiers, plus the entity classification used by static selectors.

pub mod atom;
pub mod entity;
pub mod ids;
pub mod structure;
