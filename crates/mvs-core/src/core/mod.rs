//! # Core Module
//!
//! Stateless building blocks shared by the interpreter and by scene hosts.
//!
//! - **Scene trees** ([`tree`]) - Arena-backed MVS trees, typed node parameters,
//!   JSON documents, depth-first traversal and structural validation
//! - **Structural data** ([`models`]) - Models and atoms that selections resolve against
//! - **Selections** ([`selection`]) - Selectors, component expressions, the script
//!   subset and sorted per-model element sets
//! - **Annotations** ([`annotations`]) - Deduplicated annotation specs and
//!   per-element annotation field lookup
//! - **Colors** ([`color`]) - Hex and named color decoding
//! - **Utilities** ([`utils`]) - Geometric transforms and fixed vocabularies
//!
//! Nothing in this module keeps state between calls; every function is a pure
//! transformation of its inputs.

pub mod annotations;
pub mod color;
pub mod models;
pub mod selection;
pub mod tree;
pub mod utils;
