//! MVS scene trees.
//!
//! A tree is an arena of nodes keyed by [`ids::NodeId`]. Every node carries typed
//! [`params::NodeParams`] whose variant determines its kind, an ordered list of
//! children and a back-link to its parent. Trees are built either programmatically
//! through [`node::Tree::add_child`] or decoded from an MVS JSON document through
//! [`io`], and are never mutated once handed to the interpreter.

pub mod ids;
pub mod io;
pub mod node;
pub mod params;
pub mod traverse;
pub mod validation;
