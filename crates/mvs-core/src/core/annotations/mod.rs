//! Annotation sources and the per-element data read from them.
//!
//! [`spec`] gives every distinct annotation source a stable, content-derived id
//! so that many nodes pointing at the same file share one entry. [`table`] holds
//! the rows of an annotation once a host has fetched it, and answers
//! per-element field lookups for selectors and color themes.

pub mod spec;
pub mod table;
