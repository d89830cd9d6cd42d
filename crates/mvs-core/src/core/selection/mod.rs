//! Selectors and the element sets they resolve to.
//!
//! A [`selector::Selector`] says *which* atoms a component, color layer or
//! tooltip applies to; an [`element_set::ElementSet`] is the per-model sorted
//! list of matching element indices for one concrete [`StructureData`].
//!
//! [`StructureData`]: crate::core::models::structure::StructureData

pub mod element_set;
pub mod error;
pub mod expression;
pub mod script;
pub mod selector;
