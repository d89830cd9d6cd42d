//! # MolViewSpec Core Library
//!
//! An interpreter for MolViewSpec (MVS) scene trees: declarative, serializable
//! documents that describe what a molecular scene should contain (downloads,
//! parsed structures, components, representations, colors, labels, tooltips,
//! camera settings) without saying how to build it.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models and pure functions: the
//!   arena-backed MVS [`core::tree::Tree`], structural data used to resolve
//!   selections, annotation specs with content-derived ids, colors, and the
//!   geometric transform builder.
//!
//! - **[`engine`]: The Interpreter.** Per-run state (`LoadingContext`), the
//!   exhaustive action dispatch over node kinds, the single-walk compiler, color
//!   theme composition, and the narrow scene-host contract that receives one
//!   atomic batch of mutations per run.
//!
//! - **[`workflows`]: The Public API.** End-to-end entry points that validate a
//!   tree, prepare the loading context, compile, commit, and report the scene
//!   settings the host should apply afterwards.

pub mod core;
pub mod engine;
pub mod workflows;
