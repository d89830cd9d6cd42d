//! # Workflows Module
//!
//! High-level entry points that take an MVS tree all the way into a scene host.
//!
//! ## Overview
//!
//! A workflow owns one interpretation run: it checks the tree against the
//! parent-kind rules, prepares a fresh loading context, compiles the tree into
//! a single batch, commits it, and reports what the host should do with the
//! canvas and camera afterwards. Nothing from a run survives it except the
//! returned outcome and the committed scene content.
//!
//! ## Architecture
//!
//! - **Load Workflow** ([`load`]) - Validation, context preparation, compilation
//!   and commit, followed by the scene settings for the host.

pub mod load;
