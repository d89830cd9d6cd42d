//! # Engine Module
//!
//! The interpreter that turns an MVS tree into scene mutations.
//!
//! ## Overview
//!
//! One interpretation run prepares a fresh [`context::LoadingContext`]
//! (annotation ids and nearest representations keyed by node), walks the tree
//! once, dispatches a kind-specific action per node, and records every scene
//! mutation in a [`transaction::Batch`]. The batch is handed to the
//! [`host::SceneHost`] exactly once at the end of the walk, so a failed run
//! leaves the host untouched.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Load options and their builder
//! - **Host Contract** ([`host`]) - Cell references, scene transforms and the host trait
//! - **Batching** ([`transaction`]) - Recorded mutations committed atomically
//! - **Reference Host** ([`scene`]) - An in-memory scene graph implementing the contract
//! - **Color Themes** ([`color_theme`]) - Theme composition and per-element evaluation
//! - **Compilation** ([`compiler`]) - The single tree walk and its diagnostics
//! - **Progress Monitoring** ([`progress`]) - Phase and per-node progress events
//! - **Error Handling** ([`error`]) - Engine error types

pub(crate) mod actions;
pub(crate) mod annotations;
pub mod color_theme;
pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub(crate) mod nearest_repr;
pub mod progress;
pub mod scene;
pub mod transaction;
