#![warn(clippy::indexing_slicing, clippy::unwrap_used, clippy::dbg_macro, clippy::undocumented_unsafe_blocks)]
//! This crate loads the configuration of the campusgate application from its backends.

/// re-export campusgate_model
pub mod model;
/// Configuration backends and services traits
pub mod service;

pub use model::*;
