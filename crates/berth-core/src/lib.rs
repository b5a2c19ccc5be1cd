#![forbid(unsafe_code)]
//! berth-core: descriptors, destinations, manifest model, placeholder
//! resolution, and configuration for the asset placement engine.
//!
//! No I/O lives here. The engine crate (`berth-engine`) performs the single
//! template/manifest write at finalize time; everything in core is in-memory
//! computation over plain values.

pub mod asset;
pub mod config;
pub mod error;
pub mod expr;
pub mod hash;
pub mod manifest;
pub mod placeholder;
pub mod prelude;
pub mod unit;

pub use error::{Error, Result};

/// Schema version stamped into serialized asset manifests.
pub const MANIFEST_VERSION: &str = "1.0.0";
