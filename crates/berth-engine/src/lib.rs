#![forbid(unsafe_code)]
//! berth-engine: binds one deployable unit, accumulates asset registrations,
//! and finalizes the manifest.
//!
//! Single-threaded and synchronous by contract: one unit, one linear
//! registration sequence, one finalize.

pub mod engine;
pub mod session;

pub use engine::{DockerImageAssetLocation, Engine, FileAssetLocation};
pub use session::{ArtifactRecord, SynthSession};
