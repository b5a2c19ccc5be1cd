//! Convenient re-exports for downstream crates.

pub use crate::asset::{DockerImageAssetSource, FileAssetPackaging, FileAssetSource};
pub use crate::config::{EngineConfig, EngineProps, ImageTagSuffixType};
pub use crate::error::{Error, Result};
pub use crate::expr::Expr;
pub use crate::manifest::{
    AssetManifest, DockerImageAssetEntry, FileAssetEntry, FileDestination, ImageDestination,
};
pub use crate::unit::{DeployUnit, UnitEnv};
