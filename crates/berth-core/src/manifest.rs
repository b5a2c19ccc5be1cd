//! The asset manifest: every artifact's source plus its destinations,
//! serialized once at finalize for the external publishing tool.
//!
//! Both top-level maps and the per-artifact destination maps preserve
//! insertion order, so the serialized document is stable across runs with the
//! same registration sequence.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::asset::{DockerImageAssetSource, FileAssetPackaging, FileAssetSource};
use crate::error::Result;
use crate::MANIFEST_VERSION;

/// One (region, bucket, role) placement of a file artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDestination {
    pub bucket_name: String,
    pub object_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assume_role_arn: Option<String>,
}

/// One (region, repository, role) placement of an image artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDestination {
    pub repository_name: String,
    pub image_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assume_role_arn: Option<String>,
}

/// Source half of a file manifest entry, decoupled from its destinations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileManifestSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging: Option<FileAssetPackaging>,
}

impl From<&FileAssetSource> for FileManifestSource {
    fn from(asset: &FileAssetSource) -> Self {
        Self {
            path: asset.file_name.clone(),
            executable: asset.executable.clone(),
            packaging: asset.packaging,
        }
    }
}

/// Source half of an image manifest entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageManifestSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_build_args: Option<std::collections::BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_build_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_file: Option<String>,
}

impl From<&DockerImageAssetSource> for ImageManifestSource {
    fn from(asset: &DockerImageAssetSource) -> Self {
        Self {
            directory: asset.directory_name.clone(),
            executable: asset.executable.clone(),
            docker_build_args: asset.docker_build_args.clone(),
            docker_build_target: asset.docker_build_target.clone(),
            docker_file: asset.docker_file.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAssetEntry {
    pub source: FileManifestSource,
    pub destinations: IndexMap<String, FileDestination>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerImageAssetEntry {
    pub source: ImageManifestSource,
    pub destinations: IndexMap<String, ImageDestination>,
}

/// The full manifest document. Created empty at bind time, appended to on
/// every registration (last registration for a hash wins), immutable once
/// serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetManifest {
    pub version: String,
    pub files: IndexMap<String, FileAssetEntry>,
    pub docker_images: IndexMap<String, DockerImageAssetEntry>,
}

impl AssetManifest {
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            files: IndexMap::new(),
            docker_images: IndexMap::new(),
        }
    }

    /// Stable pretty-printed JSON, key order as constructed.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::new()
    }
}
