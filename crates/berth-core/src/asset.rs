//! Artifact descriptors handed to the engine by the compiler front-end.
//!
//! Descriptors are validated at registration time; a malformed descriptor is
//! a configuration error and never reaches the manifest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a file artifact is packaged before upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileAssetPackaging {
    /// Upload the file as-is.
    #[serde(rename = "file")]
    File,
    /// Zip the directory and upload the archive (object key gains `.zip`).
    #[serde(rename = "zip")]
    ZipDirectory,
}

/// A file artifact: either a source path or a command producing the file at
/// publish time, identified by a content-derived hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAssetSource {
    /// Content-derived identifier; manifest key and default object key.
    pub source_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging: Option<FileAssetPackaging>,
}

impl FileAssetSource {
    /// Descriptor for an on-disk file or directory.
    pub fn from_file(
        source_hash: impl Into<String>,
        file_name: impl Into<String>,
        packaging: FileAssetPackaging,
    ) -> Self {
        Self {
            source_hash: source_hash.into(),
            file_name: Some(file_name.into()),
            executable: None,
            packaging: Some(packaging),
        }
    }

    /// Descriptor for a file produced by a command at publish time.
    pub fn from_executable(source_hash: impl Into<String>, executable: Vec<String>) -> Self {
        Self {
            source_hash: source_hash.into(),
            file_name: None,
            executable: Some(executable),
            packaging: None,
        }
    }

    /// Exactly one of `file_name`/`executable` must be set; `packaging` is
    /// required with `file_name` and invalid without it.
    pub fn validate(&self) -> Result<()> {
        match (&self.file_name, &self.executable) {
            (Some(_), Some(_)) => Err(Error::Config(format!(
                "file asset '{}': fileName and executable are mutually exclusive",
                self.source_hash
            ))),
            (None, None) => Err(Error::Config(format!(
                "file asset '{}': exactly one of fileName or executable is required",
                self.source_hash
            ))),
            (Some(_), None) if self.packaging.is_none() => Err(Error::Config(format!(
                "file asset '{}': packaging is required with fileName",
                self.source_hash
            ))),
            (None, Some(_)) if self.packaging.is_some() => Err(Error::Config(format!(
                "file asset '{}': packaging is only valid with fileName",
                self.source_hash
            ))),
            _ => Ok(()),
        }
    }
}

/// A container image artifact: either a build directory or a command
/// producing the image at publish time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerImageAssetSource {
    /// Content-derived identifier; manifest key and default image tag.
    pub source_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_build_args: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_build_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_file: Option<String>,
}

impl DockerImageAssetSource {
    /// Descriptor for an image built from a directory.
    pub fn from_directory(source_hash: impl Into<String>, directory_name: impl Into<String>) -> Self {
        Self {
            source_hash: source_hash.into(),
            directory_name: Some(directory_name.into()),
            ..Default::default()
        }
    }

    /// Exactly one of `directory_name`/`executable`; the docker build options
    /// are valid only in combination with `directory_name`.
    pub fn validate(&self) -> Result<()> {
        match (&self.directory_name, &self.executable) {
            (Some(_), Some(_)) => {
                return Err(Error::Config(format!(
                    "image asset '{}': directoryName and executable are mutually exclusive",
                    self.source_hash
                )))
            }
            (None, None) => {
                return Err(Error::Config(format!(
                    "image asset '{}': exactly one of directoryName or executable is required",
                    self.source_hash
                )))
            }
            _ => {}
        }
        if self.directory_name.is_none() {
            for (set, field) in [
                (self.docker_build_args.is_some(), "dockerBuildArgs"),
                (self.docker_build_target.is_some(), "dockerBuildTarget"),
                (self.docker_file.is_some(), "dockerFile"),
            ] {
                if set {
                    return Err(Error::Config(format!(
                        "image asset '{}': {} is only valid with directoryName",
                        self.source_hash, field
                    )));
                }
            }
        }
        Ok(())
    }
}
