//! The output session a unit finalizes into.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Artifact records emitted at finalize for downstream tooling. A record is
/// only added after the file it points at has been fully written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ArtifactRecord {
    /// The serialized asset manifest.
    #[serde(rename_all = "camelCase")]
    AssetManifest { id: String, file: String },
    /// The deployable unit, linked to its template object and manifest.
    #[serde(rename_all = "camelCase")]
    DeployableUnit {
        id: String,
        template_file: String,
        /// `s3://` form; the deploying system resolves it to an `https://`
        /// URL before use, since the URL suffix is unknown at compile time.
        template_url: String,
        dependencies: Vec<String>,
    },
}

/// One finalize target: an output directory plus the artifact records
/// produced into it.
#[derive(Debug)]
pub struct SynthSession {
    out_dir: PathBuf,
    artifacts: Vec<ArtifactRecord>,
}

impl SynthSession {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into(), artifacts: Vec::new() }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn artifacts(&self) -> &[ArtifactRecord] {
        &self.artifacts
    }

    pub(crate) fn add_artifact(&mut self, artifact: ArtifactRecord) {
        self.artifacts.push(artifact);
    }
}
