//! The placement engine.
//!
//! Lifecycle: construct with props (config resolution), `bind` one unit
//! (placeholder resolution of every configured string), register assets in
//! any order, `finalize` once. A second `bind` or a registration before the
//! first one is an error; a failed registration writes nothing.

use std::fs;

use berth_core::asset::{DockerImageAssetSource, FileAssetPackaging, FileAssetSource};
use berth_core::config::{EngineConfig, EngineProps};
use berth_core::error::{Error, Result};
use berth_core::expr::Expr;
use berth_core::hash::source_hash_serde;
use berth_core::manifest::{
    AssetManifest, DockerImageAssetEntry, FileAssetEntry, FileManifestSource, ImageManifestSource,
};
use berth_core::placeholder::{self, REGION};
use berth_core::unit::{DeployUnit, UnitEnv};
use berth_planner::{
    plan_file_destinations, plan_image_destinations, FilePlanConfig, ImagePlanConfig,
};

use crate::session::{ArtifactRecord, SynthSession};

/// Location expression returned for a registered file asset. Components that
/// still carry placeholders are deploy-time substitution expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAssetLocation {
    pub bucket_name: Expr,
    pub object_key: String,
    pub http_url: Expr,
    pub s3_object_url: Expr,
}

/// Location expression returned for a registered image asset.
#[derive(Debug, Clone, PartialEq)]
pub struct DockerImageAssetLocation {
    pub repository_name: Expr,
    pub image_uri: Expr,
}

/// Asset placement engine for exactly one deployable unit.
#[derive(Debug)]
pub struct Engine {
    cfg: EngineConfig,
    unit: Option<DeployUnit>,

    // Bind-time specialized copies of the configured names.
    bucket_name: Option<String>,
    repository_name: Option<String>,
    file_publishing_role_arn: Option<String>,
    image_publishing_role_arn: Option<String>,
    file_asset_prefix: String,
    template_bucket_name: Option<String>,
    image_tag_prefix: String,

    manifest: AssetManifest,
    finalized: bool,
}

impl Engine {
    /// Resolve props (with environment fallback) and build an unbound engine.
    pub fn new(props: EngineProps) -> Result<Self> {
        Ok(Self::with_config(EngineConfig::from_props(&props)?))
    }

    /// Build an unbound engine from an already-resolved configuration.
    pub fn with_config(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            unit: None,
            bucket_name: None,
            repository_name: None,
            file_publishing_role_arn: None,
            image_publishing_role_arn: None,
            file_asset_prefix: String::new(),
            template_bucket_name: None,
            image_tag_prefix: String::new(),
            manifest: AssetManifest::new(),
            finalized: false,
        }
    }

    /// Bind the engine to its unit and resolve every configured string
    /// against the unit's environment. Fails if already bound.
    pub fn bind(&mut self, unit: DeployUnit) -> Result<()> {
        if let Some(bound) = &self.unit {
            return Err(Error::AlreadyBound(bound.id.clone()));
        }

        let env = &unit.env;
        self.bucket_name =
            placeholder::specialize_opt(self.cfg.file_asset_bucket_name.as_deref(), env);
        self.repository_name =
            placeholder::specialize_opt(self.cfg.image_asset_repository_name.as_deref(), env);
        self.file_publishing_role_arn =
            placeholder::specialize_opt(self.cfg.file_asset_publishing_role_arn.as_deref(), env);
        self.image_publishing_role_arn =
            placeholder::specialize_opt(self.cfg.image_asset_publishing_role_arn.as_deref(), env);
        self.file_asset_prefix = placeholder::specialize(&self.cfg.file_asset_prefix, env);
        self.template_bucket_name =
            placeholder::specialize_opt(self.cfg.template_bucket_name.as_deref(), env);
        self.image_tag_prefix = placeholder::specialize(&self.cfg.image_asset_tag_prefix, env);

        tracing::debug!(unit = %unit.id, "bound unit");
        self.unit = Some(unit);
        Ok(())
    }

    /// The bound unit, if any.
    pub fn unit(&self) -> Option<&DeployUnit> {
        self.unit.as_ref()
    }

    fn bound_env(&self, op: &'static str) -> Result<UnitEnv> {
        match &self.unit {
            Some(unit) => Ok(unit.env.clone()),
            None => Err(Error::NotBound(op)),
        }
    }

    /// Register a file artifact and return its location expression. A second
    /// registration for the same source hash overwrites the manifest entry.
    pub fn register_file_asset(&mut self, asset: &FileAssetSource) -> Result<FileAssetLocation> {
        self.register_file_asset_in(asset, None)
    }

    fn register_file_asset_in(
        &mut self,
        asset: &FileAssetSource,
        override_bucket: Option<&str>,
    ) -> Result<FileAssetLocation> {
        let env = self.bound_env("register_file_asset")?;

        let bucket_name = match override_bucket {
            Some(bucket) => bucket.to_string(),
            None => self
                .bucket_name
                .clone()
                .filter(|name| !name.is_empty())
                .ok_or_else(|| {
                    Error::Config(
                        "fileAssetBucketName is required to register a file asset".to_string(),
                    )
                })?,
        };

        let plan = plan_file_destinations(
            asset,
            &FilePlanConfig {
                prefix: &self.file_asset_prefix,
                region_set: &self.cfg.file_asset_region_set,
                publishing_role_arn: self.file_publishing_role_arn.as_deref(),
            },
            &bucket_name,
            &env,
        )?;

        self.manifest.files.insert(
            asset.source_hash.clone(),
            FileAssetEntry {
                source: FileManifestSource::from(asset),
                destinations: plan.destinations,
            },
        );
        tracing::debug!(hash = %asset.source_hash, key = %plan.object_key, "registered file asset");

        let region = env.region_or_placeholder();
        let url_suffix = env.url_suffix_or_placeholder();
        let http_url = Expr::from_template(format!(
            "https://s3.{region}.{url_suffix}/{bucket_name}/{}",
            plan.object_key
        ));
        let s3_object_url =
            Expr::from_template(format!("s3://{bucket_name}/{}", plan.object_key));

        Ok(FileAssetLocation {
            bucket_name: Expr::from_template(bucket_name),
            object_key: plan.object_key,
            http_url,
            s3_object_url,
        })
    }

    /// Register an image artifact and return its location expression. The
    /// region segment of the URI stays a literal placeholder token so one
    /// expression can serve a multi-region publish.
    pub fn register_image_asset(
        &mut self,
        asset: &DockerImageAssetSource,
    ) -> Result<DockerImageAssetLocation> {
        let env = self.bound_env("register_image_asset")?;

        let repository_name = self
            .repository_name
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "imageAssetRepositoryName is required to register an image asset".to_string(),
                )
            })?;

        let plan = plan_image_destinations(
            asset,
            &ImagePlanConfig {
                tag_prefix: &self.image_tag_prefix,
                tag_suffix_type: self.cfg.image_asset_tag_suffix_type,
                region_set: &self.cfg.image_asset_region_set,
                publishing_role_arn: self.image_publishing_role_arn.as_deref(),
            },
            &repository_name,
            &env,
        )?;

        self.manifest.docker_images.insert(
            asset.source_hash.clone(),
            DockerImageAssetEntry {
                source: ImageManifestSource::from(asset),
                destinations: plan.destinations,
            },
        );
        tracing::debug!(hash = %asset.source_hash, tag = %plan.image_tag, "registered image asset");

        let account = self
            .cfg
            .image_asset_account_id
            .as_deref()
            .unwrap_or_else(|| env.account_or_placeholder())
            .to_string();
        let url_suffix = env.url_suffix_or_placeholder();
        let image_uri = Expr::from_template(format!(
            "{account}.dkr.ecr.{REGION}.{url_suffix}/{repository_name}:{}",
            plan.image_tag
        ));

        Ok(DockerImageAssetLocation {
            repository_name: Expr::from_template(repository_name),
            image_uri,
        })
    }

    /// Serialize the manifest accumulated so far.
    pub fn serialize_manifest(&self) -> Result<String> {
        self.manifest.to_json_pretty()
    }

    /// Number of file entries currently in the manifest.
    pub fn file_asset_count(&self) -> usize {
        self.manifest.files.len()
    }

    /// Number of image entries currently in the manifest.
    pub fn image_asset_count(&self) -> usize {
        self.manifest.docker_images.len()
    }

    /// Run the full synthesis sequence: write the compiled template, register
    /// it as a file asset of its own, write the manifest, then record both
    /// artifacts into the session. Returns the manifest artifact id.
    ///
    /// Each file is fully written before its artifact record is added, so a
    /// reader never observes an advertised-but-partial manifest.
    pub fn finalize(&mut self, session: &mut SynthSession) -> Result<String> {
        let unit = match &self.unit {
            Some(unit) => unit.clone(),
            None => return Err(Error::NotBound("finalize")),
        };
        if self.finalized {
            return Err(Error::Invariant(
                "finalize may only run once per engine".to_string(),
            ));
        }

        let template_file = unit.template_file();
        let template_path = session.out_dir().join(&template_file);
        fs::write(&template_path, serde_json::to_string_pretty(&unit.template)?)?;
        tracing::debug!(
            file = %template_file,
            digest = %source_hash_serde(&unit.template)?,
            "wrote compiled template"
        );

        // The template rides along as a regular file asset, keyed by its
        // file name, directed at the override bucket when one is configured.
        let template_asset = FileAssetSource::from_file(
            template_file.clone(),
            template_file.clone(),
            FileAssetPackaging::File,
        );
        let override_bucket = self.template_bucket_name.clone();
        self.register_file_asset_in(&template_asset, override_bucket.as_deref())?;

        let template_bucket = match override_bucket {
            Some(bucket) => bucket,
            None => self.bucket_name.clone().unwrap_or_default(),
        };
        let template_url = format!("s3://{template_bucket}/{template_file}");

        let artifact_id = format!("{}.assets", unit.id);
        let manifest_file = format!("{artifact_id}.json");
        fs::write(session.out_dir().join(&manifest_file), self.serialize_manifest()?)?;

        session.add_artifact(ArtifactRecord::AssetManifest {
            id: artifact_id.clone(),
            file: manifest_file,
        });
        session.add_artifact(ArtifactRecord::DeployableUnit {
            id: unit.id.clone(),
            template_file,
            template_url,
            dependencies: vec![artifact_id.clone()],
        });

        tracing::debug!(
            artifact = %artifact_id,
            files = self.manifest.files.len(),
            images = self.manifest.docker_images.len(),
            "finalized unit"
        );
        self.finalized = true;
        Ok(artifact_id)
    }
}
