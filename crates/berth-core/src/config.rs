//! Engine configuration: explicit props with environment-variable fallback.
//!
//! Every prop has a parallel `BERTH_*` environment variable; explicit props
//! win. Resolution happens once, at engine construction, and is the only
//! place the process environment is read.

use std::str::FromStr;

use crate::error::{Error, Result};

pub const ENV_FILE_ASSET_BUCKET_NAME: &str = "BERTH_FILE_ASSET_BUCKET_NAME";
pub const ENV_IMAGE_ASSET_REPOSITORY_NAME: &str = "BERTH_IMAGE_ASSET_REPOSITORY_NAME";
pub const ENV_FILE_ASSET_PUBLISHING_ROLE_ARN: &str = "BERTH_FILE_ASSET_PUBLISHING_ROLE_ARN";
pub const ENV_IMAGE_ASSET_PUBLISHING_ROLE_ARN: &str = "BERTH_IMAGE_ASSET_PUBLISHING_ROLE_ARN";
pub const ENV_FILE_ASSET_PREFIX: &str = "BERTH_FILE_ASSET_PREFIX";
pub const ENV_FILE_ASSET_REGION_SET: &str = "BERTH_FILE_ASSET_REGION_SET";
pub const ENV_TEMPLATE_BUCKET_NAME: &str = "BERTH_TEMPLATE_BUCKET_NAME";
pub const ENV_IMAGE_ASSET_TAG_PREFIX: &str = "BERTH_IMAGE_ASSET_TAG_PREFIX";
pub const ENV_IMAGE_ASSET_TAG_SUFFIX_TYPE: &str = "BERTH_IMAGE_ASSET_TAG_SUFFIX_TYPE";
pub const ENV_IMAGE_ASSET_REGION_SET: &str = "BERTH_IMAGE_ASSET_REGION_SET";
pub const ENV_IMAGE_ASSET_ACCOUNT_ID: &str = "BERTH_IMAGE_ASSET_ACCOUNT_ID";

/// Default object-key prefix for file assets.
pub const DEFAULT_FILE_ASSET_PREFIX: &str = "";

/// How published image tags are suffixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageTagSuffixType {
    /// `tag = prefix + sourceHash`.
    #[default]
    Hash,
    /// `tag = prefix` exactly, regardless of sourceHash.
    None,
}

impl FromStr for ImageTagSuffixType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HASH" => Ok(ImageTagSuffixType::Hash),
            "NONE" => Ok(ImageTagSuffixType::None),
            other => Err(Error::Config(format!(
                "unknown image asset tag suffix type '{other}' (expected HASH or NONE)"
            ))),
        }
    }
}

/// Explicit configuration handed to `Engine::new`. Any `None` field falls
/// back to its environment variable. Values may carry the account and region
/// placeholders; they are resolved once at bind time.
#[derive(Debug, Clone, Default)]
pub struct EngineProps {
    pub file_asset_bucket_name: Option<String>,
    pub image_asset_repository_name: Option<String>,
    pub file_asset_publishing_role_arn: Option<String>,
    pub image_asset_publishing_role_arn: Option<String>,
    pub file_asset_prefix: Option<String>,
    pub file_asset_region_set: Option<Vec<String>>,
    pub template_bucket_name: Option<String>,
    pub image_asset_tag_prefix: Option<String>,
    pub image_asset_tag_suffix_type: Option<String>,
    pub image_asset_region_set: Option<Vec<String>>,
    pub image_asset_account_id: Option<String>,
}

/// Fully resolved configuration. Region sets are trimmed with blank entries
/// dropped; an empty-after-trim set behaves as absent.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub file_asset_bucket_name: Option<String>,
    pub image_asset_repository_name: Option<String>,
    pub file_asset_publishing_role_arn: Option<String>,
    pub image_asset_publishing_role_arn: Option<String>,
    pub file_asset_prefix: String,
    pub file_asset_region_set: Vec<String>,
    pub template_bucket_name: Option<String>,
    pub image_asset_tag_prefix: String,
    pub image_asset_tag_suffix_type: ImageTagSuffixType,
    pub image_asset_region_set: Vec<String>,
    pub image_asset_account_id: Option<String>,
}

impl EngineConfig {
    /// Resolve props against the process environment.
    pub fn from_props(props: &EngineProps) -> Result<Self> {
        Self::resolve_with(props, |key| std::env::var(key).ok())
    }

    /// Resolve props against an arbitrary variable lookup. Keeps the
    /// fallback logic testable without mutating the process environment.
    pub fn resolve_with<F>(props: &EngineProps, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: &Option<String>, key: &str| -> Option<String> {
            explicit.clone().or_else(|| env(key))
        };

        let file_region_set = props
            .file_asset_region_set
            .clone()
            .or_else(|| env(ENV_FILE_ASSET_REGION_SET).map(split_region_set));
        let image_region_set = props
            .image_asset_region_set
            .clone()
            .or_else(|| env(ENV_IMAGE_ASSET_REGION_SET).map(split_region_set));

        let image_asset_tag_suffix_type = match pick(
            &props.image_asset_tag_suffix_type,
            ENV_IMAGE_ASSET_TAG_SUFFIX_TYPE,
        ) {
            Some(raw) => raw.parse()?,
            None => ImageTagSuffixType::default(),
        };

        Ok(Self {
            file_asset_bucket_name: pick(&props.file_asset_bucket_name, ENV_FILE_ASSET_BUCKET_NAME),
            image_asset_repository_name: pick(
                &props.image_asset_repository_name,
                ENV_IMAGE_ASSET_REPOSITORY_NAME,
            ),
            file_asset_publishing_role_arn: pick(
                &props.file_asset_publishing_role_arn,
                ENV_FILE_ASSET_PUBLISHING_ROLE_ARN,
            ),
            image_asset_publishing_role_arn: pick(
                &props.image_asset_publishing_role_arn,
                ENV_IMAGE_ASSET_PUBLISHING_ROLE_ARN,
            ),
            file_asset_prefix: pick(&props.file_asset_prefix, ENV_FILE_ASSET_PREFIX)
                .unwrap_or_else(|| DEFAULT_FILE_ASSET_PREFIX.to_string()),
            file_asset_region_set: clean_region_set(file_region_set),
            template_bucket_name: pick(&props.template_bucket_name, ENV_TEMPLATE_BUCKET_NAME),
            image_asset_tag_prefix: pick(&props.image_asset_tag_prefix, ENV_IMAGE_ASSET_TAG_PREFIX)
                .unwrap_or_default(),
            image_asset_tag_suffix_type,
            image_asset_region_set: clean_region_set(image_region_set),
            image_asset_account_id: pick(&props.image_asset_account_id, ENV_IMAGE_ASSET_ACCOUNT_ID),
        })
    }
}

fn split_region_set(raw: String) -> Vec<String> {
    raw.split(',').map(|s| s.to_string()).collect()
}

/// Trim entries and drop blanks. Duplicates are kept: a duplicate region key
/// silently overwrites the earlier destination sharing it.
fn clean_region_set(raw: Option<Vec<String>>) -> Vec<String> {
    raw.unwrap_or_default()
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_set_is_trimmed_and_blanks_dropped() {
        let cleaned = clean_region_set(Some(vec![
            " us-east-1 ".to_string(),
            "".to_string(),
            "  ".to_string(),
            "us-west-1".to_string(),
        ]));
        assert_eq!(cleaned, vec!["us-east-1", "us-west-1"]);
    }

    #[test]
    fn invalid_suffix_type_is_a_config_error() {
        let props = EngineProps {
            image_asset_tag_suffix_type: Some("LATEST".to_string()),
            ..Default::default()
        };
        assert!(EngineConfig::resolve_with(&props, |_| None).is_err());
    }
}
