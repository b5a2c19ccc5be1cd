//! Destination planning for container image artifacts.

use indexmap::IndexMap;

use berth_core::asset::DockerImageAssetSource;
use berth_core::config::ImageTagSuffixType;
use berth_core::error::Result;
use berth_core::manifest::ImageDestination;
use berth_core::unit::UnitEnv;

/// Bind-time-resolved inputs for image planning.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePlanConfig<'a> {
    pub tag_prefix: &'a str,
    pub tag_suffix_type: ImageTagSuffixType,
    pub region_set: &'a [String],
    pub publishing_role_arn: Option<&'a str>,
}

/// Destinations plus the image tag shared by all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlan {
    pub destinations: IndexMap<String, ImageDestination>,
    pub image_tag: String,
}

/// Compute every placement of an image artifact.
///
/// Unlike buckets, repository names are never region-templated: a configured
/// region set always yields one destination per region with the repository
/// name unchanged.
pub fn plan_image_destinations(
    asset: &DockerImageAssetSource,
    cfg: &ImagePlanConfig<'_>,
    repository_name: &str,
    env: &UnitEnv,
) -> Result<ImagePlan> {
    asset.validate()?;

    let image_tag = match cfg.tag_suffix_type {
        ImageTagSuffixType::Hash => format!("{}{}", cfg.tag_prefix, asset.source_hash),
        ImageTagSuffixType::None => cfg.tag_prefix.to_string(),
    };

    let mut destinations = IndexMap::new();
    if !cfg.region_set.is_empty() {
        for region in cfg.region_set {
            destinations.insert(
                region.clone(),
                ImageDestination {
                    repository_name: repository_name.to_string(),
                    image_tag: image_tag.clone(),
                    region: Some(region.clone()),
                    assume_role_arn: cfg.publishing_role_arn.map(str::to_owned),
                },
            );
        }
        tracing::trace!(
            hash = %asset.source_hash,
            regions = cfg.region_set.len(),
            "expanded image asset across region set"
        );
    } else {
        destinations.insert(
            env.manifest_key(),
            ImageDestination {
                repository_name: repository_name.to_string(),
                image_tag: image_tag.clone(),
                region: env.region.clone(),
                assume_role_arn: cfg.publishing_role_arn.map(str::to_owned),
            },
        );
    }

    Ok(ImagePlan { destinations, image_tag })
}
