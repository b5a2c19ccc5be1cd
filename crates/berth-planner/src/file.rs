//! Destination planning for file artifacts.

use indexmap::IndexMap;

use berth_core::asset::{FileAssetPackaging, FileAssetSource};
use berth_core::error::Result;
use berth_core::manifest::FileDestination;
use berth_core::placeholder::{self, REGION};
use berth_core::unit::UnitEnv;

/// Bind-time-resolved inputs for file planning. The bucket name travels
/// separately because finalize may direct the template at an override bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePlanConfig<'a> {
    pub prefix: &'a str,
    pub region_set: &'a [String],
    pub publishing_role_arn: Option<&'a str>,
}

/// Destinations plus the object key shared by all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePlan {
    pub destinations: IndexMap<String, FileDestination>,
    pub object_key: String,
}

/// Compute every placement of a file artifact.
///
/// When a region set is configured *and* the bucket name carries the region
/// placeholder, one destination is emitted per region, keyed by the region,
/// with the placeholder expanded to that literal region. Otherwise a single
/// destination keyed by the unit's `<account>-<region>` label is emitted with
/// the bucket name unmodified.
pub fn plan_file_destinations(
    asset: &FileAssetSource,
    cfg: &FilePlanConfig<'_>,
    bucket_name: &str,
    env: &UnitEnv,
) -> Result<FilePlan> {
    asset.validate()?;

    let object_key = format!(
        "{}{}{}",
        cfg.prefix,
        asset.source_hash,
        match asset.packaging {
            Some(FileAssetPackaging::ZipDirectory) => ".zip",
            _ => "",
        }
    );

    let mut destinations = IndexMap::new();
    if !cfg.region_set.is_empty() && bucket_name.contains(REGION) {
        for region in cfg.region_set {
            // Duplicate regions overwrite the earlier destination sharing
            // the key; the set's declared order is the iteration order.
            destinations.insert(
                region.clone(),
                FileDestination {
                    bucket_name: placeholder::replace_all(bucket_name, REGION, region),
                    object_key: object_key.clone(),
                    region: Some(region.clone()),
                    assume_role_arn: cfg.publishing_role_arn.map(str::to_owned),
                },
            );
        }
        tracing::trace!(
            hash = %asset.source_hash,
            regions = cfg.region_set.len(),
            "expanded file asset across region set"
        );
    } else {
        let region = env
            .region
            .clone()
            .or_else(|| cfg.region_set.first().cloned());
        destinations.insert(
            env.manifest_key(),
            FileDestination {
                bucket_name: bucket_name.to_string(),
                object_key: object_key.clone(),
                region,
                assume_role_arn: cfg.publishing_role_arn.map(str::to_owned),
            },
        );
    }

    Ok(FilePlan { destinations, object_key })
}
