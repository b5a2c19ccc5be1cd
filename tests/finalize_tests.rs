//! End-to-end finalize: template emission, self-registration, manifest write,
//! and artifact records.

use berth_core::asset::{FileAssetPackaging, FileAssetSource};
use berth_core::config::{EngineConfig, EngineProps};
use berth_core::error::Error;
use berth_core::unit::{DeployUnit, UnitEnv};
use berth_engine::{ArtifactRecord, Engine, SynthSession};
use serde_json::json;

fn engine_with(props: EngineProps) -> Engine {
    Engine::with_config(EngineConfig::resolve_with(&props, |_| None).unwrap())
}

#[test]
fn finalize_registers_template_and_writes_manifest() {
    let out = tempfile::tempdir().unwrap();
    let mut session = SynthSession::new(out.path());

    let mut engine = engine_with(EngineProps {
        file_asset_bucket_name: Some("file-bucket".to_string()),
        ..Default::default()
    });
    engine
        .bind(DeployUnit::new(
            "mystack",
            UnitEnv::default(),
            json!({"Resources": {}}),
        ))
        .unwrap();
    engine
        .register_file_asset(&FileAssetSource::from_file(
            "h1",
            "dist/app",
            FileAssetPackaging::File,
        ))
        .unwrap();

    let artifact_id = engine.finalize(&mut session).unwrap();
    assert_eq!(artifact_id, "mystack.assets");

    // Both output files exist.
    assert!(out.path().join("mystack.template.json").is_file());
    let manifest_raw = std::fs::read_to_string(out.path().join("mystack.assets.json")).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&manifest_raw).unwrap();

    let h1 = &manifest["files"]["h1"]["destinations"]["current_account-current_region"];
    assert_eq!(h1["bucketName"], json!("file-bucket"));
    assert_eq!(h1["objectKey"], json!("h1"));

    let tmpl =
        &manifest["files"]["mystack.template.json"]["destinations"]["current_account-current_region"];
    assert_eq!(tmpl["bucketName"], json!("file-bucket"));
    assert_eq!(tmpl["objectKey"], json!("mystack.template.json"));
    assert_eq!(
        manifest["files"]["mystack.template.json"]["source"]["path"],
        json!("mystack.template.json")
    );
}

#[test]
fn template_goes_to_override_bucket_when_configured() {
    let out = tempfile::tempdir().unwrap();
    let mut session = SynthSession::new(out.path());

    let mut engine = engine_with(EngineProps {
        file_asset_bucket_name: Some("file-bucket".to_string()),
        template_bucket_name: Some("template-bucket".to_string()),
        file_asset_publishing_role_arn: Some("file:role:arn".to_string()),
        ..Default::default()
    });
    engine
        .bind(DeployUnit::new("mystack", UnitEnv::default(), json!({})))
        .unwrap();
    engine.finalize(&mut session).unwrap();

    let manifest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(out.path().join("mystack.assets.json")).unwrap(),
    )
    .unwrap();
    let tmpl =
        &manifest["files"]["mystack.template.json"]["destinations"]["current_account-current_region"];
    assert_eq!(tmpl["bucketName"], json!("template-bucket"));
    assert_eq!(tmpl["assumeRoleArn"], json!("file:role:arn"));

    // The unit artifact record points at the override bucket too.
    let unit_record = session
        .artifacts()
        .iter()
        .find_map(|a| match a {
            ArtifactRecord::DeployableUnit { template_url, .. } => Some(template_url.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(unit_record, "s3://template-bucket/mystack.template.json");
}

#[test]
fn artifact_records_link_manifest_and_unit() {
    let out = tempfile::tempdir().unwrap();
    let mut session = SynthSession::new(out.path());

    let mut engine = engine_with(EngineProps {
        file_asset_bucket_name: Some("file-bucket".to_string()),
        ..Default::default()
    });
    engine
        .bind(DeployUnit::new("mystack", UnitEnv::default(), json!({})))
        .unwrap();
    engine.finalize(&mut session).unwrap();

    let records = session.artifacts();
    assert_eq!(records.len(), 2);
    // The manifest record comes first: a file is written before it is
    // advertised.
    assert!(matches!(
        &records[0],
        ArtifactRecord::AssetManifest { id, file }
            if id == "mystack.assets" && file == "mystack.assets.json"
    ));
    assert!(matches!(
        &records[1],
        ArtifactRecord::DeployableUnit { id, dependencies, .. }
            if id == "mystack" && dependencies == &vec!["mystack.assets".to_string()]
    ));
}

#[test]
fn finalize_before_bind_is_not_bound() {
    let out = tempfile::tempdir().unwrap();
    let mut session = SynthSession::new(out.path());
    let mut engine = engine_with(EngineProps::default());
    assert!(matches!(
        engine.finalize(&mut session).unwrap_err(),
        Error::NotBound(_)
    ));
}

#[test]
fn finalize_runs_at_most_once() {
    let out = tempfile::tempdir().unwrap();
    let mut session = SynthSession::new(out.path());
    let mut engine = engine_with(EngineProps {
        file_asset_bucket_name: Some("file-bucket".to_string()),
        ..Default::default()
    });
    engine
        .bind(DeployUnit::new("mystack", UnitEnv::default(), json!({})))
        .unwrap();
    engine.finalize(&mut session).unwrap();
    assert!(engine.finalize(&mut session).is_err());
}

#[test]
fn finalize_without_any_bucket_fails_before_writing_manifest() {
    let out = tempfile::tempdir().unwrap();
    let mut session = SynthSession::new(out.path());
    let mut engine = engine_with(EngineProps::default());
    engine
        .bind(DeployUnit::new("mystack", UnitEnv::default(), json!({})))
        .unwrap();

    assert!(matches!(
        engine.finalize(&mut session).unwrap_err(),
        Error::Config(_)
    ));
    assert!(!out.path().join("mystack.assets.json").exists());
    assert!(session.artifacts().is_empty());
}
