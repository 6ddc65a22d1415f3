//! Entity construction from server JSON

use mlflow_rest_client::entity::{
    Artifact, EnumPolicy, Experiment, ExperimentStage, Lenient, Model, ModelVersion, ModelVersionStage,
    ModelVersionStatus, Run, RunStatus, Structural,
};
use mlflow_rest_client::Error;
use serde_json::json;

// ============================================================================
// Experiment
// ============================================================================

#[test]
fn test_experiment_full_payload() {
    let experiment = Experiment::from_raw(&json!({
        "experiment_id": "7",
        "name": "churn",
        "artifact_location": "s3://bucket/7",
        "lifecycle_stage": "active",
        "tags": [{"key": "team", "value": "growth"}],
        "creation_time": 1_700_000_000_000_i64
    }))
    .unwrap();

    assert_eq!(experiment.id(), "7");
    assert_eq!(experiment.name(), "churn");
    assert_eq!(experiment.artifact_location(), "s3://bucket/7");
    assert!(experiment.is_active());
    assert_eq!(experiment.tags().get("team").unwrap(), &("team", "growth"));
    assert_eq!(experiment.creation_time().unwrap().timestamp_millis(), 1_700_000_000_000);
    assert!(experiment.last_update_time().is_none());
}

#[test]
fn test_experiment_integer_id_and_defaults() {
    let experiment = Experiment::from_raw(&json!({"experiment_id": 12, "name": "numeric"})).unwrap();
    assert_eq!(experiment.id(), "12");
    assert_eq!(*experiment.stage(), ExperimentStage::Active);
    assert!(experiment.tags().is_empty());
    assert_eq!(experiment.artifact_location(), "");
}

#[test]
fn test_experiment_missing_id_names_field() {
    let err = Experiment::from_raw(&json!({"name": "orphan"})).unwrap_err();
    assert!(matches!(err, Error::Validation { ref context, .. } if context == "experiment.experiment_id"));
}

#[test]
fn test_experiment_unknown_stage_policies() {
    let raw = json!({"experiment_id": "1", "name": "x", "lifecycle_stage": "archived"});

    let strict = Experiment::from_raw(&raw).unwrap_err();
    assert!(matches!(strict, Error::UnknownEnumValue { kind: "ExperimentStage", .. }));

    let lenient = Experiment::from_raw_with(&raw, EnumPolicy::Lenient).unwrap();
    assert_eq!(lenient.stage(), &Lenient::Unknown("archived".to_string()));
    assert!(!lenient.is_active());
}

#[test]
fn test_experiment_tag_mapping_shorthand() {
    let experiment = Experiment::from_raw(&json!({
        "experiment_id": "1",
        "name": "x",
        "tags": [{"owner": "ana"}, {"key": "team", "value": "growth"}]
    }))
    .unwrap();
    let keys: Vec<&str> = experiment.tags().keys().collect();
    assert_eq!(keys, vec!["owner", "team"]);
}

// ============================================================================
// Run
// ============================================================================

#[test]
fn test_run_full_payload() {
    let run = Run::from_raw(&json!({
        "info": {
            "run_id": "abc123",
            "run_name": "baseline",
            "experiment_id": "3",
            "user_id": "ana",
            "status": "FINISHED",
            "start_time": 1_700_000_000_000_i64,
            "end_time": 1_700_000_060_000_i64,
            "artifact_uri": "s3://bucket/3/abc123/artifacts",
            "lifecycle_stage": "active"
        },
        "data": {
            "params": [{"key": "alpha", "value": "0.5"}],
            "metrics": [{"key": "rmse", "value": 0.27, "timestamp": 1_700_000_030_000_i64, "step": 2}],
            "tags": [{"key": "mlflow.user", "value": "ana"}]
        }
    }))
    .unwrap();

    assert_eq!(run.id(), "abc123");
    assert_eq!(run.info().run_name(), Some("baseline"));
    assert_eq!(run.info().experiment_id(), Some("3"));
    assert_eq!(*run.info().status(), RunStatus::Finished);
    assert!(run.info().is_terminal());
    assert_eq!(run.data().get_param("alpha").unwrap(), &("alpha", "0.5"));
    let rmse = run.data().get_metric("rmse").unwrap();
    assert_eq!(rmse, &("rmse", 0.27, 1_700_000_030_000));
    assert_eq!(rmse.step(), Some(2));
    assert_eq!(run.data().get_tag("mlflow.user").unwrap().value(), "ana");
}

#[test]
fn test_run_legacy_uuid_field() {
    let run = Run::from_raw(&json!({"info": {"run_uuid": "legacy", "status": "RUNNING"}})).unwrap();
    assert_eq!(run.id(), "legacy");
    assert!(run.data().params().is_empty());
    assert!(!run.info().is_terminal());
}

#[test]
fn test_run_missing_info_names_path() {
    let err = Run::from_raw(&json!({"data": {}})).unwrap_err();
    assert!(format!("{err}").contains("run.info"));
}

#[test]
fn test_run_missing_id_names_path() {
    let err = Run::from_raw(&json!({"info": {"status": "RUNNING"}})).unwrap_err();
    assert!(format!("{err}").contains("run.info.run_id"));
}

#[test]
fn test_run_status_case_insensitive() {
    let run = Run::from_raw(&json!({"info": {"run_id": "r", "status": "killed"}})).unwrap();
    assert_eq!(*run.info().status(), RunStatus::Killed);
}

#[test]
fn test_run_bad_metric_names_index() {
    let err = Run::from_raw(&json!({
        "info": {"run_id": "r"},
        "data": {"metrics": [
            {"key": "a", "value": 1.0, "timestamp": 1},
            {"key": "b", "value": "high", "timestamp": 1}
        ]}
    }))
    .unwrap_err();
    assert!(format!("{err}").contains("run.data.metrics[1].value"));
}

// ============================================================================
// Model and ModelVersion
// ============================================================================

fn version(number: u64, stage: &str, created: i64) -> serde_json::Value {
    json!({
        "name": "churn",
        "version": number.to_string(),
        "current_stage": stage,
        "creation_timestamp": created,
        "status": "READY"
    })
}

#[test]
fn test_model_version_payload() {
    let version = ModelVersion::from_raw(&json!({
        "name": "churn",
        "version": "4",
        "creation_timestamp": 1_700_000_000_000_i64,
        "current_stage": "Production",
        "source": "s3://bucket/model",
        "run_id": "abc",
        "status": "PENDING_REGISTRATION",
        "status_message": "copying files",
        "tags": [{"key": "approved", "value": "yes"}]
    }))
    .unwrap();

    assert_eq!(version.name(), "churn");
    assert_eq!(version.version(), 4);
    assert_eq!(*version.stage(), ModelVersionStage::Production);
    assert_eq!(version.run_id(), Some("abc"));
    assert_eq!(
        version.state(),
        &(ModelVersionStatus::PendingRegistration, "copying files")
    );
    assert!(!version.is_ready());
    assert_eq!(version.to_string(), "churn v4");
}

#[test]
fn test_model_version_defaults() {
    let version = ModelVersion::from_raw(&json!({"name": "churn", "version": 1, "run_id": ""})).unwrap();
    assert_eq!(*version.stage(), ModelVersionStage::None);
    assert_eq!(version.run_id(), None);
    assert_eq!(version.description(), "");
}

#[test]
fn test_model_version_negative_rejected() {
    let err = ModelVersion::from_raw(&json!({"name": "churn", "version": -1})).unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
}

#[test]
fn test_model_latest_versions_and_stage_lookup() {
    let model = Model::from_raw(&json!({
        "name": "churn",
        "description": "churn predictor",
        "latest_versions": [
            version(1, "Production", 100),
            version(2, "Staging", 200),
            version(3, "Production", 300),
            version(4, "None", 400)
        ]
    }))
    .unwrap();

    assert_eq!(model.name(), "churn");
    assert_eq!(model.latest_versions().len(), 4);
    assert_eq!(model.get_version_by_stage(ModelVersionStage::Production).unwrap().version(), 3);
    assert_eq!(model.get_version_by_stage(ModelVersionStage::Staging).unwrap().version(), 2);
    assert!(model.get_version_by_stage(ModelVersionStage::Archived).is_none());
}

#[test]
fn test_model_stage_tie_prefers_higher_version() {
    let model = Model::from_raw(&json!({
        "name": "churn",
        "latest_versions": [version(5, "Staging", 100), version(6, "Staging", 100)]
    }))
    .unwrap();
    assert_eq!(model.get_version_by_stage(ModelVersionStage::Staging).unwrap().version(), 6);
}

#[test]
fn test_model_without_versions() {
    let model = Model::from_raw(&json!({"name": "empty"})).unwrap();
    assert!(model.latest_versions().is_empty());
    assert!(model.get_version_by_stage(ModelVersionStage::Production).is_none());
}

#[test]
fn test_model_unknown_version_stage_lenient() {
    let raw = json!({"name": "churn", "latest_versions": [version(1, "Canary", 100)]});
    assert!(Model::from_raw(&raw).is_err());

    let model = Model::from_raw_with(&raw, EnumPolicy::Lenient).unwrap();
    assert!(model.latest_versions()[0].stage().is_unknown());
    assert!(model.get_version_by_stage(ModelVersionStage::Production).is_none());
}

// ============================================================================
// Artifact and value objects
// ============================================================================

#[test]
fn test_artifact_entry() {
    let file = Artifact::from_raw(&json!({"path": "model/MLmodel", "is_dir": false, "file_size": 512})).unwrap();
    assert_eq!(file.path(), "model/MLmodel");
    assert!(!file.is_dir());
    assert_eq!(file.file_size(), Some(512));
    assert_eq!(file.root(), None);
    assert_eq!(file.full_path(), "model/MLmodel");

    let dir = Artifact::from_raw(&json!({"path": "model", "is_dir": true})).unwrap();
    assert!(dir.is_dir());
    assert_eq!(dir.file_size(), None);
}

#[test]
fn test_artifact_negative_size_rejected() {
    assert!(Artifact::from_raw(&json!({"path": "x", "file_size": -3})).is_err());
}

#[test]
fn test_keyed_list_structural_lookup() {
    let experiment = Experiment::from_raw(&json!({
        "experiment_id": "1",
        "name": "x",
        "tags": [{"key": "a", "value": "1"}, {"key": "b", "value": "2"}]
    }))
    .unwrap();
    let tag = experiment.tags().get("b").unwrap();
    assert!(tag.matches_value(&json!({"value": "2", "key": "b"})));
    assert!(tag.matches_value(&json!(["b", "2"])));
    assert!(experiment.tags().get("c").is_none());
}
