//! JSON request bodies

use serde::Serialize;

use crate::entity::{serialize_float, Metric, Param, RunStatus, RunViewType, Tag};

#[allow(clippy::trivially_copy_pass_by_ref)]
fn no_items(items: &&[&str]) -> bool {
    items.is_empty()
}

#[derive(Debug, Serialize)]
pub(super) struct ExperimentId<'a> {
    pub experiment_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateExperiment<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_location: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Serialize)]
pub(super) struct RenameExperiment<'a> {
    pub experiment_id: &'a str,
    pub new_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ExperimentTag<'a> {
    pub experiment_id: &'a str,
    pub key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchExperiments<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a str>,
    pub view_type: RunViewType,
    #[serde(skip_serializing_if = "no_items")]
    pub order_by: &'a [&'a str],
}

#[derive(Debug, Serialize)]
pub(super) struct RunId<'a> {
    pub run_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateRun<'a> {
    pub experiment_id: &'a str,
    pub start_time: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(super) struct UpdateRun<'a> {
    pub run_id: &'a str,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

/// Body of `runs/log-parameter`, `runs/set-tag` and `runs/delete-tag`.
#[derive(Debug, Serialize)]
pub(super) struct RunKeyValue<'a> {
    pub run_id: &'a str,
    pub key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(super) struct LogMetric<'a> {
    pub run_id: &'a str,
    pub key: &'a str,
    #[serde(serialize_with = "serialize_float")]
    pub value: f64,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct LogBatch<'a> {
    pub run_id: &'a str,
    pub params: &'a [Param],
    pub metrics: &'a [Metric],
    pub tags: &'a [Tag],
}

#[derive(Debug, Serialize)]
pub(super) struct LogModel<'a> {
    pub run_id: &'a str,
    /// MLmodel document, serialized as a JSON string.
    pub model_json: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchRuns<'a> {
    pub experiment_ids: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a str>,
    pub run_view_type: RunViewType,
    #[serde(skip_serializing_if = "no_items")]
    pub order_by: &'a [&'a str],
}

#[derive(Debug, Serialize)]
pub(super) struct ModelName<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateModel<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(super) struct RenameModel<'a> {
    pub name: &'a str,
    pub new_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct UpdateModel<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ModelTag<'a> {
    pub name: &'a str,
    pub key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateModelVersion<'a> {
    pub name: &'a str,
    pub source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

/// Model version address; the server takes the version as a string.
#[derive(Debug, Serialize)]
pub(super) struct VersionRef<'a> {
    pub name: &'a str,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub(super) struct UpdateModelVersion<'a> {
    pub name: &'a str,
    pub version: String,
    pub description: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ModelVersionTag<'a> {
    pub name: &'a str,
    pub version: String,
    pub key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(super) struct TransitionStage<'a> {
    pub name: &'a str,
    pub version: String,
    pub stage: crate::entity::ModelVersionStage,
    pub archive_existing_versions: bool,
}
