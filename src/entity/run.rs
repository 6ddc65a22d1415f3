//! Run - one execution record under an experiment

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::raw::RawObject;
use super::stage::{EnumPolicy, Lenient, RunStage, RunStatus};
use super::{parse_keyed, parse_tags, KeyedList, Metric, Param, Tag};
use crate::{Error, Result};

/// Server-controlled run metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunInfo {
    run_id: String,
    run_name: Option<String>,
    experiment_id: Option<String>,
    user_id: Option<String>,
    status: Lenient<RunStatus>,
    stage: Lenient<RunStage>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    artifact_uri: String,
}

impl RunInfo {
    /// Build run info from the server's `run_info` / `run.info` object.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if no run id is present, or
    /// `Error::UnknownEnumValue` under the strict policy.
    pub fn from_raw(raw: &Value) -> Result<Self> {
        Self::from_raw_with(raw, EnumPolicy::Strict)
    }

    /// Build run info under the given unknown-status policy.
    ///
    /// # Errors
    ///
    /// See [`RunInfo::from_raw`].
    pub fn from_raw_with(raw: &Value, policy: EnumPolicy) -> Result<Self> {
        Self::parse(&RawObject::new("run_info", raw, policy)?)
    }

    pub(crate) fn parse(raw: &RawObject<'_>) -> Result<Self> {
        // Older servers only send run_uuid.
        let run_id = match raw.first_of(&["run_id", "run_uuid", "id"]) {
            Some((field, _)) => raw.required_str(field)?.to_string(),
            None => return Err(Error::validation(raw.path("run_id"), "missing required field")),
        };

        Ok(Self {
            run_id,
            run_name: raw.opt_str("run_name")?.map(str::to_string),
            experiment_id: raw.opt_id("experiment_id")?,
            user_id: raw.opt_str("user_id")?.map(str::to_string),
            status: raw.wire_enum("status", RunStatus::Running)?,
            stage: raw.wire_enum("lifecycle_stage", RunStage::Active)?,
            start_time: raw.opt_time("start_time")?,
            end_time: raw.opt_time("end_time")?,
            artifact_uri: raw.str_or_default("artifact_uri")?,
        })
    }

    /// Run id (32-char hex on MLflow servers).
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Display name, if set.
    #[must_use]
    pub fn run_name(&self) -> Option<&str> {
        self.run_name.as_deref()
    }

    /// Parent experiment id.
    #[must_use]
    pub fn experiment_id(&self) -> Option<&str> {
        self.experiment_id.as_deref()
    }

    /// User that created the run.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Execution status.
    #[must_use]
    pub const fn status(&self) -> &Lenient<RunStatus> {
        &self.status
    }

    /// Lifecycle stage.
    #[must_use]
    pub const fn stage(&self) -> &Lenient<RunStage> {
        &self.stage
    }

    /// Start timestamp.
    #[must_use]
    pub const fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// End timestamp, once terminal.
    #[must_use]
    pub const fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Artifact root URI.
    #[must_use]
    pub fn artifact_uri(&self) -> &str {
        &self.artifact_uri
    }

    /// True once the status is Finished, Failed or Killed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.known().is_some_and(RunStatus::is_terminal)
    }
}

/// Logged run content.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunData {
    params: KeyedList<Param>,
    metrics: KeyedList<Metric>,
    tags: KeyedList<Tag>,
}

impl RunData {
    pub(crate) fn parse(raw: &RawObject<'_>) -> Result<Self> {
        Ok(Self {
            params: parse_keyed(raw, "params", Param::parse)?,
            metrics: parse_keyed(raw, "metrics", Metric::parse)?,
            tags: parse_tags(raw, "tags")?,
        })
    }

    /// Params (write-once per key).
    #[must_use]
    pub const fn params(&self) -> &KeyedList<Param> {
        &self.params
    }

    /// Latest value per metric key.
    #[must_use]
    pub const fn metrics(&self) -> &KeyedList<Metric> {
        &self.metrics
    }

    /// Tags.
    #[must_use]
    pub const fn tags(&self) -> &KeyedList<Tag> {
        &self.tags
    }

    /// Param by key.
    #[must_use]
    pub fn get_param(&self, key: &str) -> Option<&Param> {
        self.params.get(key)
    }

    /// Latest metric by key.
    #[must_use]
    pub fn get_metric(&self, key: &str) -> Option<&Metric> {
        self.metrics.get(key)
    }

    /// Tag by key.
    #[must_use]
    pub fn get_tag(&self, key: &str) -> Option<&Tag> {
        self.tags.get(key)
    }
}

/// Run snapshot: metadata plus logged data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    info: RunInfo,
    data: RunData,
}

impl Run {
    /// Build a run from the server's `{"info": .., "data": ..}` object.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if `info` or `info.run_id` is missing,
    /// or any logged item is malformed.
    pub fn from_raw(raw: &Value) -> Result<Self> {
        Self::from_raw_with(raw, EnumPolicy::Strict)
    }

    /// Build a run under the given unknown-status policy.
    ///
    /// # Errors
    ///
    /// See [`Run::from_raw`].
    pub fn from_raw_with(raw: &Value, policy: EnumPolicy) -> Result<Self> {
        Self::parse(&RawObject::new("run", raw, policy)?)
    }

    pub(crate) fn parse(raw: &RawObject<'_>) -> Result<Self> {
        let info = RunInfo::parse(&raw.child("info")?)?;
        let data = match raw.opt_child("data")? {
            Some(data) => RunData::parse(&data)?,
            None => RunData::default(),
        };
        Ok(Self { info, data })
    }

    /// Run id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.info.run_id()
    }

    /// Metadata.
    #[must_use]
    pub const fn info(&self) -> &RunInfo {
        &self.info
    }

    /// Logged data.
    #[must_use]
    pub const fn data(&self) -> &RunData {
        &self.data
    }
}

impl TryFrom<&Value> for Run {
    type Error = Error;

    fn try_from(raw: &Value) -> Result<Self> {
        Self::from_raw(raw)
    }
}

impl std::fmt::Display for Run {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "info": {
                "run_id": "a1b2c3",
                "experiment_id": "3",
                "status": "FINISHED",
                "lifecycle_stage": "active",
                "start_time": "1700000000000",
                "end_time": 1_700_000_100_000_i64,
                "artifact_uri": "mlflow-artifacts:/3/a1b2c3/artifacts"
            },
            "data": {
                "params": [{"key": "lr", "value": "0.01"}],
                "metrics": [{"key": "loss", "value": 0.2, "timestamp": 1_700_000_050_000_i64, "step": 9}],
                "tags": [{"key": "mlflow.user", "value": "ana"}]
            }
        })
    }

    #[test]
    fn test_run_from_raw() {
        let run = Run::from_raw(&sample()).unwrap();
        assert_eq!(run.id(), "a1b2c3");
        assert_eq!(run.info().experiment_id(), Some("3"));
        assert_eq!(*run.info().status(), RunStatus::Finished);
        assert!(run.info().is_terminal());
        assert!(run.info().end_time().unwrap() > run.info().start_time().unwrap());
        assert_eq!(run.data().get_param("lr").unwrap(), &("lr", "0.01"));
        assert_eq!(run.data().get_metric("loss").unwrap().step(), Some(9));
        assert_eq!(run.data().get_tag("mlflow.user").unwrap().value(), "ana");
        assert!(run.data().get_param("missing").is_none());
    }

    #[test]
    fn test_run_uuid_fallback() {
        let run = Run::from_raw(&json!({"info": {"run_uuid": "legacy"}})).unwrap();
        assert_eq!(run.id(), "legacy");
        assert_eq!(*run.info().status(), RunStatus::Running);
        assert!(run.data().params().is_empty());
    }

    #[test]
    fn test_run_requires_info_run_id() {
        let err = Run::from_raw(&json!({"info": {"experiment_id": "1"}})).unwrap_err();
        assert!(matches!(err, Error::Validation { ref context, .. } if context == "run.info.run_id"));
        assert!(Run::from_raw(&json!({"data": {}})).is_err());
    }

    #[test]
    fn test_run_bad_metric_is_validation_error() {
        let raw = json!({
            "info": {"run_id": "r"},
            "data": {"metrics": [{"key": "loss", "value": "x", "timestamp": 1}]}
        });
        let err = Run::from_raw(&raw).unwrap_err();
        assert!(matches!(err, Error::Validation { ref context, .. } if context.starts_with("run.data.metrics[0]")));
    }
}
