//! Experiment - named container grouping related runs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::raw::RawObject;
use super::stage::{EnumPolicy, ExperimentStage, Lenient};
use super::{parse_tags, KeyedList, Tag};
use crate::{Error, Result};

/// Experiment snapshot as reported by the server.
///
/// The id and artifact location are fixed at creation; the name, stage and
/// tags change only through client calls, after which a fresh snapshot is
/// fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experiment {
    id: String,
    name: String,
    artifact_location: String,
    stage: Lenient<ExperimentStage>,
    tags: KeyedList<Tag>,
    creation_time: Option<DateTime<Utc>>,
    last_update_time: Option<DateTime<Utc>>,
}

impl Experiment {
    /// Build an experiment from one server JSON object, rejecting unknown
    /// lifecycle stages.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if `experiment_id` or `name` is missing,
    /// or `Error::UnknownEnumValue` for an unrecognized stage.
    pub fn from_raw(raw: &Value) -> Result<Self> {
        Self::from_raw_with(raw, EnumPolicy::Strict)
    }

    /// Build an experiment under the given unknown-stage policy.
    ///
    /// # Errors
    ///
    /// See [`Experiment::from_raw`].
    pub fn from_raw_with(raw: &Value, policy: EnumPolicy) -> Result<Self> {
        Self::parse(&RawObject::new("experiment", raw, policy)?)
    }

    pub(crate) fn parse(raw: &RawObject<'_>) -> Result<Self> {
        let id = match raw.first_of(&["experiment_id", "id"]) {
            Some((field, _)) => raw.opt_id(field)?.unwrap_or_default(),
            None => String::new(),
        };
        if id.is_empty() {
            return Err(Error::validation(raw.path("experiment_id"), "missing required field"));
        }

        Ok(Self {
            id,
            name: raw.required_str("name")?.to_string(),
            artifact_location: raw.str_or_default("artifact_location")?,
            stage: raw.wire_enum("lifecycle_stage", ExperimentStage::Active)?,
            tags: parse_tags(raw, "tags")?,
            creation_time: raw.opt_time("creation_time")?,
            last_update_time: raw.opt_time("last_update_time")?,
        })
    }

    /// Server-assigned id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name, unique among non-deleted experiments.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root URI for run artifacts.
    #[must_use]
    pub fn artifact_location(&self) -> &str {
        &self.artifact_location
    }

    /// Lifecycle stage.
    #[must_use]
    pub const fn stage(&self) -> &Lenient<ExperimentStage> {
        &self.stage
    }

    /// True unless soft-deleted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.stage == ExperimentStage::Active
    }

    /// Tags in server order.
    #[must_use]
    pub const fn tags(&self) -> &KeyedList<Tag> {
        &self.tags
    }

    /// Creation time, if the server reports it.
    #[must_use]
    pub const fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.creation_time
    }

    /// Last modification time, if the server reports it.
    #[must_use]
    pub const fn last_update_time(&self) -> Option<DateTime<Utc>> {
        self.last_update_time
    }
}

impl TryFrom<&Value> for Experiment {
    type Error = Error;

    fn try_from(raw: &Value) -> Result<Self> {
        Self::from_raw(raw)
    }
}

impl std::fmt::Display for Experiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_experiment_from_raw() {
        let raw = json!({
            "experiment_id": "42",
            "name": "churn",
            "artifact_location": "s3://bucket/42",
            "lifecycle_stage": "active",
            "creation_time": 1_700_000_000_000_i64,
            "tags": [{"key": "team", "value": "growth"}]
        });
        let experiment = Experiment::from_raw(&raw).unwrap();

        assert_eq!(experiment.id(), "42");
        assert_eq!(experiment.name(), "churn");
        assert_eq!(experiment.artifact_location(), "s3://bucket/42");
        assert!(experiment.is_active());
        assert_eq!(experiment.tags().get("team").unwrap().value(), "growth");
        assert!(experiment.creation_time().is_some());
        assert!(experiment.last_update_time().is_none());
    }

    #[test]
    fn test_experiment_numeric_id() {
        let experiment = Experiment::from_raw(&json!({"experiment_id": 7, "name": "n"})).unwrap();
        assert_eq!(experiment.id(), "7");
        assert_eq!(*experiment.stage(), ExperimentStage::Active);
    }

    #[test]
    fn test_experiment_requires_id_and_name() {
        assert!(matches!(
            Experiment::from_raw(&json!({"name": "n"})),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            Experiment::from_raw(&json!({"experiment_id": "1"})),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_experiment_unknown_stage_policy() {
        let raw = json!({"experiment_id": "1", "name": "n", "lifecycle_stage": "frozen"});
        assert!(matches!(
            Experiment::from_raw(&raw),
            Err(Error::UnknownEnumValue { .. })
        ));
        let lenient = Experiment::from_raw_with(&raw, EnumPolicy::Lenient).unwrap();
        assert_eq!(lenient.stage().as_str(), "frozen");
        assert!(!lenient.is_active());
    }
}
