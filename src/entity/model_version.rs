//! Model version - one numbered registration of a model artifact

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::raw::RawObject;
use super::stage::{EnumPolicy, Lenient, ModelVersionStage, ModelVersionState, ModelVersionStatus};
use super::{parse_tags, KeyedList, Tag};
use crate::{Error, Result};

/// Model version snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelVersion {
    name: String,
    version: u64,
    created_time: Option<DateTime<Utc>>,
    updated_time: Option<DateTime<Utc>>,
    stage: Lenient<ModelVersionStage>,
    description: String,
    source: String,
    run_id: Option<String>,
    state: ModelVersionState,
    tags: KeyedList<Tag>,
}

impl ModelVersion {
    /// Build a model version from one server JSON object.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if `name` or `version` is missing or
    /// malformed, or `Error::UnknownEnumValue` for an unknown stage or
    /// status under the strict policy.
    pub fn from_raw(raw: &Value) -> Result<Self> {
        Self::from_raw_with(raw, EnumPolicy::Strict)
    }

    /// Build a model version under the given unknown-value policy.
    ///
    /// # Errors
    ///
    /// See [`ModelVersion::from_raw`].
    pub fn from_raw_with(raw: &Value, policy: EnumPolicy) -> Result<Self> {
        Self::parse(&RawObject::new("model_version", raw, policy)?)
    }

    pub(crate) fn parse(raw: &RawObject<'_>) -> Result<Self> {
        let version = raw.required_i64("version")?;
        let version = u64::try_from(version)
            .map_err(|_| Error::validation(raw.path("version"), format!("{version} is negative")))?;

        let status = match raw.first_of(&["status", "state"]) {
            Some((field, _)) => raw.wire_enum(field, ModelVersionStatus::PendingRegistration)?,
            None => Lenient::Known(ModelVersionStatus::PendingRegistration),
        };
        let message = match raw.first_of(&["status_message", "state_message"]) {
            Some((field, _)) => raw.opt_str(field)?.map(str::to_string),
            None => None,
        };

        Ok(Self {
            name: raw.required_str("name")?.to_string(),
            version,
            created_time: raw.opt_time("creation_timestamp")?,
            updated_time: raw.opt_time("last_updated_timestamp")?,
            stage: raw.wire_enum("current_stage", ModelVersionStage::None)?,
            description: raw.str_or_default("description")?,
            source: raw.str_or_default("source")?,
            run_id: raw.opt_str("run_id")?.filter(|id| !id.is_empty()).map(str::to_string),
            state: ModelVersionState::new(status, message),
            tags: parse_tags(raw, "tags")?,
        })
    }

    /// Registered model name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version number, starting at 1.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Registration time.
    #[must_use]
    pub const fn created_time(&self) -> Option<DateTime<Utc>> {
        self.created_time
    }

    /// Last modification time.
    #[must_use]
    pub const fn updated_time(&self) -> Option<DateTime<Utc>> {
        self.updated_time
    }

    /// Registry stage.
    #[must_use]
    pub const fn stage(&self) -> &Lenient<ModelVersionStage> {
        &self.stage
    }

    /// Description, empty if unset.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Artifact source URI.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Run that produced the artifact.
    #[must_use]
    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    /// Registration status and message.
    #[must_use]
    pub const fn state(&self) -> &ModelVersionState {
        &self.state
    }

    /// True once registration finished.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.state.status() == ModelVersionStatus::Ready
    }

    /// Tags.
    #[must_use]
    pub const fn tags(&self) -> &KeyedList<Tag> {
        &self.tags
    }
}

impl TryFrom<&Value> for ModelVersion {
    type Error = Error;

    fn try_from(raw: &Value) -> Result<Self> {
        Self::from_raw(raw)
    }
}

impl std::fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}
