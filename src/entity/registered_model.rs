//! Registered model - named registry entry owning model versions

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::model_version::ModelVersion;
use super::raw::RawObject;
use super::stage::{EnumPolicy, ModelVersionStage};
use super::{parse_tags, KeyedList, Tag};
use crate::{Error, Result};

/// Registered model snapshot.
///
/// `latest_versions` holds at most the newest version per stage, as the
/// server reports it; the full history comes from the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    name: String,
    description: String,
    latest_versions: Vec<ModelVersion>,
    created_time: Option<DateTime<Utc>>,
    updated_time: Option<DateTime<Utc>>,
    tags: KeyedList<Tag>,
}

impl Model {
    /// Build a model from one server JSON object.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if `name` is missing or any embedded
    /// version is malformed.
    pub fn from_raw(raw: &Value) -> Result<Self> {
        Self::from_raw_with(raw, EnumPolicy::Strict)
    }

    /// Build a model under the given unknown-value policy.
    ///
    /// # Errors
    ///
    /// See [`Model::from_raw`].
    pub fn from_raw_with(raw: &Value, policy: EnumPolicy) -> Result<Self> {
        Self::parse(&RawObject::new("registered_model", raw, policy)?)
    }

    pub(crate) fn parse(raw: &RawObject<'_>) -> Result<Self> {
        let latest_versions = raw
            .list("latest_versions")?
            .into_iter()
            .map(|(context, item)| ModelVersion::parse(&RawObject::new(context, item, raw.policy())?))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: raw.required_str("name")?.to_string(),
            description: raw.str_or_default("description")?,
            latest_versions,
            created_time: raw.opt_time("creation_timestamp")?,
            updated_time: raw.opt_time("last_updated_timestamp")?,
            tags: parse_tags(raw, "tags")?,
        })
    }

    /// Unique model name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description, empty if unset.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Newest version per stage.
    #[must_use]
    pub fn latest_versions(&self) -> &[ModelVersion] {
        &self.latest_versions
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

    /// Tags.
    #[must_use]
    pub const fn tags(&self) -> &KeyedList<Tag> {
        &self.tags
    }

    /// Most recently created version in `stage`.
    ///
    /// Ties on creation time (or versions without one) fall back to the
    /// higher version number.
    #[must_use]
    pub fn get_version_by_stage(&self, stage: ModelVersionStage) -> Option<&ModelVersion> {
        self.latest_versions
            .iter()
            .filter(|version| *version.stage() == stage)
            .max_by_key(|version| (version.created_time(), version.version()))
    }
}

impl TryFrom<&Value> for Model {
    type Error = Error;

    fn try_from(raw: &Value) -> Result<Self> {
        Self::from_raw(raw)
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
