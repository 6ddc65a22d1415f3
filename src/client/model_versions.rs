//! Model version operations and stage transitions

use super::requests::{CreateModelVersion, ModelVersionTag, TransitionStage, UpdateModelVersion, VersionRef};
use super::{collect_tags, leaf, normalize_run_id, require_key, TrackingClient};
use crate::entity::{ModelVersion, ModelVersionStage};
use crate::page::Paginated;
use crate::transport::ApiRequest;
use crate::{Error, Result};

impl TrackingClient {
    /// Register a new version of model `name` from an artifact `source`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty tag key or run id, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn create_model_version<I, K, V>(
        &self,
        name: &str,
        source: &str,
        run_id: Option<&str>,
        tags: I,
        description: Option<&str>,
    ) -> Result<ModelVersion>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let body = CreateModelVersion {
            name,
            source,
            run_id: run_id.map(normalize_run_id).transpose()?,
            tags: collect_tags(tags)?,
            description,
        };
        let response = self.post("model-versions/create", &body)?;
        let version = self.entity(&response, "model_version", ModelVersion::parse)?;
        tracing::debug!(model = name, version = version.version(), "created model version");
        Ok(version)
    }

    /// One version of a model.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn get_model_version(&self, name: &str, version: u64) -> Result<ModelVersion> {
        let request = ApiRequest::get("model-versions/get")
            .query("name", name)
            .query("version", version.to_string());
        let response = self.get(&request)?;
        self.entity(&response, "model_version", ModelVersion::parse)
    }

    /// Replace a version's description.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn set_model_version_description(&self, name: &str, version: u64, description: &str) -> Result<ModelVersion> {
        let body = UpdateModelVersion {
            name,
            version: version.to_string(),
            description,
        };
        let response = self.patch("model-versions/update", &body)?;
        self.entity(&response, "model_version", ModelVersion::parse)
    }

    /// Set (or overwrite) a version tag.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn set_model_version_tag(&self, name: &str, version: u64, key: &str, value: &str) -> Result<()> {
        require_key(key)?;
        let body = ModelVersionTag {
            name,
            version: version.to_string(),
            key,
            value: Some(value),
        };
        self.post("model-versions/set-tag", &body).map(drop)
    }

    /// Remove a version tag.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn delete_model_version_tag(&self, name: &str, version: u64, key: &str) -> Result<()> {
        require_key(key)?;
        let body = ModelVersionTag {
            name,
            version: version.to_string(),
            key,
            value: None,
        };
        self.delete("model-versions/delete-tag", &body)
    }

    /// Delete one version.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn delete_model_version(&self, name: &str, version: u64) -> Result<()> {
        let body = VersionRef {
            name,
            version: version.to_string(),
        };
        self.delete("model-versions/delete", &body)
    }

    /// Versions matching a filter such as `name='churn'` or
    /// `run_id='...'`.
    #[must_use]
    pub fn search_model_versions(&self, filter: Option<&str>, order_by: &[&str]) -> Paginated<ModelVersion> {
        let request = order_by.iter().fold(
            ApiRequest::get("model-versions/search").query_opt("filter", filter),
            |request, order| request.query("order_by", *order),
        );
        self.paginate(request, "model_versions", |_, item| ModelVersion::parse(item))
    }

    /// Eager [`TrackingClient::search_model_versions`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Pagination` wrapping the first failed page.
    pub fn search_model_versions_all(&self, filter: Option<&str>, order_by: &[&str]) -> Result<Vec<ModelVersion>> {
        self.search_model_versions(filter, order_by).collect_all()
    }

    /// URI the version's artifacts can be downloaded from.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call, or
    /// `Error::Validation` if the reply carries no URI.
    pub fn get_model_version_download_uri(&self, name: &str, version: u64) -> Result<String> {
        let request = ApiRequest::get("model-versions/get-download-uri")
            .query("name", name)
            .query("version", version.to_string());
        let response = self.get(&request)?;
        leaf(&response, "artifact_uri")?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::validation("response.artifact_uri", "expected a string"))
    }

    /// Move a version to `stage`. With `archive_existing`, the server
    /// archives the versions currently in that stage.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn transition_model_version_stage(
        &self,
        name: &str,
        version: u64,
        stage: ModelVersionStage,
        archive_existing: bool,
    ) -> Result<ModelVersion> {
        let body = TransitionStage {
            name,
            version: version.to_string(),
            stage,
            archive_existing_versions: archive_existing,
        };
        tracing::debug!(model = name, version, stage = %stage, archive_existing, "transitioning model version");
        let response = self.post("model-versions/transition-stage", &body)?;
        self.entity(&response, "model_version", ModelVersion::parse)
    }

    /// Move a version to Staging.
    ///
    /// # Errors
    ///
    /// See [`TrackingClient::transition_model_version_stage`].
    pub fn test_model_version(&self, name: &str, version: u64) -> Result<ModelVersion> {
        self.transition_model_version_stage(name, version, ModelVersionStage::Staging, false)
    }

    /// Move a version to Production, archiving the previous Production
    /// version.
    ///
    /// # Errors
    ///
    /// See [`TrackingClient::transition_model_version_stage`].
    pub fn promote_model_version(&self, name: &str, version: u64) -> Result<ModelVersion> {
        self.transition_model_version_stage(name, version, ModelVersionStage::Production, true)
    }

    /// Move a version to Archived.
    ///
    /// # Errors
    ///
    /// See [`TrackingClient::transition_model_version_stage`].
    pub fn archive_model_version(&self, name: &str, version: u64) -> Result<ModelVersion> {
        self.transition_model_version_stage(name, version, ModelVersionStage::Archived, false)
    }
}
