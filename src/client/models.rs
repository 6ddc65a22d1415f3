//! Registered model operations

use super::requests::{CreateModel, ModelName, ModelTag, RenameModel, UpdateModel};
use super::{collect_tags, parse_page, require_key, TrackingClient};
use crate::entity::{Model, ModelVersion, ModelVersionStage, WireEnum};
use crate::page::Paginated;
use crate::transport::ApiRequest;
use crate::Result;

impl TrackingClient {
    /// Register a new model name.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty tag key, or
    /// `Error::RemoteRequest` (e.g. `RESOURCE_ALREADY_EXISTS`).
    pub fn create_model<I, K, V>(&self, name: &str, tags: I, description: Option<&str>) -> Result<Model>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let body = CreateModel {
            name,
            tags: collect_tags(tags)?,
            description,
        };
        let response = self.post("registered-models/create", &body)?;
        self.entity(&response, "registered_model", Model::parse)
    }

    /// Model by name.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn get_model(&self, name: &str) -> Result<Model> {
        let response = self.get(&ApiRequest::get("registered-models/get").query("name", name))?;
        self.entity(&response, "registered_model", Model::parse)
    }

    /// Existing model named `name`, or a newly registered one.
    ///
    /// # Errors
    ///
    /// Returns any lookup or creation failure other than "not found".
    pub fn get_or_create_model<I, K, V>(&self, name: &str, tags: I) -> Result<Model>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        match self.get_model(name) {
            Ok(model) => Ok(model),
            Err(err) if err.is_not_found() => self.create_model(name, tags, None),
            Err(err) => Err(err),
        }
    }

    /// Rename a model.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn rename_model(&self, name: &str, new_name: &str) -> Result<Model> {
        let response = self.post("registered-models/rename", &RenameModel { name, new_name })?;
        self.entity(&response, "registered_model", Model::parse)
    }

    /// Replace a model's description.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn set_model_description(&self, name: &str, description: &str) -> Result<Model> {
        let response = self.patch("registered-models/update", &UpdateModel { name, description })?;
        self.entity(&response, "registered_model", Model::parse)
    }

    /// Delete a model and all its versions.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn delete_model(&self, name: &str) -> Result<()> {
        self.delete("registered-models/delete", &ModelName { name })
    }

    /// All registered models.
    #[must_use]
    pub fn list_models(&self) -> Paginated<Model> {
        self.paginate(ApiRequest::get("registered-models/list"), "registered_models", |_, item| {
            Model::parse(item)
        })
    }

    /// Eager [`TrackingClient::list_models`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Pagination` wrapping the first failed page.
    pub fn list_models_all(&self) -> Result<Vec<Model>> {
        self.list_models().collect_all()
    }

    /// Models matching a filter such as `name LIKE 'churn%'`.
    #[must_use]
    pub fn search_models(&self, filter: Option<&str>, order_by: &[&str]) -> Paginated<Model> {
        let request = order_by.iter().fold(
            ApiRequest::get("registered-models/search").query_opt("filter", filter),
            |request, order| request.query("order_by", *order),
        );
        self.paginate(request, "registered_models", |_, item| Model::parse(item))
    }

    /// Eager [`TrackingClient::search_models`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Pagination` wrapping the first failed page.
    pub fn search_models_all(&self, filter: Option<&str>, order_by: &[&str]) -> Result<Vec<Model>> {
        self.search_models(filter, order_by).collect_all()
    }

    /// Set (or overwrite) a model tag.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn set_model_tag(&self, name: &str, key: &str, value: &str) -> Result<()> {
        require_key(key)?;
        let body = ModelTag {
            name,
            key,
            value: Some(value),
        };
        self.post("registered-models/set-tag", &body).map(drop)
    }

    /// Remove a model tag.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn delete_model_tag(&self, name: &str, key: &str) -> Result<()> {
        require_key(key)?;
        let body = ModelTag { name, key, value: None };
        self.delete("registered-models/delete-tag", &body)
    }

    /// Newest version per stage, restricted to `stages` when non-empty.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn list_model_versions(&self, name: &str, stages: &[ModelVersionStage]) -> Result<Vec<ModelVersion>> {
        let request = stages.iter().fold(
            ApiRequest::get("registered-models/get-latest-versions").query("name", name),
            |request, stage| request.query("stages", stage.as_str()),
        );
        let response = self.get(&request)?;
        let page = parse_page(&response, "model_versions", self.config.enum_policy(), |_, item| {
            ModelVersion::parse(item)
        })?;
        Ok(page.items)
    }

    /// Every version of a model, restricted to `stages` when non-empty.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pagination` wrapping the first failed page.
    pub fn list_model_all_versions(&self, name: &str, stages: &[ModelVersionStage]) -> Result<Vec<ModelVersion>> {
        let filter = format!("name='{}'", name.replace('\'', "\\'"));
        let versions = self.search_model_versions(Some(&filter), &[]).collect_all()?;
        Ok(versions
            .into_iter()
            .filter(|version| stages.is_empty() || stages.iter().any(|stage| version.stage() == stage))
            .collect())
    }
}
