//! Experiment operations

use serde_json::Value;

use super::requests::{CreateExperiment, ExperimentId, ExperimentTag, RenameExperiment, SearchExperiments};
use super::{collect_tags, require_key, TrackingClient};
use crate::entity::{Experiment, RunViewType, WireEnum};
use crate::page::Paginated;
use crate::transport::ApiRequest;
use crate::{Error, Result};

impl TrackingClient {
    /// All experiments of the given view type.
    #[must_use]
    pub fn list_experiments(&self, view_type: RunViewType) -> Paginated<Experiment> {
        let request = ApiRequest::get("experiments/list").query("view_type", view_type.as_str());
        self.paginate(request, "experiments", |_, item| Experiment::parse(item))
    }

    /// Eager [`TrackingClient::list_experiments`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Pagination` wrapping the first failed page.
    pub fn list_experiments_all(&self, view_type: RunViewType) -> Result<Vec<Experiment>> {
        self.list_experiments(view_type).collect_all()
    }

    /// Experiments matching a filter such as `name LIKE 'churn%'`.
    #[must_use]
    pub fn search_experiments(
        &self,
        filter: Option<&str>,
        view_type: RunViewType,
        order_by: &[&str],
    ) -> Paginated<Experiment> {
        let body = SearchExperiments {
            filter,
            view_type,
            order_by,
        };
        self.paginate_post("experiments/search", &body, "experiments", |_, item| Experiment::parse(item))
    }

    /// Eager [`TrackingClient::search_experiments`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Pagination` wrapping the first failed page.
    pub fn search_experiments_all(
        &self,
        filter: Option<&str>,
        view_type: RunViewType,
        order_by: &[&str],
    ) -> Result<Vec<Experiment>> {
        self.search_experiments(filter, view_type, order_by).collect_all()
    }

    /// Experiment by id.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call, or
    /// `Error::Validation` for a malformed reply.
    pub fn get_experiment(&self, experiment_id: &str) -> Result<Experiment> {
        let response = self.get(&ApiRequest::get("experiments/get").query("experiment_id", experiment_id))?;
        self.entity(&response, "experiment", Experiment::parse)
    }

    /// Experiment by name; `None` if no such experiment exists.
    ///
    /// # Errors
    ///
    /// Returns any failure other than "not found".
    pub fn get_experiment_by_name(&self, name: &str) -> Result<Option<Experiment>> {
        let request = ApiRequest::get("experiments/get-by-name").query("experiment_name", name);
        match self.get(&request) {
            Ok(response) => self.entity(&response, "experiment", Experiment::parse).map(Some),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Id of the experiment named `name`, if it exists.
    ///
    /// # Errors
    ///
    /// See [`TrackingClient::get_experiment_by_name`].
    pub fn get_experiment_id(&self, name: &str) -> Result<Option<String>> {
        Ok(self.get_experiment_by_name(name)?.map(|experiment| experiment.id().to_string()))
    }

    /// Create an experiment and return the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty tag key, or
    /// `Error::RemoteRequest` (e.g. `RESOURCE_ALREADY_EXISTS`).
    pub fn create_experiment<I, K, V>(
        &self,
        name: &str,
        artifact_location: Option<&str>,
        tags: I,
    ) -> Result<Experiment>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let body = CreateExperiment {
            name,
            artifact_location,
            tags: collect_tags(tags)?,
        };
        let response = self.post("experiments/create", &body)?;
        let id = created_id(&response)?;
        tracing::debug!(experiment_id = %id, experiment = name, "created experiment");
        self.get_experiment(&id)
    }

    /// Existing experiment named `name`, or a newly created one.
    ///
    /// # Errors
    ///
    /// Returns any lookup or creation failure.
    pub fn get_or_create_experiment(&self, name: &str, artifact_location: Option<&str>) -> Result<Experiment> {
        match self.get_experiment_by_name(name)? {
            Some(experiment) => Ok(experiment),
            None => self.create_experiment(name, artifact_location, super::NO_TAGS),
        }
    }

    /// Rename an experiment.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn rename_experiment(&self, experiment_id: &str, new_name: &str) -> Result<()> {
        let body = RenameExperiment {
            experiment_id,
            new_name,
        };
        self.post("experiments/update", &body).map(drop)
    }

    /// Soft-delete an experiment.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn delete_experiment(&self, experiment_id: &str) -> Result<()> {
        self.post("experiments/delete", &ExperimentId { experiment_id }).map(drop)
    }

    /// Restore a soft-deleted experiment.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn restore_experiment(&self, experiment_id: &str) -> Result<()> {
        self.post("experiments/restore", &ExperimentId { experiment_id }).map(drop)
    }

    /// Set (or overwrite) an experiment tag.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn set_experiment_tag(&self, experiment_id: &str, key: &str, value: &str) -> Result<()> {
        require_key(key)?;
        let body = ExperimentTag {
            experiment_id,
            key,
            value: Some(value),
        };
        self.post("experiments/set-experiment-tag", &body).map(drop)
    }

    /// Remove an experiment tag.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn delete_experiment_tag(&self, experiment_id: &str, key: &str) -> Result<()> {
        require_key(key)?;
        let body = ExperimentTag {
            experiment_id,
            key,
            value: None,
        };
        self.post("experiments/delete-experiment-tag", &body).map(drop)
    }
}

/// `experiment_id` of a create reply, string or integer.
fn created_id(response: &Value) -> Result<String> {
    match super::leaf(response, "experiment_id")? {
        Value::String(id) if !id.is_empty() => Ok(id.clone()),
        Value::Number(id) => Ok(id.to_string()),
        _ => Err(Error::validation("response.experiment_id", "expected a non-empty id")),
    }
}
