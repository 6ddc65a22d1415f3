//! Run operations: lifecycle, logging, history and search

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::requests::{CreateRun, LogBatch, LogMetric, LogModel, RunId, RunKeyValue, SearchRuns, UpdateRun};
use super::{collect_tags, failed, normalize_run_id, require_key, TrackingClient};
use crate::entity::{Artifact, Metric, Param, Run, RunInfo, RunStatus, RunViewType, Tag};
use crate::page::Paginated;
use crate::timestamp::{now_millis, to_millis};
use crate::transport::ApiRequest;
use crate::Result;

impl TrackingClient {
    /// Run by id.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty id, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn get_run(&self, run_id: &str) -> Result<Run> {
        let run_id = normalize_run_id(run_id)?;
        let response = self.get(&ApiRequest::get("runs/get").query("run_id", run_id))?;
        self.entity(&response, "run", Run::parse)
    }

    /// Start a run under an experiment. `start_time` defaults to now.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty tag key, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn create_run<I, K, V>(
        &self,
        experiment_id: &str,
        start_time: Option<DateTime<Utc>>,
        tags: I,
        run_name: Option<&str>,
    ) -> Result<Run>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let body = CreateRun {
            experiment_id,
            start_time: start_time.map_or_else(now_millis, to_millis),
            tags: collect_tags(tags)?,
            run_name,
        };
        let response = self.post("runs/create", &body)?;
        let run = self.entity(&response, "run", Run::parse)?;
        tracing::debug!(run_id = run.id(), experiment_id, "created run");
        Ok(run)
    }

    /// Update a run's status and, optionally, its end time.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn set_run_status(
        &self,
        run_id: &str,
        status: RunStatus,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<RunInfo> {
        let run_id = normalize_run_id(run_id)?;
        let body = UpdateRun {
            run_id: &run_id,
            status,
            end_time: end_time.map(to_millis),
        };
        let response = self.post("runs/update", &body)?;
        self.entity(&response, "run_info", RunInfo::parse)
    }

    fn finish_with(&self, run_id: &str, status: RunStatus, end_time: Option<DateTime<Utc>>) -> Result<RunInfo> {
        let end_time = end_time.unwrap_or_else(Utc::now);
        self.set_run_status(run_id, status, Some(end_time))
    }

    /// Mark a run Running.
    ///
    /// # Errors
    ///
    /// See [`TrackingClient::set_run_status`].
    pub fn start_run(&self, run_id: &str) -> Result<RunInfo> {
        self.set_run_status(run_id, RunStatus::Running, None)
    }

    /// Mark a run Scheduled.
    ///
    /// # Errors
    ///
    /// See [`TrackingClient::set_run_status`].
    pub fn schedule_run(&self, run_id: &str) -> Result<RunInfo> {
        self.set_run_status(run_id, RunStatus::Scheduled, None)
    }

    /// Mark a run Finished; `end_time` defaults to now.
    ///
    /// # Errors
    ///
    /// See [`TrackingClient::set_run_status`].
    pub fn finish_run(&self, run_id: &str, end_time: Option<DateTime<Utc>>) -> Result<RunInfo> {
        self.finish_with(run_id, RunStatus::Finished, end_time)
    }

    /// Mark a run Failed; `end_time` defaults to now.
    ///
    /// # Errors
    ///
    /// See [`TrackingClient::set_run_status`].
    pub fn fail_run(&self, run_id: &str, end_time: Option<DateTime<Utc>>) -> Result<RunInfo> {
        self.finish_with(run_id, RunStatus::Failed, end_time)
    }

    /// Mark a run Killed; `end_time` defaults to now.
    ///
    /// # Errors
    ///
    /// See [`TrackingClient::set_run_status`].
    pub fn kill_run(&self, run_id: &str, end_time: Option<DateTime<Utc>>) -> Result<RunInfo> {
        self.finish_with(run_id, RunStatus::Killed, end_time)
    }

    /// Soft-delete a run.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn delete_run(&self, run_id: &str) -> Result<()> {
        let run_id = normalize_run_id(run_id)?;
        self.post("runs/delete", &RunId { run_id: &run_id }).map(drop)
    }

    /// Restore a soft-deleted run.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn restore_run(&self, run_id: &str) -> Result<()> {
        let run_id = normalize_run_id(run_id)?;
        self.post("runs/restore", &RunId { run_id: &run_id }).map(drop)
    }

    /// Log one param. Logging a different value for an existing key is
    /// rejected by the server.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn log_run_parameter(&self, run_id: &str, key: &str, value: &str) -> Result<()> {
        require_key(key)?;
        let run_id = normalize_run_id(run_id)?;
        let body = RunKeyValue {
            run_id: &run_id,
            key,
            value: Some(value),
        };
        self.post("runs/log-parameter", &body).map(drop)
    }

    /// Log several params in one batch request.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn log_run_parameters<I, K, V>(&self, run_id: &str, params: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let params = params
            .into_iter()
            .map(|(key, value)| Param::new(key, value))
            .collect::<Result<Vec<_>>>()?;
        self.log_run_batch(run_id, &params, &[], &[])
    }

    /// Log one metric observation. `timestamp` defaults to now.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn log_run_metric(
        &self,
        run_id: &str,
        key: &str,
        value: f64,
        step: Option<i64>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<()> {
        require_key(key)?;
        let run_id = normalize_run_id(run_id)?;
        let body = LogMetric {
            run_id: &run_id,
            key,
            value,
            timestamp: timestamp.map_or_else(now_millis, to_millis),
            step,
        };
        self.post("runs/log-metric", &body).map(drop)
    }

    /// Log several metric observations in one batch request.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn log_run_metrics(&self, run_id: &str, metrics: impl IntoIterator<Item = Metric>) -> Result<()> {
        let metrics: Vec<Metric> = metrics.into_iter().collect();
        self.log_run_batch(run_id, &[], &metrics, &[])
    }

    /// Log params, metrics and tags in one request.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn log_run_batch(&self, run_id: &str, params: &[Param], metrics: &[Metric], tags: &[Tag]) -> Result<()> {
        let run_id = normalize_run_id(run_id)?;
        let body = LogBatch {
            run_id: &run_id,
            params,
            metrics,
            tags,
        };
        tracing::debug!(
            run_id = %run_id,
            params = params.len(),
            metrics = metrics.len(),
            tags = tags.len(),
            "logging batch"
        );
        self.post("runs/log-batch", &body).map(drop)
    }

    /// Attach an MLmodel description to a run.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteRequest` if the server rejects the call.
    pub fn log_run_model(&self, run_id: &str, model_json: &Value) -> Result<()> {
        let run_id = normalize_run_id(run_id)?;
        let body = LogModel {
            run_id: &run_id,
            model_json: model_json.to_string(),
        };
        self.post("runs/log-model", &body).map(drop)
    }

    /// Set (or overwrite) a run tag.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn set_run_tag(&self, run_id: &str, key: &str, value: &str) -> Result<()> {
        require_key(key)?;
        let run_id = normalize_run_id(run_id)?;
        let body = RunKeyValue {
            run_id: &run_id,
            key,
            value: Some(value),
        };
        self.post("runs/set-tag", &body).map(drop)
    }

    /// Set several run tags in one batch request.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn set_run_tags<I, K, V>(&self, run_id: &str, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let tags = collect_tags(tags)?;
        self.log_run_batch(run_id, &[], &[], &tags)
    }

    /// Remove a run tag.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key, or
    /// `Error::RemoteRequest` if the server rejects the call.
    pub fn delete_run_tag(&self, run_id: &str, key: &str) -> Result<()> {
        require_key(key)?;
        let run_id = normalize_run_id(run_id)?;
        let body = RunKeyValue {
            run_id: &run_id,
            key,
            value: None,
        };
        self.post("runs/delete-tag", &body).map(drop)
    }

    /// Remove several run tags, one request each, stopping at the first
    /// failure.
    ///
    /// # Errors
    ///
    /// See [`TrackingClient::delete_run_tag`].
    pub fn delete_run_tags<'k>(&self, run_id: &str, keys: impl IntoIterator<Item = &'k str>) -> Result<()> {
        keys.into_iter().try_for_each(|key| self.delete_run_tag(run_id, key))
    }

    /// Every logged value of one metric.
    #[must_use]
    pub fn list_run_metric_history(&self, run_id: &str, key: &str) -> Paginated<Metric> {
        let run_id = match normalize_run_id(run_id) {
            Ok(run_id) => run_id,
            Err(err) => return failed(&err),
        };
        let request = ApiRequest::get("metrics/get-history")
            .query("run_id", run_id)
            .query("metric_key", key);
        self.paginate(request, "metrics", |_, item| Metric::parse_object(item))
    }

    /// Eager [`TrackingClient::list_run_metric_history`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Pagination` wrapping the first failed page.
    pub fn list_run_metric_history_all(&self, run_id: &str, key: &str) -> Result<Vec<Metric>> {
        self.list_run_metric_history(run_id, key).collect_all()
    }

    /// Artifacts directly under `path` (the run's artifact root when
    /// `None`).
    #[must_use]
    pub fn list_run_artifacts(&self, run_id: &str, path: Option<&str>) -> Paginated<Artifact> {
        let run_id = match normalize_run_id(run_id) {
            Ok(run_id) => run_id,
            Err(err) => return failed(&err),
        };
        let request = ApiRequest::get("artifacts/list")
            .query("run_id", run_id)
            .query_opt("path", path);
        self.paginate(request, "files", |page, item| {
            Artifact::parse(item, page.opt_str("root_uri")?)
        })
    }

    /// Eager [`TrackingClient::list_run_artifacts`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Pagination` wrapping the first failed page.
    pub fn list_run_artifacts_all(&self, run_id: &str, path: Option<&str>) -> Result<Vec<Artifact>> {
        self.list_run_artifacts(run_id, path).collect_all()
    }

    /// Runs across experiments matching a filter such as
    /// `metrics.rmse < 1 and params.model = 'lr'`.
    #[must_use]
    pub fn search_runs(
        &self,
        experiment_ids: &[&str],
        filter: Option<&str>,
        view_type: RunViewType,
        order_by: &[&str],
    ) -> Paginated<Run> {
        let body = SearchRuns {
            experiment_ids,
            filter,
            run_view_type: view_type,
            order_by,
        };
        self.paginate_post("runs/search", &body, "runs", |_, item| Run::parse(item))
    }

    /// Eager [`TrackingClient::search_runs`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Pagination` wrapping the first failed page.
    pub fn search_runs_all(
        &self,
        experiment_ids: &[&str],
        filter: Option<&str>,
        view_type: RunViewType,
        order_by: &[&str],
    ) -> Result<Vec<Run>> {
        self.search_runs(experiment_ids, filter, view_type, order_by).collect_all()
    }

    /// Active runs of one experiment.
    #[must_use]
    pub fn list_experiment_runs(&self, experiment_id: &str) -> Paginated<Run> {
        self.search_runs(&[experiment_id], None, RunViewType::ActiveOnly, &[])
    }

    /// Eager [`TrackingClient::list_experiment_runs`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Pagination` wrapping the first failed page.
    pub fn list_experiment_runs_all(&self, experiment_id: &str) -> Result<Vec<Run>> {
        self.list_experiment_runs(experiment_id).collect_all()
    }
}
