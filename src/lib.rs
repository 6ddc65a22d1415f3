//! # mlflow-rest-client: Typed Client for MLflow-Compatible Tracking Servers
//!
//! **Version**: 0.1.0
//!
//! Covers the four resource families of the tracking API (experiments,
//! runs, registered models and model versions), turns the server's JSON
//! into typed entities, and exposes list/search endpoints as lazy,
//! restartable paginated sequences.
//!
//! ## Layers
//!
//! - **Value objects**: [`entity::Tag`], [`entity::Param`], [`entity::Metric`]
//!   with structural equality against tuples and mappings
//! - **Entities**: [`entity::Experiment`], [`entity::Run`], [`entity::Model`],
//!   [`entity::ModelVersion`], [`entity::Artifact`], built with `from_raw`
//! - **Pagination**: [`page::Paginated`], one blocking fetch per page boundary
//! - **Facade**: [`TrackingClient`], one method per REST operation, over a
//!   pluggable [`transport::Transport`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mlflow_rest_client::entity::{ModelVersionStage, RunViewType};
//! use mlflow_rest_client::{ClientConfig, TrackingClient};
//!
//! let client = TrackingClient::new(ClientConfig::new("http://localhost:5000")?)?;
//!
//! let experiment = client.get_or_create_experiment("churn", None)?;
//! let run = client.create_run(experiment.id(), None, [("team", "growth")], Some("baseline"))?;
//! client.log_run_parameter(run.id(), "alpha", "0.5")?;
//! client.log_run_metric(run.id(), "rmse", 0.27, Some(1), None)?;
//! client.finish_run(run.id(), None)?;
//!
//! for run in client.search_runs(&[experiment.id()], Some("metrics.rmse < 1"), RunViewType::ActiveOnly, &[]).iter() {
//!     println!("{}", run?.id());
//! }
//!
//! let model = client.get_model("churn")?;
//! if let Some(prod) = model.get_version_by_stage(ModelVersionStage::Production) {
//!     println!("serving {prod}");
//! }
//! # Ok::<(), mlflow_rest_client::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod page;
pub mod timestamp;
pub mod transport;

pub use client::{TrackingClient, NO_TAGS};
pub use config::{Auth, ClientConfig, ClientConfigBuilder};
pub use error::{Error, Result};
pub use page::{Page, Paginated};
