//! Typed domain objects built from server JSON
//!
//! Entities are plain snapshots: they are constructed from a raw JSON
//! object with `from_raw`, expose read-only accessors, and never talk to
//! the server. Fresh state comes from the client.

mod artifact;
mod experiment;
mod keyed;
mod model_version;
pub(crate) mod raw;
mod registered_model;
mod run;
mod stage;
mod value;

use serde_json::Value;

pub use artifact::Artifact;
pub use experiment::Experiment;
pub use keyed::KeyedList;
pub use model_version::ModelVersion;
pub use registered_model::Model;
pub use run::{Run, RunData, RunInfo};
pub use stage::{
    EnumPolicy, ExperimentStage, Lenient, ModelVersionStage, ModelVersionState, ModelVersionStatus,
    RunStage, RunStatus, RunViewType, WireEnum,
};
pub use value::{Keyed, Metric, Param, Shape, Structural, Tag};
pub(crate) use value::serialize_float;

use crate::Result;
use raw::RawObject;

/// Parse an array field of keyed items into a list, keeping server order.
pub(crate) fn parse_keyed<T, F>(raw: &RawObject<'_>, field: &str, parse: F) -> Result<KeyedList<T>>
where
    T: Keyed,
    F: Fn(&str, &Value) -> Result<T>,
{
    raw.list(field)?
        .into_iter()
        .map(|(context, item)| parse(&context, item))
        .collect()
}

/// Tags of an experiment, run, model or model version.
pub(crate) fn parse_tags(raw: &RawObject<'_>, field: &str) -> Result<KeyedList<Tag>> {
    parse_keyed(raw, field, Tag::parse)
}
