//! Value objects - tags, params and metrics
//!
//! Each value object exposes a stable `key` and compares structurally
//! against three shapes: another instance, an ordered tuple of its identity
//! fields, and a mapping from field name to value (field order irrelevant).
//!
//! ```rust
//! use mlflow_rest_client::entity::{Param, Structural};
//! use serde_json::json;
//!
//! let param = Param::from_raw(&json!({"key": "alpha", "value": "0.5"})).unwrap();
//! assert_eq!(param, ("alpha", "0.5"));
//! assert!(param.matches_value(&json!({"value": "0.5", "key": "alpha"})));
//! assert!(param.matches_value(&json!(["alpha", "0.5"])));
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use super::raw::RawObject;
use super::stage::EnumPolicy;
use crate::{Error, Result};

/// Anything addressable by a string key.
pub trait Keyed {
    /// Stable key.
    fn key(&self) -> &str;
}

/// Shapes a value object can be compared against.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    /// Ordered identity fields, e.g. `["alpha", "0.5"]`.
    Tuple(&'a [Value]),
    /// Field name to value, e.g. `{"key": "alpha", "value": "0.5"}`.
    Mapping(&'a Map<String, Value>),
}

impl<'a> Shape<'a> {
    /// Classify a JSON value; scalars have no comparable shape.
    #[must_use]
    pub fn of(value: &'a Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Self::Tuple(items.as_slice())),
            Value::Object(map) => Some(Self::Mapping(map)),
            _ => None,
        }
    }
}

/// Structural equality against tuples and mappings.
///
/// Implementors list their identity fields once; both conversions and the
/// comparison are derived from that.
pub trait Structural {
    /// Identity field names, in tuple order.
    const FIELDS: &'static [&'static str];

    /// Identity field values, in `FIELDS` order.
    fn as_tuple(&self) -> Vec<Value>;

    /// Non-identity fields that a mapping may carry. A mapping that
    /// includes one must agree on its value.
    fn optional_fields(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Identity fields keyed by name.
    fn as_mapping(&self) -> Map<String, Value> {
        Self::FIELDS
            .iter()
            .map(|field| (*field).to_string())
            .zip(self.as_tuple())
            .collect()
    }

    /// Compare against a normalized shape.
    fn matches(&self, shape: Shape<'_>) -> bool {
        let ours = self.as_tuple();
        match shape {
            Shape::Tuple(items) => {
                items.len() == ours.len() && items.iter().zip(&ours).all(|(a, b)| values_equal(a, b))
            }
            Shape::Mapping(map) => {
                let identity_matches = Self::FIELDS
                    .iter()
                    .zip(&ours)
                    .all(|(field, ours)| map.get(*field).is_some_and(|theirs| values_equal(ours, theirs)));
                let optional = self.optional_fields();
                let extras_match = map
                    .iter()
                    .filter(|(field, _)| !Self::FIELDS.iter().any(|known| *known == field.as_str()))
                    .all(|(field, theirs)| optional.get(field).is_some_and(|ours| values_equal(ours, theirs)));
                identity_matches && extras_match
            }
        }
    }

    /// Compare against an arbitrary JSON value (array or object).
    fn matches_value(&self, value: &Value) -> bool {
        Shape::of(value).is_some_and(|shape| self.matches(shape))
    }
}

/// JSON equality where numbers compare by value (`1` equals `1.0`) and
/// the non-finite spellings `"NaN"`, `"Infinity"` and `"-Infinity"` compare
/// as floats.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => match (wire_float(a), wire_float(b)) {
            (Some(x), Some(y)) => same_float(x, y),
            _ => a == b,
        },
    }
}

/// A float as the server spells it: a number, or one of the non-finite
/// strings.
fn wire_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

/// Float equality under which NaN equals NaN.
#[allow(clippy::float_cmp)]
fn same_float(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a == b
}

/// JSON form of a float. JSON numbers cannot hold NaN or the infinities,
/// so those go out as the strings the server's protobuf decoder accepts.
fn float_to_value(value: f64) -> Value {
    if value.is_nan() {
        Value::from("NaN")
    } else if value.is_infinite() {
        Value::from(if value > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        Value::from(value)
    }
}

/// `serialize_with` adapter for [`float_to_value`].
#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) fn serialize_float<S>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    float_to_value(*value).serialize(serializer)
}

/// Text of a scalar field value. Numbers and booleans are rendered the way
/// the server would have stringified them; `null` is empty.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => Some(String::new()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidInput("key must not be empty".to_string()));
    }
    Ok(())
}

/// Read a `{key, value}` pair, or the single-entry `{"<key>": "<value>"}`
/// shorthand.
fn parse_key_value(raw: &RawObject<'_>) -> Result<(String, String)> {
    let map = raw.map();
    let shorthand = !map.contains_key("key") && !map.contains_key("value") && map.len() == 1;
    let (key, value, field) = match map.iter().next() {
        Some((key, value)) if shorthand => {
            if key.is_empty() {
                return Err(Error::validation(raw.path("key"), "must not be empty"));
            }
            (key.clone(), Some(value), key.as_str())
        }
        _ => (raw.required_str("key")?.to_string(), raw.get("value"), "value"),
    };
    let value = match value {
        None => String::new(),
        Some(value) => scalar_text(value)
            .ok_or_else(|| Error::validation(raw.path(field), "expected a string, number or boolean"))?,
    };
    Ok((key, value))
}

macro_rules! key_value_object {
    ($(#[$meta:meta])* $name:ident, $context:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        pub struct $name {
            key: String,
            value: String,
        }

        impl $name {
            #[doc = concat!("Create a ", $context, "; the key must be non-empty.")]
            ///
            /// # Errors
            ///
            /// Returns `Error::InvalidInput` for an empty key.
            pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
                let key = key.into();
                check_key(&key)?;
                Ok(Self {
                    key,
                    value: value.into(),
                })
            }

            #[doc = concat!("Build a ", $context, " from one server JSON object.")]
            ///
            /// # Errors
            ///
            /// Returns `Error::Validation` if the key is missing, empty or
            /// not a string.
            pub fn from_raw(raw: &Value) -> Result<Self> {
                Self::parse($context, raw)
            }

            pub(crate) fn parse(context: &str, raw: &Value) -> Result<Self> {
                let raw = RawObject::new(context, raw, EnumPolicy::Strict)?;
                let (key, value) = parse_key_value(&raw)?;
                Ok(Self { key, value })
            }

            /// Key.
            #[must_use]
            pub fn key(&self) -> &str {
                &self.key
            }

            /// Value.
            #[must_use]
            pub fn value(&self) -> &str {
                &self.value
            }

            /// Server JSON representation.
            #[must_use]
            pub fn to_raw(&self) -> Value {
                serde_json::json!({"key": self.key, "value": self.value})
            }
        }

        impl Keyed for $name {
            fn key(&self) -> &str {
                &self.key
            }
        }

        impl Structural for $name {
            const FIELDS: &'static [&'static str] = &["key", "value"];

            fn as_tuple(&self) -> Vec<Value> {
                vec![Value::from(self.key.as_str()), Value::from(self.value.as_str())]
            }
        }

        impl PartialEq<(&str, &str)> for $name {
            fn eq(&self, other: &(&str, &str)) -> bool {
                self.key == other.0 && self.value == other.1
            }
        }

        impl TryFrom<&Value> for $name {
            type Error = Error;

            fn try_from(raw: &Value) -> Result<Self> {
                Self::from_raw(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.key)
            }
        }
    };
}

key_value_object! {
    /// Free-form label on an experiment, run, model or model version.
    Tag, "tag"
}

key_value_object! {
    /// Run hyperparameter. Write-once per key on the server.
    Param, "param"
}

/// One metric observation.
///
/// `timestamp` is kept as wire milliseconds so a server value round-trips
/// exactly; [`Metric::timestamp_utc`] gives the chrono view.
#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    key: String,
    #[serde(serialize_with = "serialize_float")]
    value: f64,
    timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<i64>,
}

impl Metric {
    /// Create a metric observation.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key.
    pub fn new(key: impl Into<String>, value: f64, timestamp: i64) -> Result<Self> {
        let key = key.into();
        check_key(&key)?;
        Ok(Self {
            key,
            value,
            timestamp,
            step: None,
        })
    }

    /// Set the step.
    #[must_use]
    pub const fn with_step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    /// Build a metric from one server JSON object.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if `key` is missing, or `value` /
    /// `timestamp` are missing or non-numeric.
    pub fn from_raw(raw: &Value) -> Result<Self> {
        Self::parse("metric", raw)
    }

    pub(crate) fn parse(context: &str, raw: &Value) -> Result<Self> {
        Self::parse_object(&RawObject::new(context, raw, EnumPolicy::Strict)?)
    }

    pub(crate) fn parse_object(raw: &RawObject<'_>) -> Result<Self> {
        let key = raw.required_str("key")?.to_string();
        let value = raw
            .opt_f64("value")?
            .ok_or_else(|| Error::validation(raw.path("value"), "missing required field"))?;
        let timestamp = raw.required_i64("timestamp")?;
        let step = raw.opt_i64("step")?;
        Ok(Self {
            key,
            value,
            timestamp,
            step,
        })
    }

    /// Metric name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Observed value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Epoch milliseconds of the observation.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Observation time as a UTC timestamp.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the stored value is out of range.
    pub fn timestamp_utc(&self) -> Result<chrono::DateTime<chrono::Utc>> {
        crate::timestamp::from_millis("metric.timestamp", self.timestamp)
    }

    /// Training step, if reported.
    #[must_use]
    pub const fn step(&self) -> Option<i64> {
        self.step
    }

    /// Server JSON representation.
    #[must_use]
    pub fn to_raw(&self) -> Value {
        let mut raw = serde_json::json!({
            "key": self.key,
            "value": float_to_value(self.value),
            "timestamp": self.timestamp,
        });
        if let (Some(step), Some(map)) = (self.step, raw.as_object_mut()) {
            map.insert("step".to_string(), Value::from(step));
        }
        raw
    }
}

impl Keyed for Metric {
    fn key(&self) -> &str {
        &self.key
    }
}

impl Structural for Metric {
    const FIELDS: &'static [&'static str] = &["key", "value", "timestamp"];

    fn as_tuple(&self) -> Vec<Value> {
        vec![
            Value::from(self.key.as_str()),
            float_to_value(self.value),
            Value::from(self.timestamp),
        ]
    }

    fn optional_fields(&self) -> Map<String, Value> {
        self.step
            .map(|step| ("step".to_string(), Value::from(step)))
            .into_iter()
            .collect()
    }
}

/// Identity is `(key, value, timestamp)`; `step` is not part of it.
impl PartialEq for Metric {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && same_float(self.value, other.value) && self.timestamp == other.timestamp
    }
}

impl PartialEq<(&str, f64, i64)> for Metric {
    fn eq(&self, other: &(&str, f64, i64)) -> bool {
        self.key == other.0 && same_float(self.value, other.1) && self.timestamp == other.2
    }
}

impl TryFrom<&Value> for Metric {
    type Error = Error;

    fn try_from(raw: &Value) -> Result<Self> {
        Self::from_raw(raw)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.key, self.value)?;
        if let Some(step) = self.step {
            write!(f, " for {step}")?;
        }
        write!(f, " at {}", self.timestamp)
    }
}
