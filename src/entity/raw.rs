//! Field extraction from raw server JSON
//!
//! Every accessor reports failures as `Error::Validation` with the dotted
//! path of the offending field, so a bad payload points at its source.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::stage::{EnumPolicy, Lenient, WireEnum};
use crate::{timestamp, Error, Result};

/// Borrowed view of one JSON object plus its location in the payload.
#[derive(Debug, Clone)]
pub(crate) struct RawObject<'a> {
    context: String,
    map: &'a Map<String, Value>,
    policy: EnumPolicy,
}

impl<'a> RawObject<'a> {
    /// Wrap `value`, which must be a JSON object.
    pub(crate) fn new(context: impl Into<String>, value: &'a Value, policy: EnumPolicy) -> Result<Self> {
        let context = context.into();
        match value {
            Value::Object(map) => Ok(Self {
                context,
                map,
                policy,
            }),
            other => Err(Error::validation(
                context,
                format!("expected an object, got {}", type_name(other)),
            )),
        }
    }

    pub(crate) fn policy(&self) -> EnumPolicy {
        self.policy
    }

    pub(crate) fn map(&self) -> &'a Map<String, Value> {
        self.map
    }

    pub(crate) fn path(&self, field: &str) -> String {
        format!("{}.{field}", self.context)
    }

    /// Field value; JSON `null` counts as absent.
    pub(crate) fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    /// First present field among `fields`.
    pub(crate) fn first_of(&self, fields: &[&'static str]) -> Option<(&'static str, &'a Value)> {
        fields
            .iter()
            .find_map(|field| self.get(field).map(|value| (*field, value)))
    }

    /// Nested object.
    pub(crate) fn child(&self, field: &str) -> Result<RawObject<'a>> {
        let value = self
            .get(field)
            .ok_or_else(|| Error::validation(self.path(field), "missing required object"))?;
        RawObject::new(self.path(field), value, self.policy)
    }

    /// Nested object, or `None` when absent.
    pub(crate) fn opt_child(&self, field: &str) -> Result<Option<RawObject<'a>>> {
        self.get(field)
            .map(|value| RawObject::new(self.path(field), value, self.policy))
            .transpose()
    }

    /// Required non-empty string.
    pub(crate) fn required_str(&self, field: &str) -> Result<&'a str> {
        match self.opt_str(field)? {
            Some(s) if !s.is_empty() => Ok(s),
            Some(_) => Err(Error::validation(self.path(field), "must not be empty")),
            None => Err(Error::validation(self.path(field), "missing required field")),
        }
    }

    pub(crate) fn opt_str(&self, field: &str) -> Result<Option<&'a str>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.mistyped(field, "a string", other)),
        }
    }

    pub(crate) fn str_or_default(&self, field: &str) -> Result<String> {
        Ok(self.opt_str(field)?.unwrap_or_default().to_string())
    }

    /// Identifier sent either as a string or as a bare integer.
    pub(crate) fn opt_id(&self, field: &str) -> Result<Option<String>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(Some(n.to_string())),
            Some(other) => Err(self.mistyped(field, "a string or integer id", other)),
        }
    }

    /// Integer sent either as a JSON number or as a numeric string
    /// (protobuf JSON encodes int64 as a string).
    pub(crate) fn opt_i64(&self, field: &str) -> Result<Option<i64>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| Error::validation(self.path(field), format!("{n} is not an integer"))),
            Some(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| Error::validation(self.path(field), format!("{s:?} is not an integer"))),
            Some(other) => Err(self.mistyped(field, "an integer", other)),
        }
    }

    pub(crate) fn required_i64(&self, field: &str) -> Result<i64> {
        self.opt_i64(field)?
            .ok_or_else(|| Error::validation(self.path(field), "missing required field"))
    }

    /// Float sent as a JSON number or a numeric string (`"NaN"` included).
    pub(crate) fn opt_f64(&self, field: &str) -> Result<Option<f64>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| Error::validation(self.path(field), format!("{s:?} is not a number"))),
            Some(other) => Err(self.mistyped(field, "a number", other)),
        }
    }

    pub(crate) fn opt_bool(&self, field: &str) -> Result<Option<bool>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.mistyped(field, "a boolean", other)),
        }
    }

    /// Epoch-millisecond timestamp.
    pub(crate) fn opt_time(&self, field: &str) -> Result<Option<DateTime<Utc>>> {
        self.opt_i64(field)?
            .map(|millis| timestamp::from_millis(&self.path(field), millis))
            .transpose()
    }

    /// Array field; absent means empty. A lone object is treated as a
    /// one-element array.
    pub(crate) fn list(&self, field: &str) -> Result<Vec<(String, &'a Value)>> {
        match self.get(field) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items
                .iter()
                .enumerate()
                .map(|(i, item)| (format!("{}[{i}]", self.path(field)), item))
                .collect()),
            Some(single @ Value::Object(_)) => Ok(vec![(format!("{}[0]", self.path(field)), single)]),
            Some(other) => Err(self.mistyped(field, "an array", other)),
        }
    }

    /// Enum-valued field under this object's policy, `default` when absent.
    pub(crate) fn wire_enum<T: WireEnum>(&self, field: &str, default: T) -> Result<Lenient<T>> {
        match self.opt_str(field)? {
            None => Ok(Lenient::Known(default)),
            Some(raw) => Lenient::parse(raw, self.policy),
        }
    }

    fn mistyped(&self, field: &str, expected: &str, got: &Value) -> Error {
        Error::validation(
            self.path(field),
            format!("expected {expected}, got {}", type_name(got)),
        )
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_str_missing() {
        let value = json!({"name": "x"});
        let raw = RawObject::new("experiment", &value, EnumPolicy::Strict).unwrap();
        let err = raw.required_str("experiment_id").unwrap_err();
        assert!(err.to_string().contains("experiment.experiment_id"));
    }

    #[test]
    fn test_not_an_object() {
        let value = json!([1, 2]);
        assert!(RawObject::new("run", &value, EnumPolicy::Strict).is_err());
    }

    #[test]
    fn test_int_from_string() {
        let value = json!({"start_time": "1700000000000", "step": 3});
        let raw = RawObject::new("info", &value, EnumPolicy::Strict).unwrap();
        assert_eq!(raw.opt_i64("start_time").unwrap(), Some(1_700_000_000_000));
        assert_eq!(raw.opt_i64("step").unwrap(), Some(3));
        assert_eq!(raw.opt_i64("missing").unwrap(), None);
    }

    #[test]
    fn test_null_is_absent() {
        let value = json!({"end_time": null});
        let raw = RawObject::new("info", &value, EnumPolicy::Strict).unwrap();
        assert_eq!(raw.opt_time("end_time").unwrap(), None);
    }

    #[test]
    fn test_list_wraps_single_object() {
        let value = json!({"tags": {"key": "a", "value": "b"}});
        let raw = RawObject::new("mv", &value, EnumPolicy::Strict).unwrap();
        let items = raw.list("tags").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].0, "mv.tags[0]");
    }

    #[test]
    fn test_mistyped_number() {
        let value = json!({"value": true});
        let raw = RawObject::new("metric", &value, EnumPolicy::Strict).unwrap();
        assert!(raw.opt_f64("value").is_err());
    }
}
