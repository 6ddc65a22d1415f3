//! Lifecycle enumerations - stages and statuses reported by the server
//!
//! Every enumeration has one canonical wire string per member. Parsing is
//! lenient about formatting: case, `_`, `-` and spaces are ignored, so
//! `"PENDING_REGISTRATION"`, `"pending-registration"` and
//! `"PendingRegistration"` all resolve to the same member. A string that
//! matches no member is either rejected or carried through as
//! [`Lenient::Unknown`], depending on the [`EnumPolicy`] in force.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// What to do with a stage/status string that matches no member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumPolicy {
    /// Fail with `Error::UnknownEnumValue`.
    #[default]
    Strict,
    /// Keep the raw string as `Lenient::Unknown`.
    Lenient,
}

/// A closed set of named values with canonical wire strings.
pub trait WireEnum: Copy + Eq + fmt::Debug + Sized + 'static {
    /// Enumeration name used in error messages.
    const KIND: &'static str;

    /// All members, in declaration order.
    const MEMBERS: &'static [Self];

    /// Canonical server representation.
    fn as_str(self) -> &'static str;

    /// Parse a raw server string, ignoring case and separators.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEnumValue` if no member matches.
    fn parse_wire(raw: &str) -> Result<Self> {
        let wanted = normalize(raw);
        Self::MEMBERS
            .iter()
            .copied()
            .find(|member| normalize(member.as_str()) == wanted)
            .ok_or_else(|| Error::UnknownEnumValue {
                kind: Self::KIND,
                value: raw.to_string(),
            })
    }
}

fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// A parsed enum value, or the raw string when the lenient policy let an
/// unrecognized value through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lenient<T> {
    /// Recognized member.
    Known(T),
    /// Raw string the server sent that matched no member.
    Unknown(String),
}

impl<T: WireEnum> Lenient<T> {
    /// Parse under the given policy.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEnumValue` under `EnumPolicy::Strict` when
    /// nothing matches.
    pub fn parse(raw: &str, policy: EnumPolicy) -> Result<Self> {
        match T::parse_wire(raw) {
            Ok(member) => Ok(Self::Known(member)),
            Err(err) => match policy {
                EnumPolicy::Strict => Err(err),
                EnumPolicy::Lenient => {
                    tracing::warn!(kind = T::KIND, value = raw, "passing through unknown enum value");
                    Ok(Self::Unknown(raw.to_string()))
                }
            },
        }
    }

    /// The recognized member, if any.
    #[must_use]
    pub fn known(&self) -> Option<T> {
        match self {
            Self::Known(member) => Some(*member),
            Self::Unknown(_) => None,
        }
    }

    /// True if the server sent a value outside the known set.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// Wire string (canonical for known members, verbatim otherwise).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(member) => member.as_str(),
            Self::Unknown(raw) => raw,
        }
    }
}

impl<T> From<T> for Lenient<T> {
    fn from(member: T) -> Self {
        Self::Known(member)
    }
}

impl<T: WireEnum> fmt::Display for Lenient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T: WireEnum> Serialize for Lenient<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl WireEnum for $name {
            const KIND: &'static str = stringify!($name);
            const MEMBERS: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_wire(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::parse_wire(&raw).map_err(serde::de::Error::custom)
            }
        }

        impl PartialEq<$name> for Lenient<$name> {
            fn eq(&self, other: &$name) -> bool {
                matches!(self, Lenient::Known(member) if member == other)
            }
        }
    };
}

wire_enum! {
    /// Lifecycle stage of an experiment.
    ExperimentStage {
        /// Experiment is active.
        Active => "active",
        /// Experiment was soft-deleted and can be restored.
        Deleted => "deleted",
    }
}

wire_enum! {
    /// Lifecycle stage of a run.
    RunStage {
        /// Run is active.
        Active => "active",
        /// Run was soft-deleted and can be restored.
        Deleted => "deleted",
    }
}

wire_enum! {
    /// Execution status of a run.
    RunStatus {
        /// Run is scheduled but not yet started.
        Scheduled => "SCHEDULED",
        /// Run is executing.
        Running => "RUNNING",
        /// Run completed successfully.
        Finished => "FINISHED",
        /// Run failed.
        Failed => "FAILED",
        /// Run was killed.
        Killed => "KILLED",
    }
}

wire_enum! {
    /// Which runs/experiments a list or search call returns.
    RunViewType {
        /// Only active entries.
        ActiveOnly => "ACTIVE_ONLY",
        /// Only deleted entries.
        DeletedOnly => "DELETED_ONLY",
        /// Both.
        All => "ALL",
    }
}

wire_enum! {
    /// Registry stage of a model version.
    ModelVersionStage {
        /// No stage assigned.
        None => "None",
        /// Pre-production testing.
        Staging => "Staging",
        /// Serving production traffic.
        Production => "Production",
        /// Retired.
        Archived => "Archived",
    }
}

wire_enum! {
    /// Registration status of a model version.
    ModelVersionStatus {
        /// Registration finished.
        Ready => "READY",
        /// Registration still in progress.
        PendingRegistration => "PENDING_REGISTRATION",
        /// Registration failed.
        FailedRegistration => "FAILED_REGISTRATION",
    }
}

impl Default for RunViewType {
    fn default() -> Self {
        Self::ActiveOnly
    }
}

impl RunStatus {
    /// Finished, Failed and Killed are final.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Killed)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Status only moves forward: Scheduled -> Running -> terminal. A
    /// terminal run never returns to Running.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Scheduled, _) => true,
            (Self::Running, Self::Scheduled) => false,
            (Self::Running, _) => true,
            (current, next) => current == next,
        }
    }
}

/// Registration status of a model version together with the server's
/// explanatory message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelVersionState {
    status: Lenient<ModelVersionStatus>,
    message: Option<String>,
}

impl ModelVersionState {
    /// Create a state; an empty message is stored as `None`.
    #[must_use]
    pub fn new(status: impl Into<Lenient<ModelVersionStatus>>, message: Option<String>) -> Self {
        Self {
            status: status.into(),
            message: message.filter(|m| !m.is_empty()),
        }
    }

    /// Registration status.
    #[must_use]
    pub const fn status(&self) -> &Lenient<ModelVersionStatus> {
        &self.status
    }

    /// Server message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// `(status, message)` pair, the tuple shape this state compares equal to.
    #[must_use]
    pub fn as_tuple(&self) -> (&Lenient<ModelVersionStatus>, Option<&str>) {
        (&self.status, self.message())
    }
}

impl Default for ModelVersionState {
    fn default() -> Self {
        Self::new(ModelVersionStatus::PendingRegistration, None)
    }
}

impl PartialEq<(ModelVersionStatus, Option<&str>)> for ModelVersionState {
    fn eq(&self, other: &(ModelVersionStatus, Option<&str>)) -> bool {
        self.status == other.0 && self.message() == other.1.filter(|m| !m.is_empty())
    }
}

impl PartialEq<(ModelVersionStatus, &str)> for ModelVersionState {
    fn eq(&self, other: &(ModelVersionStatus, &str)) -> bool {
        *self == (other.0, Some(other.1))
    }
}

impl fmt::Display for ModelVersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{} because of '{message}'", self.status),
            None => write!(f, "{}", self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_strings_parse() {
        for member in RunStatus::MEMBERS {
            assert_eq!(RunStatus::parse_wire(member.as_str()).unwrap(), *member);
        }
        for member in ModelVersionStage::MEMBERS {
            assert_eq!(member.as_str().parse::<ModelVersionStage>().unwrap(), *member);
        }
    }

    #[test]
    fn test_parse_ignores_case_and_separators() {
        assert_eq!(
            ModelVersionStatus::parse_wire("pending-registration").unwrap(),
            ModelVersionStatus::PendingRegistration
        );
        assert_eq!(ExperimentStage::parse_wire("ACTIVE").unwrap(), ExperimentStage::Active);
        assert_eq!(RunViewType::parse_wire("active only").unwrap(), RunViewType::ActiveOnly);
        assert_eq!(ModelVersionStage::parse_wire("production").unwrap(), ModelVersionStage::Production);
    }

    #[test]
    fn test_unknown_value_strict() {
        let err = RunStatus::parse_wire("PAUSED").unwrap_err();
        assert!(matches!(err, Error::UnknownEnumValue { kind: "RunStatus", .. }));
    }

    #[test]
    fn test_unknown_value_lenient() {
        let value = Lenient::<ModelVersionStage>::parse("Canary", EnumPolicy::Lenient).unwrap();
        assert!(value.is_unknown());
        assert_eq!(value.as_str(), "Canary");
        assert_eq!(value.known(), None);
    }

    #[test]
    fn test_lenient_compares_to_member() {
        let value = Lenient::<RunStatus>::parse("finished", EnumPolicy::Strict).unwrap();
        assert_eq!(value, RunStatus::Finished);
        assert_ne!(value, RunStatus::Failed);
    }

    #[test]
    fn test_run_status_transitions() {
        assert!(RunStatus::Scheduled.can_transition_to(RunStatus::Running));
        assert!(RunStatus::Running.can_transition_to(RunStatus::Killed));
        assert!(!RunStatus::Finished.can_transition_to(RunStatus::Running));
        assert!(!RunStatus::Running.can_transition_to(RunStatus::Scheduled));
        assert!(RunStatus::Failed.can_transition_to(RunStatus::Failed));
        assert!(RunStatus::Killed.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
    }

    #[test]
    fn test_model_version_state_tuple_equality() {
        let state = ModelVersionState::new(ModelVersionStatus::FailedRegistration, Some("disk full".into()));
        assert_eq!(state, (ModelVersionStatus::FailedRegistration, "disk full"));
        assert_eq!(state, (ModelVersionStatus::FailedRegistration, Some("disk full")));
        assert_ne!(state, (ModelVersionStatus::Ready, "disk full"));

        let ready = ModelVersionState::new(ModelVersionStatus::Ready, Some(String::new()));
        assert_eq!(ready, (ModelVersionStatus::Ready, None));
        assert_eq!(ready, (ModelVersionStatus::Ready, ""));
        assert_eq!(ready.to_string(), "READY");
        assert_eq!(state.to_string(), "FAILED_REGISTRATION because of 'disk full'");
    }

    #[test]
    fn test_serde_uses_wire_string() {
        let json = serde_json::to_string(&ModelVersionStage::Staging).unwrap();
        assert_eq!(json, "\"Staging\"");
        let back: RunStatus = serde_json::from_str("\"killed\"").unwrap();
        assert_eq!(back, RunStatus::Killed);
    }
}
