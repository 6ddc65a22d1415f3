//! Epoch-millisecond conversions
//!
//! The tracking server exchanges every timestamp as integer milliseconds
//! since the Unix epoch.

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert a timestamp to epoch milliseconds.
#[must_use]
pub const fn to_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Convert epoch milliseconds to a UTC timestamp.
///
/// # Errors
///
/// Returns `Error::Validation` if the value is outside chrono's range.
pub fn from_millis(context: &str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::validation(context, format!("timestamp {millis} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_roundtrip() {
        let time = from_millis("t", 1_700_000_000_123).unwrap();
        assert_eq!(to_millis(time), 1_700_000_000_123);
    }

    #[test]
    fn test_out_of_range() {
        assert!(from_millis("t", i64::MAX).is_err());
    }

    #[test]
    fn test_now_is_positive() {
        assert!(now_millis() > 1_600_000_000_000);
    }
}
