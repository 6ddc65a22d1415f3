//! Artifact - one entry of a run's artifact listing

use serde::Serialize;
use serde_json::Value;

use super::raw::RawObject;
use super::stage::EnumPolicy;
use crate::{Error, Result};

/// File or directory under a run's artifact root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    path: String,
    is_dir: bool,
    file_size: Option<u64>,
    root: Option<String>,
}

impl Artifact {
    /// Build an artifact from one entry of a listing.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if `path` is missing or `file_size` is
    /// not a non-negative integer.
    pub fn from_raw(raw: &Value) -> Result<Self> {
        Self::parse(&RawObject::new("artifact", raw, EnumPolicy::Strict)?, None)
    }

    pub(crate) fn parse(raw: &RawObject<'_>, root: Option<&str>) -> Result<Self> {
        let file_size = raw
            .opt_i64("file_size")?
            .map(|size| {
                u64::try_from(size)
                    .map_err(|_| Error::validation(raw.path("file_size"), format!("{size} is negative")))
            })
            .transpose()?;

        Ok(Self {
            path: raw.required_str("path")?.to_string(),
            is_dir: raw.opt_bool("is_dir")?.unwrap_or(false),
            file_size,
            root: root.filter(|r| !r.is_empty()).map(str::to_string),
        })
    }

    /// Path relative to the root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True for directories.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Size in bytes (files only).
    #[must_use]
    pub const fn file_size(&self) -> Option<u64> {
        self.file_size
    }

    /// Listing root URI.
    #[must_use]
    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// Root and path joined with a single `/`; the bare path without a root.
    #[must_use]
    pub fn full_path(&self) -> String {
        match &self.root {
            Some(root) => format!("{}/{}", root.trim_end_matches('/'), self.path.trim_start_matches('/')),
            None => self.path.clone(),
        }
    }
}

impl TryFrom<&Value> for Artifact {
    type Error = Error;

    fn try_from(raw: &Value) -> Result<Self> {
        Self::from_raw(raw)
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_path())
    }
}
