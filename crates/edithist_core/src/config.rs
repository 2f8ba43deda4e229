//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_CONCRETE_DIR, DEFAULT_EDITS_DIR, DEFAULT_METADATA_FILE, ENV_CONCRETE_DIR,
    ENV_EDITS_DIR, ENV_METADATA_FILE, ENV_PATCH_POLICY,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Fixed record-collection names of the persisted change-log layout.
///
/// A tracked file `src/lib.rs` stores its snapshots under
/// `src/lib.rs/<concrete_dir>/<ms>` and its edits under
/// `src/lib.rs/<edits_dir>/<ms>`; the workspace metadata record lives at
/// `<metadata_file>` in the archive root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub concrete_dir: String,
    pub edits_dir: String,
    pub metadata_file: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            concrete_dir: DEFAULT_CONCRETE_DIR.to_string(),
            edits_dir: DEFAULT_EDITS_DIR.to_string(),
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
        }
    }
}

/// How the patch applier treats offsets that fall outside the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchPolicy {
    /// Reject the change with [`crate::HistoryError::MalformedPatch`].
    #[default]
    Strict,
    /// Clamp offsets to the buffer bounds, matching the recording tool's
    /// slice semantics.
    Clamp,
}

impl fmt::Display for PatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Clamp => f.write_str("clamp"),
        }
    }
}

impl FromStr for PatchPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "clamp" | "compat" => Ok(Self::Clamp),
            other => Err(format!(
                "unknown patch policy '{}': expected 'strict' or 'clamp'",
                other
            )),
        }
    }
}

/// Runtime configuration for loading and replaying change logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub layout: LayoutConfig,
    pub patch_policy: PatchPolicy,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unrecognized patch policies are logged and replaced by the default.
    ///
    /// # Arguments
    /// - `lookup`: Returns the raw value for a variable name, if set.
    ///
    /// # Returns
    /// A populated [`Config`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = LayoutConfig::default();
        let layout = LayoutConfig {
            concrete_dir: non_empty(lookup(ENV_CONCRETE_DIR)).unwrap_or(defaults.concrete_dir),
            edits_dir: non_empty(lookup(ENV_EDITS_DIR)).unwrap_or(defaults.edits_dir),
            metadata_file: non_empty(lookup(ENV_METADATA_FILE))
                .unwrap_or(defaults.metadata_file),
        };
        let patch_policy = match non_empty(lookup(ENV_PATCH_POLICY)) {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                tracing::warn!("Ignoring {}: {}", ENV_PATCH_POLICY, err);
                PatchPolicy::default()
            }),
            None => PatchPolicy::default(),
        };
        Self {
            layout,
            patch_policy,
        }
    }
}
