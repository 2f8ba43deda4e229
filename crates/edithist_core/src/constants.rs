//! Shared constants used across edithist crates.

/// Directory holding full-content snapshot records for one tracked file.
pub const DEFAULT_CONCRETE_DIR: &str = "concrete";

/// Directory holding incremental edit records for one tracked file.
pub const DEFAULT_EDITS_DIR: &str = "edits";

/// Top-level authoring-environment record.
pub const DEFAULT_METADATA_FILE: &str = "metadata.json";

/// Environment variable overriding [`DEFAULT_CONCRETE_DIR`].
pub const ENV_CONCRETE_DIR: &str = "EDITHIST_CONCRETE_DIR";
/// Environment variable overriding [`DEFAULT_EDITS_DIR`].
pub const ENV_EDITS_DIR: &str = "EDITHIST_EDITS_DIR";
/// Environment variable overriding [`DEFAULT_METADATA_FILE`].
pub const ENV_METADATA_FILE: &str = "EDITHIST_METADATA_FILE";
/// Environment variable selecting the patch bounds policy (`strict` or `clamp`).
pub const ENV_PATCH_POLICY: &str = "EDITHIST_PATCH_POLICY";

/// Spacing between synthetic edits when none is requested.
pub const DEFAULT_SYNTHETIC_DELTA_MS: i64 = 100;

/// Start time for synthetic histories (2024-01-01T00:00:00Z).
pub const DEFAULT_SYNTHETIC_START_MS: i64 = 1_704_067_200_000;
