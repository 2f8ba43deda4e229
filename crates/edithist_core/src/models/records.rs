//! Raw decoded records as they appear in the persisted change log.

use crate::error::{HistoryError, Result};
use crate::models::change::ContentChange;
use crate::time::Timestamp;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Snapshot record: either fresh contents or a pointer to an earlier snapshot
/// whose contents are unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawCheckpoint {
    New {
        contents: String,
        mtime: Timestamp,
    },
    Same {
        #[serde(rename = "prevMtime")]
        prev_mtime: Timestamp,
        mtime: Timestamp,
    },
}

impl RawCheckpoint {
    pub fn mtime(&self) -> Timestamp {
        match self {
            Self::New { mtime, .. } | Self::Same { mtime, .. } => *mtime,
        }
    }
}

/// Edit record whose anchor is named by the anchor checkpoint's mtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEdit {
    pub file: String,
    pub time: Timestamp,
    pub base_time: Timestamp,
    pub changes: Vec<ContentChange>,
}

/// Decode one JSON record, naming the record in any error.
///
/// # Arguments
/// - `record`: Archive path or other label used in error messages.
/// - `text`: Raw JSON text.
///
/// # Errors
/// Returns [`HistoryError::MalformedRecord`] on syntax errors, missing
/// fields, or unknown `type` discriminants.
pub fn decode_record<T: DeserializeOwned>(record: &str, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|err| HistoryError::malformed(record, err))
}

/// Encode one record as compact JSON.
pub fn encode_record<T: Serialize>(record: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|err| HistoryError::malformed(record, err))
}
