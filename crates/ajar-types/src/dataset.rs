//! Dataset samples derived for supervised fine-tuning.

use serde::{Deserialize, Serialize};

use crate::{Rating, Timestamp};

/// Which source collection a sample was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSource {
    Memory,
    Log,
}

/// A normalized instruction/input/output triple.
///
/// Regenerated wholesale on every build; never written back to the stores.
/// Field order here is the field order on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSample {
    pub id: String,
    pub source: SampleSource,
    pub session_id: String,
    pub instruction: String,
    pub input: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::time::iso_millis_opt"
    )]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub meta: serde_json::Map<String, serde_json::Value>,
}
