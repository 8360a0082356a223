use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable record naming the currently published catalog asset.
///
/// Only `path` is required; the descriptive fields may be missing from
/// records written by hand or by older releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPointer {
    /// Storage key of the asset bytes.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl AssetPointer {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file_name: None,
            content_type: None,
            size: None,
            title: None,
            published_at: None,
        }
    }
}
