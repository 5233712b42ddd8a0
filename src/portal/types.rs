//! Portal data wire types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFile {
    pub filename: String,
    pub size: u64,
    pub created: String,
    pub modified: String,
}

/// One recording session inside a group, addressed by stream id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSession {
    pub sid: String,
    // The backend's field name, kept as-is on the wire.
    #[serde(rename = "createdT")]
    pub created_at: String,
    #[serde(default)]
    pub files: Vec<AudioFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub thread_id: String,
    pub title: String,
    pub ndc_id: i64,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(rename = "sid_info", default)]
    pub sessions: Vec<RecordingSession>,
}

impl Group {
    /// Timestamp of the newest recording, used for listing order. Timestamps
    /// are RFC 3339, so string comparison orders them correctly.
    pub fn latest_recording(&self) -> Option<&str> {
        self.sessions.iter().map(|s| s.created_at.as_str()).max()
    }

    pub fn recording_count(&self) -> usize {
        self.sessions.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputInfoResponse {
    pub success: bool,
    #[serde(default)]
    pub data: HashMap<String, Group>,
}
