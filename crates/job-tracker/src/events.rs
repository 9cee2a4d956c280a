use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::job::JobStatus;

/// Outward-facing event, serialized as `{ "name": …, "payload": … }`.
///
/// Exactly one `Update` is emitted per status change; `Progress` events are
/// throttled and carry the blended overall percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "payload", rename_all = "lowercase")]
pub enum JobEvent {
    Update {
        status: JobStatus,
        error: Option<String>,
        /// Published (uploaded, possibly encrypted) result reference;
        /// present only for `Completed`.
        result: Option<String>,
    },
    Progress {
        /// Overall percentage, 0-100, non-decreasing per job.
        percentage: u8,
        /// Inline preview as a `data:image/jpeg;base64,…` URI.
        preview: Option<String>,
        description: String,
        message: Option<String>,
    },
}

impl JobEvent {
    /// Whether this event reports a terminal job status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Update { status, .. } if status.is_terminal())
    }
}

/// Encode preview bytes into an inline data URI, best-effort.
///
/// An unusable preview only drops the field; it never fails the caller.
pub fn preview_data_uri(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        warn!("dropping empty preview image");
        return None;
    }
    Some(format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes)))
}
