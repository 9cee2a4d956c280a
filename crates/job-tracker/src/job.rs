use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Opaque job identifier assigned by the queue at submission.
pub type JobId = String;

/// Lifecycle states of a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting in the queue.
    Pending,
    /// Being processed by the backend.
    Running,
    /// Finished successfully; `result` is populated.
    Completed,
    /// Finished with an error; `error` is populated.
    Failed,
    /// Cancelled by the backend.
    Cancelled,
}

impl JobStatus {
    /// Whether this status ends the job's lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Free-form progress payload attached to a running job.
///
/// `html` is a small markup fragment embedding a 0-100 value and a status
/// message (see [`crate::markup`]); `preview` carries an already-encoded
/// JPEG frame of the work in progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<Vec<u8>>,
}

/// Read-only snapshot of a job as reported by the queue.
///
/// `result` and `error` are mutually exclusive and both absent while the
/// job is non-terminal.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub progress_data: Option<ProgressData>,
    pub result: Option<PathBuf>,
    pub error: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<JobId>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            progress_data: None,
            result: None,
            error: None,
        }
    }
}
