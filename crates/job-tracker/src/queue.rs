use async_trait::async_trait;

use crate::error::BoxError;
use crate::job::{Job, JobId};

/// Arguments handed to the queue when submitting a generation job.
///
/// `params` stays opaque to the queue: the tracker never interprets it, the
/// backend does. The LoRA lists mirror the cache state at submission time.
#[derive(Debug, Clone, Default)]
pub struct JobArgs {
    /// Generation parameters, serialized as-is for the backend.
    pub params: serde_json::Value,
    /// Decoded input image bytes.
    pub input_image: Vec<u8>,
    /// Names of every weight file currently installed in the cache.
    pub loaded_loras: Vec<String>,
    /// Names of the weight files this job selected.
    pub selected_loras: Vec<String>,
    /// Blend weight per selected name.
    pub lora_weights: Vec<f32>,
}

/// The queue interface the tracker consumes.
///
/// These three operations are the only window into the backend; queue
/// internals (scheduling, persistence) are invisible here.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Submit a job, returning its queue-assigned identifier.
    async fn submit(&self, args: JobArgs) -> Result<JobId, BoxError>;

    /// Look up a job snapshot; `None` means the queue does not know the id.
    async fn job(&self, id: &str) -> Result<Option<Job>, BoxError>;

    /// Position of a pending job in the queue, when the queue exposes one.
    async fn queue_position(&self, id: &str) -> Result<Option<usize>, BoxError>;
}
