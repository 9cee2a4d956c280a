use crate::job::JobId;

/// Error type carried across the collaborator trait seams.
///
/// Queue and publisher implementations bring their own error types; the
/// tracker wraps whatever comes back.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a tracking loop.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The queue no longer knows a job this tracker submitted.
    #[error("job `{id}` not found in the queue")]
    JobLost { id: JobId },

    #[error("queue error: {source}")]
    Queue {
        #[source]
        source: BoxError,
    },

    #[error("failed to publish result: {source}")]
    Publish {
        #[source]
        source: BoxError,
    },

    /// The outward event channel was dropped by the consumer.
    #[error("event channel closed")]
    ChannelClosed,
}
