use asset_cache::AssetError;
use job_tracker::TrackerError;
use payload_codec::CodecError;

/// Errors surfaced by the orchestrating handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Missing or malformed environment configuration. Fatal, never retried.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("invalid job request: {source}")]
    Request {
        #[from]
        source: serde_json::Error,
    },

    /// The encrypted payload could not be decoded; it is discarded.
    #[error("failed to decode payload: {source}")]
    Codec {
        #[from]
        source: CodecError,
    },

    /// A referenced asset could not be provisioned; fatal for the job,
    /// surfaced before submission.
    #[error("failed to provision asset: {source}")]
    Asset {
        #[from]
        source: AssetError,
    },

    #[error("invalid image input: {reason}")]
    ImageInput { reason: String },

    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl HandlerError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn image_input(reason: impl Into<String>) -> Self {
        Self::ImageInput {
            reason: reason.into(),
        }
    }
}
