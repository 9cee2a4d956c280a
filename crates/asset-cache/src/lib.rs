//! Local provisioning of remote model assets (LoRA weight files).
//!
//! A job may reference auxiliary weight files by URL. Before the job is
//! submitted, [`AssetCache::ensure_present`] guarantees each referenced file
//! exists under the cache directory, streaming it down through an
//! authenticated HTTP client on a miss. Presence is keyed by file name only;
//! downloads land in a `.part` file and are renamed into place on success, so
//! a failed fetch never leaves a file under the asset's name.

use serde::{Deserialize, Serialize};

mod auth;
mod cache;
mod error;

pub use auth::{HostToken, token_for};
pub use cache::AssetCache;
pub use error::AssetError;

/// A named external asset referenced by a job.
///
/// `name` doubles as the cache key and the destination file name; `source`
/// is where to fetch it from when missing. References are created from job
/// input and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetReference {
    pub name: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
}

impl AssetReference {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            weight: None,
        }
    }

    /// Blend weight for this asset, defaulting to 1.0 when unspecified.
    pub fn weight(&self) -> f32 {
        self.weight.unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_defaults_to_one() {
        let asset = AssetReference::new("style.safetensors", "https://example.com/style");
        assert_eq!(asset.weight(), 1.0);
    }

    #[test]
    fn deserializes_from_job_input() {
        let asset: AssetReference = serde_json::from_str(
            r#"{"name":"style.safetensors","source":"https://example.com/style","weight":0.8}"#,
        )
        .unwrap();
        assert_eq!(asset.name, "style.safetensors");
        assert_eq!(asset.weight(), 0.8);
    }
}
