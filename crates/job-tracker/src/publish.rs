use std::path::Path;

use async_trait::async_trait;

use crate::error::BoxError;

/// Turns a completed job's local result into an outward reference.
///
/// Implementations own uploading and any reference encryption; the tracker
/// only forwards the returned string inside the terminal `update` event.
#[async_trait]
pub trait ResultPublisher: Send + Sync {
    async fn publish(&self, result: &Path) -> Result<String, BoxError>;
}
