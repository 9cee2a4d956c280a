//! Result publishing into the local upload root.
//!
//! Object storage proper is an external collaborator; this implementation
//! mirrors its interface against the local filesystem so the shim works
//! end-to-end without storage credentials.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use job_tracker::{BoxError, ResultPublisher};
use tracing::info;

use crate::retry::retry_fixed;

/// Publishes completed results by copying them under
/// `<upload_root>/framecast/<request-id>/` and returning the destination,
/// encrypted when a secret is configured.
pub struct LocalPublisher {
    upload_root: PathBuf,
    target_prefix: String,
    secret: Option<String>,
    attempts: u32,
    delay: Duration,
}

impl LocalPublisher {
    pub fn new(
        upload_root: impl Into<PathBuf>,
        request_id: &str,
        secret: Option<String>,
        attempts: u32,
        delay: Duration,
    ) -> Self {
        Self {
            upload_root: upload_root.into(),
            target_prefix: format!("framecast/{request_id}"),
            secret,
            attempts,
            delay,
        }
    }
}

#[async_trait]
impl ResultPublisher for LocalPublisher {
    async fn publish(&self, result: &Path) -> Result<String, BoxError> {
        let file_name = result
            .file_name()
            .ok_or_else(|| BoxError::from("result path has no file name"))?;
        let target_dir = self.upload_root.join(&self.target_prefix);
        let target = target_dir.join(file_name);

        retry_fixed(self.attempts, self.delay, || async {
            tokio::fs::create_dir_all(&target_dir).await?;
            tokio::fs::copy(result, &target).await?;
            Ok::<_, std::io::Error>(())
        })
        .await?;
        info!(target = %target.display(), "result stored");

        let reference = target.to_string_lossy().into_owned();
        Ok(match &self.secret {
            Some(secret) => payload_codec::encrypt(reference.as_bytes(), secret),
            None => reference,
        })
    }
}
