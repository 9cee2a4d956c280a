//! The orchestrating handler: one request in, a stream of events out.

use std::path::Path;
use std::sync::Arc;

use asset_cache::AssetCache;
use job_tracker::{JobArgs, JobEvent, JobQueue, ProgressTracker, TrackerError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::HandlerError;
use crate::image::fetch_input_image;
use crate::publish::LocalPublisher;
use crate::request::JobRequest;

/// Behavioral switches for a handler instance.
///
/// One handler serves every delivery variant; the differences live here
/// instead of in parallel code paths.
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// Decrypt inbound references and encrypt the outbound result.
    pub encrypted_payloads: bool,
    /// Forward only the terminal `update` event, swallowing the
    /// intermediate stream.
    pub final_event_only: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            encrypted_payloads: true,
            final_event_only: false,
        }
    }
}

/// Composition root: decodes a request, provisions assets, submits the job
/// and drives the progress tracker until the job ends.
pub struct Handler {
    settings: Settings,
    config: HandlerConfig,
    queue: Arc<dyn JobQueue>,
    client: reqwest::Client,
}

impl Handler {
    pub fn new(
        settings: Settings,
        config: HandlerConfig,
        queue: Arc<dyn JobQueue>,
    ) -> Result<Self, HandlerError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            settings,
            config,
            queue,
            client,
        })
    }

    /// Process one request, emitting events on `events` until the job is
    /// terminal, the request fails, or `token` is cancelled.
    ///
    /// The output directory is cleaned and recreated on every exit path.
    pub async fn run(
        &self,
        request_id: &str,
        request: JobRequest,
        events: mpsc::Sender<JobEvent>,
        token: CancellationToken,
    ) -> Result<(), HandlerError> {
        let outcome = self.process(request_id, request, events, token).await;
        if let Err(e) = reset_dir(&self.settings.output_dir).await {
            warn!(error = %e, "failed to clean output directory");
        }
        outcome
    }

    async fn process(
        &self,
        request_id: &str,
        request: JobRequest,
        events: mpsc::Sender<JobEvent>,
        token: CancellationToken,
    ) -> Result<(), HandlerError> {
        info!(request_id, loras = request.loras.len(), "received job request");

        let image_ref = if self.config.encrypted_payloads {
            let secret = self.settings.require_secret()?;
            let decrypted = payload_codec::decrypt(&request.image_url, secret)?;
            String::from_utf8(decrypted).map_err(|e| {
                HandlerError::image_input(format!("decrypted image reference is not UTF-8: {e}"))
            })?
        } else {
            request.image_url.clone()
        };
        let input_image = fetch_input_image(
            &self.client,
            &image_ref,
            self.settings.retry_attempts,
            self.settings.retry_delay,
        )
        .await?;

        let cache = AssetCache::with_client(
            self.settings.lora_dir.clone(),
            self.settings.host_tokens(),
            self.client.clone(),
        );
        let mut selected_loras = Vec::with_capacity(request.loras.len());
        let mut lora_weights = Vec::with_capacity(request.loras.len());
        for lora in &request.loras {
            cache.ensure_present(lora).await?;
            selected_loras.push(stem_of(&lora.name));
            lora_weights.push(lora.weight());
        }
        let loaded_loras = cache.installed_names().await?;

        let args = JobArgs {
            params: serde_json::to_value(&request.config)?,
            input_image,
            loaded_loras,
            selected_loras,
            lora_weights,
        };
        let job_id = self
            .queue
            .submit(args)
            .await
            .map_err(|e| TrackerError::Queue { source: e })?;
        info!(request_id, job_id = %job_id, "submitted generation job");

        let secret = if self.config.encrypted_payloads {
            Some(self.settings.require_secret()?.to_owned())
        } else {
            None
        };
        let publisher = Arc::new(LocalPublisher::new(
            self.settings.upload_dir.clone(),
            request_id,
            secret,
            self.settings.retry_attempts,
            self.settings.retry_delay,
        ));
        let tracker_config = self
            .settings
            .tracker_config(request.config.total_second_length.max(1));

        if self.config.final_event_only {
            // Run the tracker against an internal channel and forward only
            // the terminal update.
            let (tx, mut rx) = mpsc::channel::<JobEvent>(32);
            let forward = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    if event.is_terminal() {
                        let _ = events.send(event).await;
                    }
                }
            });
            let tracker =
                ProgressTracker::new(self.queue.clone(), publisher, tracker_config, tx, token);
            let run_result = tracker.run(&job_id).await;
            drop(tracker);
            let _ = forward.await;
            run_result?;
        } else {
            let tracker =
                ProgressTracker::new(self.queue.clone(), publisher, tracker_config, events, token);
            tracker.run(&job_id).await?;
        }

        Ok(())
    }
}

/// File stem used as the backend-facing LoRA name.
fn stem_of(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
        .to_string()
}

/// Remove and recreate a directory, leaving it empty.
async fn reset_dir(dir: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    tokio::fs::create_dir_all(dir).await
}
