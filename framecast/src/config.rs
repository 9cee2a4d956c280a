//! Environment-derived runtime settings.
//!
//! All configuration comes from the process environment with sensible
//! defaults rooted under a single home directory; the embedding runtime
//! owns `.env` loading and persistence.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use asset_cache::HostToken;
use job_tracker::TrackerConfig;

use crate::error::HandlerError;
use crate::retry;

/// Runtime settings for the handler.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Shared secret for the payload codec. Optional until crypto is
    /// actually required.
    pub secret: Option<String>,
    /// Bearer token for Hugging Face hosted weights.
    pub hf_token: String,
    /// Bearer token for Civitai hosted weights.
    pub civitai_token: String,
    /// Cache directory for LoRA weight files.
    pub lora_dir: PathBuf,
    /// Directory the backend writes generated outputs into.
    pub output_dir: PathBuf,
    /// Root directory for published results.
    pub upload_dir: PathBuf,
    /// Queue poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Progress-throttle threshold in raw percentage points.
    pub update_threshold: u8,
    /// Retry attempts for transient I/O (image fetch, result upload).
    pub retry_attempts: u32,
    /// Fixed delay between retry attempts.
    pub retry_delay: Duration,
}

impl Settings {
    /// Build settings from the process environment.
    ///
    /// Creates the lora/output/upload directories if absent, so a fresh
    /// environment is usable without manual setup.
    pub fn from_env() -> Result<Self, HandlerError> {
        let home = env::var_os("FRAMECAST_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("framecast")))
            .unwrap_or_else(|| PathBuf::from(".framecast"));

        let settings = Self {
            secret: env::var("FRAMECAST_SECRET").ok().filter(|s| !s.is_empty()),
            hf_token: env::var("HF_TOKEN").unwrap_or_default(),
            civitai_token: env::var("CIVITAI_API_TOKEN").unwrap_or_default(),
            lora_dir: dir_var("FRAMECAST_LORAS_DIR", || home.join("loras")),
            output_dir: dir_var("FRAMECAST_OUTPUT_DIR", || home.join("outputs")),
            upload_dir: dir_var("FRAMECAST_UPLOAD_DIR", || home.join("uploads")),
            poll_interval_ms: parse_var("FRAMECAST_POLL_INTERVAL_MS", 500)?,
            update_threshold: parse_var("FRAMECAST_PROGRESS_THRESHOLD", 5)?,
            retry_attempts: retry::DEFAULT_ATTEMPTS,
            retry_delay: retry::DEFAULT_DELAY,
        };
        settings.ensure_directories()?;
        Ok(settings)
    }

    /// Create the working directories if they do not exist yet.
    pub fn ensure_directories(&self) -> Result<(), HandlerError> {
        for dir in [&self.lora_dir, &self.output_dir, &self.upload_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// The shared secret, or a configuration error when crypto is required
    /// but no secret is set.
    pub fn require_secret(&self) -> Result<&str, HandlerError> {
        self.secret.as_deref().ok_or_else(|| {
            HandlerError::configuration(
                "payload secret not provided and FRAMECAST_SECRET is not set",
            )
        })
    }

    /// Static table of per-host bearer tokens for asset downloads.
    pub fn host_tokens(&self) -> Vec<HostToken> {
        vec![
            HostToken::new("huggingface.co", self.hf_token.clone()),
            HostToken::new("civitai.com", self.civitai_token.clone()),
        ]
    }

    /// Tracker tuning for a job spanning `total_segments` segments.
    pub fn tracker_config(&self, total_segments: u32) -> TrackerConfig {
        TrackerConfig {
            poll_interval_ms: self.poll_interval_ms,
            update_threshold: self.update_threshold,
            total_segments,
        }
    }
}

fn dir_var(name: &str, default: impl FnOnce() -> PathBuf) -> PathBuf {
    env::var_os(name).map(PathBuf::from).unwrap_or_else(default)
}

fn parse_var<T>(name: &str, default: T) -> Result<T, HandlerError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| HandlerError::configuration(format!("invalid {name} `{raw}`: {e}"))),
        Err(_) => Ok(default),
    }
}
