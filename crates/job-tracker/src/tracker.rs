//! The polling loop that turns job snapshots into outward events.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::TrackerError;
use crate::events::{JobEvent, preview_data_uri};
use crate::job::{JobStatus, ProgressData};
use crate::markup::extract_progress;
use crate::publish::ResultPublisher;
use crate::queue::JobQueue;

/// Raw percentage at or above which a drop is read as a segment wrap
/// rather than backend jitter.
const WRAP_WATERMARK: i32 = 90;

/// Tuning for one tracking loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Interval between queue polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Minimum raw-percentage advance before another progress event is
    /// emitted.
    #[serde(default = "default_update_threshold")]
    pub update_threshold: u8,
    /// Number of backend segments (e.g. seconds of video) in this job.
    #[serde(default = "default_total_segments")]
    pub total_segments: u32,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_update_threshold() -> u8 {
    5
}

fn default_total_segments() -> u32 {
    1
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            update_threshold: default_update_threshold(),
            total_segments: default_total_segments(),
        }
    }
}

/// Per-job polling state, discarded when the job reaches a terminal state.
struct ProgressCursor {
    last_status: Option<JobStatus>,
    /// Last emitted raw percentage; -1 before the first emission and after
    /// each segment wrap so low percentages of a new segment pass the
    /// threshold check.
    last_percentage: i32,
    /// 1-based index of the segment currently being generated.
    segment: u32,
}

impl Default for ProgressCursor {
    fn default() -> Self {
        Self {
            last_status: None,
            last_percentage: -1,
            segment: 1,
        }
    }
}

/// Polls one job until it reaches a terminal state, emitting [`JobEvent`]s.
///
/// Single cooperative consumer: one loop per job, no internal tasks, and no
/// shared mutable state between concurrently tracked jobs. Cancelling the
/// token exits the loop early without a terminal event.
pub struct ProgressTracker {
    queue: Arc<dyn JobQueue>,
    publisher: Arc<dyn ResultPublisher>,
    config: TrackerConfig,
    events: mpsc::Sender<JobEvent>,
    token: CancellationToken,
}

impl ProgressTracker {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        publisher: Arc<dyn ResultPublisher>,
        config: TrackerConfig,
        events: mpsc::Sender<JobEvent>,
        token: CancellationToken,
    ) -> Self {
        Self {
            queue,
            publisher,
            config,
            events,
            token,
        }
    }

    /// Drive the polling loop for `job_id` until terminal or cancelled.
    pub async fn run(&self, job_id: &str) -> Result<(), TrackerError> {
        let mut cursor = ProgressCursor::default();
        let mut poll = tokio::time::interval(Duration::from_millis(
            self.config.poll_interval_ms.max(1),
        ));
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = self.token.cancelled() => {
                    info!(job_id, "tracking cancelled");
                    return Ok(());
                }

                _ = poll.tick() => {}
            }

            let job = self
                .queue
                .job(job_id)
                .await
                .map_err(|e| TrackerError::Queue { source: e })?
                .ok_or_else(|| TrackerError::JobLost {
                    id: job_id.to_string(),
                })?;

            if cursor.last_status != Some(job.status) {
                info!(job_id, status = ?job.status, "job status changed");
                let result = match (job.status, &job.result) {
                    (JobStatus::Completed, Some(path)) => Some(
                        self.publisher
                            .publish(path)
                            .await
                            .map_err(|e| TrackerError::Publish { source: e })?,
                    ),
                    _ => None,
                };
                self.emit(JobEvent::Update {
                    status: job.status,
                    error: job.error.clone(),
                    result,
                })
                .await?;
            }

            match job.status {
                JobStatus::Pending => {
                    if let Ok(Some(position)) = self.queue.queue_position(job_id).await {
                        debug!(job_id, position, "job pending in queue");
                    }
                }
                JobStatus::Running => {
                    if let Some(data) = &job.progress_data {
                        self.handle_progress(data, &mut cursor).await?;
                    }
                }
                JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled => break,
            }

            cursor.last_status = Some(job.status);
        }

        Ok(())
    }

    async fn handle_progress(
        &self,
        data: &ProgressData,
        cursor: &mut ProgressCursor,
    ) -> Result<(), TrackerError> {
        let Some(html) = data.html.as_deref() else {
            return Ok(());
        };
        let (percentage, message) = extract_progress(html);
        let Some(percentage) = percentage else {
            return Ok(());
        };
        let raw = i32::from(percentage);

        // The raw percentage dropping after the high-water mark means the
        // backend finished one segment and started the next.
        if cursor.last_percentage >= WRAP_WATERMARK && raw < cursor.last_percentage {
            cursor.segment += 1;
            cursor.last_percentage = -1;
            debug!(segment = cursor.segment, "progress wrapped to a new segment");
        }

        if raw != cursor.last_percentage {
            debug!(
                percentage = raw,
                segment = cursor.segment,
                message = message.as_deref().unwrap_or(""),
                "raw progress"
            );
        }

        if cursor.last_percentage + i32::from(self.config.update_threshold) >= raw {
            return Ok(());
        }
        cursor.last_percentage = raw;

        let overall = overall_percentage(cursor.segment, percentage, self.config.total_segments);
        let preview = data.preview.as_deref().and_then(preview_data_uri);

        self.emit(JobEvent::Progress {
            percentage: overall,
            preview,
            description: data.desc.clone().unwrap_or_default(),
            message,
        })
        .await
    }

    async fn emit(&self, event: JobEvent) -> Result<(), TrackerError> {
        self.events
            .send(event)
            .await
            .map_err(|_| TrackerError::ChannelClosed)
    }
}

/// Blend completed segments and the current segment's raw percentage into
/// one overall figure.
///
/// Non-decreasing across segment boundaries and exactly 100 only when the
/// final segment reports a raw 100.
fn overall_percentage(segment: u32, current: u8, total_segments: u32) -> u8 {
    let total = total_segments.max(1);
    let blended = segment.saturating_sub(1) * 100 + u32::from(current);
    // Integer floor keeps 100 reserved for the final segment's raw 100.
    (blended / total).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_is_non_decreasing_across_wraps() {
        // Raw sequence wraps twice over three segments.
        let observations = [
            (1, 10u8),
            (1, 50),
            (1, 95),
            (2, 5),
            (2, 60),
            (2, 98),
            (3, 10),
            (3, 100),
        ];
        let mut last = 0;
        for (segment, raw) in observations {
            let overall = overall_percentage(segment, raw, 3);
            assert!(
                overall >= last,
                "overall dropped from {last} to {overall} at segment {segment} raw {raw}"
            );
            last = overall;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn hundred_only_at_final_segment() {
        assert!(overall_percentage(1, 100, 3) < 100);
        assert!(overall_percentage(2, 100, 3) < 100);
        assert_eq!(overall_percentage(3, 100, 3), 100);
    }

    #[test]
    fn single_segment_passes_raw_through() {
        assert_eq!(overall_percentage(1, 0, 1), 0);
        assert_eq!(overall_percentage(1, 37, 1), 37);
        assert_eq!(overall_percentage(1, 100, 1), 100);
    }

    #[test]
    fn zero_total_segments_is_clamped() {
        assert_eq!(overall_percentage(1, 50, 0), 50);
    }
}
