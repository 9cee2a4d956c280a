//! Job progress tracking.
//!
//! The generation backend exposes jobs as opaque snapshots behind a narrow
//! queue interface. This crate polls those snapshots into a deduplicated,
//! throttled stream of outward-facing [`JobEvent`]s: one `update` event per
//! status change and `progress` events whose percentage climbs monotonically
//! across segment boundaries even though the raw backend percentage resets
//! for every generated segment.

mod error;
mod events;
mod job;
pub mod markup;
mod publish;
mod queue;
pub mod testing;
mod tracker;

pub use error::{BoxError, TrackerError};
pub use events::{JobEvent, preview_data_uri};
pub use job::{Job, JobId, JobStatus, ProgressData};
pub use publish::ResultPublisher;
pub use queue::{JobArgs, JobQueue};
pub use tracker::{ProgressTracker, TrackerConfig};
