//! In-memory collaborator implementations for tests and examples.
//!
//! [`ScriptedQueue`] replays a fixed sequence of job snapshots, one per
//! poll; [`MemoryQueue`] is a minimal live queue whose jobs tests mutate
//! directly; [`MemoryPublisher`] records published paths.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::BoxError;
use crate::job::{Job, JobId};
use crate::publish::ResultPublisher;
use crate::queue::{JobArgs, JobQueue};

/// Replays scripted snapshots: each `job` lookup pops the next entry, and
/// the final entry repeats once the script is exhausted. `None` entries
/// model a queue that has forgotten the job.
#[derive(Default)]
pub struct ScriptedQueue {
    script: Mutex<VecDeque<Option<Job>>>,
    last: Mutex<Option<Option<Job>>>,
}

impl ScriptedQueue {
    pub fn new(snapshots: impl IntoIterator<Item = Option<Job>>) -> Self {
        Self {
            script: Mutex::new(snapshots.into_iter().collect()),
            last: Mutex::new(None),
        }
    }
}

#[async_trait]
impl JobQueue for ScriptedQueue {
    async fn submit(&self, _args: JobArgs) -> Result<JobId, BoxError> {
        Ok("scripted-job".to_string())
    }

    async fn job(&self, _id: &str) -> Result<Option<Job>, BoxError> {
        if let Some(next) = self.script.lock().pop_front() {
            *self.last.lock() = Some(next.clone());
            return Ok(next);
        }
        match self.last.lock().clone() {
            Some(last) => Ok(last),
            None => Ok(None),
        }
    }

    async fn queue_position(&self, _id: &str) -> Result<Option<usize>, BoxError> {
        Ok(Some(0))
    }
}

/// A minimal in-memory job queue.
///
/// `submit` registers the job as `Pending`; tests drive its lifecycle with
/// [`MemoryQueue::update`].
#[derive(Default)]
pub struct MemoryQueue {
    jobs: Mutex<HashMap<JobId, Job>>,
    pending_order: Mutex<Vec<JobId>>,
    submitted: Mutex<Vec<JobArgs>>,
    counter: AtomicUsize,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutate a job snapshot in place.
    pub fn update(&self, id: &str, mutate: impl FnOnce(&mut Job)) {
        if let Some(job) = self.jobs.lock().get_mut(id) {
            mutate(job);
        }
    }

    /// Arguments of every submitted job, in submission order.
    pub fn submissions(&self) -> Vec<JobArgs> {
        self.submitted.lock().clone()
    }

    /// Identifiers of every submitted job, in submission order.
    pub fn job_ids(&self) -> Vec<JobId> {
        self.pending_order.lock().clone()
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn submit(&self, args: JobArgs) -> Result<JobId, BoxError> {
        let id = format!("job-{}", self.counter.fetch_add(1, Ordering::SeqCst));
        self.jobs
            .lock()
            .insert(id.clone(), Job::new(id.clone(), crate::JobStatus::Pending));
        self.pending_order.lock().push(id.clone());
        self.submitted.lock().push(args);
        Ok(id)
    }

    async fn job(&self, id: &str) -> Result<Option<Job>, BoxError> {
        Ok(self.jobs.lock().get(id).cloned())
    }

    async fn queue_position(&self, id: &str) -> Result<Option<usize>, BoxError> {
        Ok(self.pending_order.lock().iter().position(|known| known == id))
    }
}

/// Records published result paths and returns predictable references.
#[derive(Default)]
pub struct MemoryPublisher {
    published: Mutex<Vec<PathBuf>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<PathBuf> {
        self.published.lock().clone()
    }
}

#[async_trait]
impl ResultPublisher for MemoryPublisher {
    async fn publish(&self, result: &Path) -> Result<String, BoxError> {
        self.published.lock().push(result.to_path_buf());
        Ok(format!("published://{}", result.display()))
    }
}
