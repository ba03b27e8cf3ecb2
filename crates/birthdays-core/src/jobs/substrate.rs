//! The execution substrate seam.
//!
//! A substrate accepts one-shot, delay-based jobs, runs each once at or after
//! its due time, and can drop every pending job sharing a tag. Persistence
//! and firing are its business; this crate only submits and cancels.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::alerts::PayloadMap;
use crate::error::{CoreError, Result};

pub type JobId = String;

/// A job as handed to the substrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Milliseconds from submission until the job is due.
    pub delay_ms: u64,
    pub tag: String,
    pub payload: PayloadMap,
}

/// Outcome of [`ExecutionSubstrate::replace`].
#[derive(Debug, Default)]
pub struct Replacement {
    /// Pending jobs dropped across all tags.
    pub cancelled: usize,
    /// One result per submitted request, in request order.
    pub submissions: Vec<Result<JobId>>,
}

pub trait ExecutionSubstrate: Send + Sync {
    /// Enqueue a one-shot job.
    fn submit(&self, request: JobRequest) -> Result<JobId>;

    /// Drop every pending job carrying `tag`. Returns how many were dropped;
    /// an unknown or empty tag is not an error.
    fn cancel_by_tag(&self, tag: &str) -> Result<usize>;

    /// Cancel every job under `tags`, then submit `requests`.
    ///
    /// The default runs [`cancel_by_tag`](Self::cancel_by_tag) and
    /// [`submit`](Self::submit) one after another, so a concurrent
    /// replacement can interleave with it. Substrates shared between
    /// processes override this to apply the whole replacement as one unit.
    ///
    /// # Errors
    /// Returns an error only when nothing could be applied at all.
    fn replace(&self, tags: &[&str], requests: Vec<JobRequest>) -> Result<Replacement> {
        let mut cancelled = 0;
        for tag in tags {
            match self.cancel_by_tag(tag) {
                Ok(n) => cancelled += n,
                Err(e) => tracing::warn!(tag = *tag, "cancel failed: {e}"),
            }
        }
        let submissions = requests.into_iter().map(|r| self.submit(r)).collect();
        Ok(Replacement {
            cancelled,
            submissions,
        })
    }
}

impl<T: ExecutionSubstrate + ?Sized> ExecutionSubstrate for Arc<T> {
    fn submit(&self, request: JobRequest) -> Result<JobId> {
        (**self).submit(request)
    }

    fn cancel_by_tag(&self, tag: &str) -> Result<usize> {
        (**self).cancel_by_tag(tag)
    }

    fn replace(&self, tags: &[&str], requests: Vec<JobRequest>) -> Result<Replacement> {
        (**self).replace(tags, requests)
    }
}

/// A pending job held by [`MemorySubstrate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryJob {
    pub id: JobId,
    pub request: JobRequest,
}

/// Process-local substrate. Jobs never fire on their own; callers inspect
/// [`MemorySubstrate::active`].
#[derive(Debug, Default)]
pub struct MemorySubstrate {
    jobs: Mutex<Vec<MemoryJob>>,
    rejected_tags: Vec<String>,
}

impl MemorySubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every submission carrying `tag`.
    pub fn rejecting(mut self, tag: impl Into<String>) -> Self {
        self.rejected_tags.push(tag.into());
        self
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<MemoryJob>>> {
        self.jobs
            .lock()
            .map_err(|_| CoreError::Substrate("job list poisoned".into()))
    }

    /// Snapshot of pending jobs in submission order.
    pub fn active(&self) -> Vec<MemoryJob> {
        self.lock().map(|jobs| jobs.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|jobs| jobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn with_tag(&self, tag: &str) -> Vec<MemoryJob> {
        self.active()
            .into_iter()
            .filter(|job| job.request.tag == tag)
            .collect()
    }
}

impl MemorySubstrate {
    fn push(&self, jobs: &mut Vec<MemoryJob>, request: JobRequest) -> Result<JobId> {
        if self.rejected_tags.contains(&request.tag) {
            return Err(CoreError::Substrate(format!("tag '{}' rejected", request.tag)));
        }
        let id = uuid::Uuid::new_v4().to_string();
        jobs.push(MemoryJob {
            id: id.clone(),
            request,
        });
        Ok(id)
    }
}

impl ExecutionSubstrate for MemorySubstrate {
    fn submit(&self, request: JobRequest) -> Result<JobId> {
        let mut jobs = self.lock()?;
        self.push(&mut jobs, request)
    }

    fn cancel_by_tag(&self, tag: &str) -> Result<usize> {
        let mut jobs = self.lock()?;
        let before = jobs.len();
        jobs.retain(|job| job.request.tag != tag);
        Ok(before - jobs.len())
    }

    fn replace(&self, tags: &[&str], requests: Vec<JobRequest>) -> Result<Replacement> {
        let mut jobs = self.lock()?;
        let before = jobs.len();
        jobs.retain(|job| !tags.contains(&job.request.tag.as_str()));
        let cancelled = before - jobs.len();
        let submissions = requests
            .into_iter()
            .map(|r| self.push(&mut jobs, r))
            .collect();
        Ok(Replacement {
            cancelled,
            submissions,
        })
    }
}
