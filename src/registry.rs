//! In-memory job registry
//!
//! Owns every [`Job`] and guards them with a single mutex. The fetcher's
//! progress callback writes through it from worker tasks while request
//! handlers read from it, so the lock is a plain `std::sync::Mutex` that is
//! never held across an await point.

use crate::types::{Job, TaskId};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// Outcome of a progress update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// Progress advanced to the contained value
    Advanced(u8),
    /// Value was not higher than the current progress, or the job is complete
    Unchanged,
    /// No job with this id
    UnknownTask,
}

/// Mapping from task identifier to job state
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<TaskId, Job>>,
}

impl JobRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskId, Job>> {
        // Job fields are plain values; a poisoned lock still holds usable state.
        self.jobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the job for `task_id`, creating it if absent
    ///
    /// The check and the insert happen under one lock, so two concurrent
    /// callers with the same id observe exactly one `created == true`.
    /// `output_path` is only invoked when a job is created.
    pub fn get_or_create(
        &self,
        task_id: &TaskId,
        output_path: impl FnOnce() -> PathBuf,
    ) -> (Job, bool) {
        let mut jobs = self.lock();
        if let Some(job) = jobs.get(task_id) {
            return (job.clone(), false);
        }

        let job = Job {
            task_id: task_id.clone(),
            progress: 0,
            output_path: output_path(),
            completed: false,
            error: None,
            created_at: chrono::Utc::now().timestamp(),
            completed_at: None,
        };
        jobs.insert(task_id.clone(), job.clone());
        (job, true)
    }

    /// Raise the progress of a job
    ///
    /// Values are clamped to 100. Lower values than the current progress
    /// and updates to completed jobs are ignored.
    pub fn update_progress(&self, task_id: &TaskId, percent: u8) -> ProgressUpdate {
        let percent = percent.min(100);
        let mut jobs = self.lock();
        let Some(job) = jobs.get_mut(task_id) else {
            return ProgressUpdate::UnknownTask;
        };

        if job.completed || percent <= job.progress {
            return ProgressUpdate::Unchanged;
        }

        job.progress = percent;
        ProgressUpdate::Advanced(percent)
    }

    /// Force a job to 100% and flag it complete
    ///
    /// Returns false if the task is unknown.
    pub fn mark_complete(&self, task_id: &TaskId) -> bool {
        let mut jobs = self.lock();
        match jobs.get_mut(task_id) {
            Some(job) => {
                job.progress = 100;
                if !job.completed {
                    job.completed = true;
                    job.completed_at = Some(chrono::Utc::now().timestamp());
                }
                true
            }
            None => false,
        }
    }

    /// Record a fetch failure without touching progress
    pub fn mark_failed(&self, task_id: &TaskId, error: impl Into<String>) -> bool {
        let mut jobs = self.lock();
        match jobs.get_mut(task_id) {
            Some(job) => {
                job.error = Some(error.into());
                true
            }
            None => false,
        }
    }

    /// Progress of a job, 0 for unknown tasks
    pub fn get_progress(&self, task_id: &TaskId) -> u8 {
        self.lock().get(task_id).map(|job| job.progress).unwrap_or(0)
    }

    /// Snapshot of a job
    pub fn get(&self, task_id: &TaskId) -> Option<Job> {
        self.lock().get(task_id).cloned()
    }

    /// Number of jobs currently held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the registry holds no jobs
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop completed jobs whose completion time is before `cutoff` (Unix seconds)
    ///
    /// Incomplete jobs are never evicted, so an in-flight fetch always keeps
    /// its entry. Returns the number of jobs removed.
    pub fn evict_completed_before(&self, cutoff: i64) -> usize {
        let mut jobs = self.lock();
        let before = jobs.len();
        jobs.retain(|_, job| match job.completed_at {
            Some(completed_at) => completed_at >= cutoff,
            None => true,
        });
        before - jobs.len()
    }
}
