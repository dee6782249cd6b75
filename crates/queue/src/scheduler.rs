//! Job queue scheduler: lifecycle state, admission, and supervision.
//!
//! The scheduler owns the ordered job collection behind a single mutex.
//! Every mutation goes through one [`apply`](Scheduler::apply) choke
//! point, which also publishes a fresh snapshot to watchers, and
//! [`reconcile`](Scheduler::reconcile) runs synchronously after every
//! transition so that a freed slot admits the next pending job
//! immediately — there is no background timer.
//!
//! Admission is strict FIFO over the pending set, capped by the
//! concurrency budget. Completion callbacks re-locate their job by id;
//! a job deleted while in flight makes its callback a logged no-op.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use veobatch_core::config::MAX_CONCURRENCY;
use veobatch_core::{ArtifactHandle, CoreError, Job, JobId, JobSpec, JobStatus};

use crate::executor::JobExecutor;

/// A single state mutation, applied atomically at one choke point.
enum Transition {
    /// Append freshly created pending jobs.
    Append(Vec<Job>),
    /// Move pending jobs into processing, oldest first, up to the free
    /// budget. Selection and transition happen under one lock so two
    /// racing admission passes can never share the same free slot.
    AdmitPending,
    /// Record an admitted job's terminal outcome.
    Complete {
        id: JobId,
        outcome: Result<ArtifactHandle, String>,
    },
    /// Reset a failed job back to pending.
    Retry(JobId),
    /// Remove a job in any state.
    Remove(JobId),
}

/// Supervises the job queue. Cheap to clone; all clones share state.
pub struct Scheduler<E: JobExecutor> {
    inner: Arc<Inner<E>>,
}

impl<E: JobExecutor> Clone for Scheduler<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<E> {
    executor: E,
    budget: usize,
    jobs: Mutex<Vec<Job>>,
    snapshot_tx: watch::Sender<Vec<Job>>,
}

impl<E: JobExecutor> Scheduler<E> {
    /// Create a scheduler with the standard concurrency budget.
    pub fn new(executor: E) -> Self {
        Self::with_budget(executor, MAX_CONCURRENCY)
    }

    /// Create a scheduler with an explicit concurrency budget.
    pub fn with_budget(executor: E, budget: usize) -> Self {
        let (snapshot_tx, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                executor,
                budget,
                jobs: Mutex::new(Vec::new()),
                snapshot_tx,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // User operations
    // -----------------------------------------------------------------------

    /// Submit a batch of job specs.
    ///
    /// Blank-prompt specs are filtered out; the rest are validated as a
    /// whole before any job is created, so a batch either fully enters
    /// the queue or leaves it untouched. New jobs are appended in input
    /// order and admission runs immediately.
    ///
    /// Must be called from within a Tokio runtime: admitted jobs spawn
    /// their execution tasks.
    pub fn submit(&self, specs: Vec<JobSpec>) -> Result<Vec<JobId>, CoreError> {
        let specs: Vec<JobSpec> = specs
            .into_iter()
            .filter(|spec| !spec.prompt.trim().is_empty())
            .collect();
        if specs.is_empty() {
            return Err(CoreError::Validation(
                "At least one non-empty prompt is required".to_string(),
            ));
        }
        for spec in &specs {
            spec.config.validate_for_submit()?;
        }

        let jobs: Vec<Job> = specs.into_iter().map(Job::from_spec).collect();
        let ids: Vec<JobId> = jobs.iter().map(|job| job.id).collect();

        tracing::info!(count = ids.len(), "Jobs submitted to queue");
        self.apply(Transition::Append(jobs));
        self.reconcile();
        Ok(ids)
    }

    /// Reset a failed job to pending, clearing its outcome fields.
    ///
    /// Only legal for jobs currently in `Failed`; the retried job
    /// re-enters admission under the normal policy.
    ///
    /// Must be called from within a Tokio runtime: a freed slot spawns
    /// the next job's execution task.
    pub fn retry(&self, id: JobId) -> Result<(), CoreError> {
        if self.apply(Transition::Retry(id)).is_empty() {
            return Err(CoreError::Validation(format!(
                "No failed job with id {id} to retry"
            )));
        }
        tracing::info!(job_id = %id, "Job queued for retry");
        self.reconcile();
        Ok(())
    }

    /// Remove a job from the queue regardless of status.
    ///
    /// An in-flight remote operation is not cancelled; its eventual
    /// completion callback finds no job under this id and does nothing.
    /// Returns whether a job was removed.
    ///
    /// Must be called from within a Tokio runtime: a freed slot spawns
    /// the next job's execution task.
    pub fn delete(&self, id: JobId) -> bool {
        let removed = !self.apply(Transition::Remove(id)).is_empty();
        if removed {
            tracing::info!(job_id = %id, "Job deleted");
            self.reconcile();
        }
        removed
    }

    // -----------------------------------------------------------------------
    // Admission
    // -----------------------------------------------------------------------

    /// Admit pending jobs up to the free budget, oldest first, and start
    /// their execution tasks.
    ///
    /// Runs after every transition. Calling it again with no state
    /// change admits nothing further. The free-slot computation and the
    /// status transitions happen in one critical section, so concurrent
    /// reconciliations (a retry racing a completion, say) cannot both
    /// fill the same slot.
    ///
    /// Must be called from within a Tokio runtime: admitted jobs spawn
    /// their execution tasks.
    pub fn reconcile(&self) {
        for job in self.apply(Transition::AdmitPending) {
            tracing::info!(job_id = %job.id, prompt = %job.prompt, "Job admitted");
            self.spawn_execution(job);
        }
    }

    /// Run one admitted job on a detached task and record its outcome.
    fn spawn_execution(&self, job: Job) {
        let scheduler = self.clone();
        tokio::spawn(async move {
            let id = job.id;
            let outcome = scheduler
                .inner
                .executor
                .execute(&job)
                .await
                .map_err(|error| format!("{error:#}"));
            scheduler.complete(id, outcome);
        });
    }

    /// Record a terminal outcome for `id`, then admit the next job.
    ///
    /// Tolerates completions for jobs deleted while in flight.
    fn complete(&self, id: JobId, outcome: Result<ArtifactHandle, String>) {
        match &outcome {
            Ok(_) => tracing::info!(job_id = %id, "Job succeeded"),
            Err(message) => tracing::warn!(job_id = %id, error = %message, "Job failed"),
        }
        self.apply(Transition::Complete { id, outcome });
        self.reconcile();
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Current queue contents in insertion order.
    pub fn snapshot(&self) -> Vec<Job> {
        self.lock_jobs().clone()
    }

    /// Watch the queue: receivers get a fresh snapshot on every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Job>> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Number of jobs currently in `Processing`.
    pub fn processing_count(&self) -> usize {
        self.count_status(JobStatus::Processing)
    }

    /// Number of jobs waiting for admission.
    pub fn pending_count(&self) -> usize {
        self.count_status(JobStatus::Pending)
    }

    /// Number of jobs that finished with an artifact.
    pub fn success_count(&self) -> usize {
        self.count_status(JobStatus::Success)
    }

    fn count_status(&self, status: JobStatus) -> usize {
        self.lock_jobs()
            .iter()
            .filter(|job| job.status == status)
            .count()
    }

    // -----------------------------------------------------------------------
    // The choke point
    // -----------------------------------------------------------------------

    /// Apply one transition under the lock and publish the new snapshot.
    ///
    /// Returns post-transition clones of the affected jobs; an empty
    /// vector means the transition did not apply (unknown id, wrong
    /// source state, nothing admissible). `Append` always applies and
    /// returns nothing.
    fn apply(&self, transition: Transition) -> Vec<Job> {
        let (changed, affected) = {
            let mut jobs = self.lock_jobs();
            match transition {
                Transition::Append(mut batch) => {
                    jobs.append(&mut batch);
                    (true, Vec::new())
                }
                Transition::AdmitPending => {
                    let processing = jobs
                        .iter()
                        .filter(|job| job.status == JobStatus::Processing)
                        .count();
                    let free = self.inner.budget.saturating_sub(processing);
                    let mut admitted = Vec::new();
                    for job in jobs
                        .iter_mut()
                        .filter(|job| job.status == JobStatus::Pending)
                        .take(free)
                    {
                        job.status = JobStatus::Processing;
                        admitted.push(job.clone());
                    }
                    (!admitted.is_empty(), admitted)
                }
                Transition::Complete { id, outcome } => match find_mut(&mut jobs, id) {
                    Some(job) if job.status == JobStatus::Processing => {
                        match outcome {
                            Ok(handle) => {
                                job.status = JobStatus::Success;
                                job.result = Some(handle);
                                job.error = None;
                            }
                            Err(message) => {
                                job.status = JobStatus::Failed;
                                job.result = None;
                                job.error = Some(message);
                            }
                        }
                        (true, vec![job.clone()])
                    }
                    Some(_) => (false, Vec::new()),
                    None => {
                        tracing::debug!(
                            job_id = %id,
                            "Dropping completion for a job no longer in the queue",
                        );
                        (false, Vec::new())
                    }
                },
                Transition::Retry(id) => match find_mut(&mut jobs, id) {
                    Some(job) if job.status == JobStatus::Failed => {
                        job.status = JobStatus::Pending;
                        job.error = None;
                        job.result = None;
                        (true, vec![job.clone()])
                    }
                    _ => (false, Vec::new()),
                },
                Transition::Remove(id) => {
                    match jobs.iter().position(|job| job.id == id) {
                        Some(index) => {
                            let job = jobs.remove(index);
                            (true, vec![job])
                        }
                        None => (false, Vec::new()),
                    }
                }
            }
        };

        if changed {
            self.publish();
        }
        affected
    }

    /// Push the current queue contents to all watchers.
    fn publish(&self) {
        let snapshot = self.snapshot();
        self.inner.snapshot_tx.send_replace(snapshot);
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, Vec<Job>> {
        self.inner.jobs.lock().expect("job queue lock poisoned")
    }
}

fn find_mut(jobs: &mut [Job], id: JobId) -> Option<&mut Job> {
    jobs.iter_mut().find(|job| job.id == id)
}
