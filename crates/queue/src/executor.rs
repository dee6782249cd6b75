//! The executor seam between the scheduler and the remote service.
//!
//! The scheduler only needs "run this job to an artifact or an error";
//! everything about credentials, polling, and downloads stays behind
//! [`JobExecutor`]. Tests substitute a manually resolved fake.

use async_trait::async_trait;
use veobatch_client::{ArtifactFetcher, VideoGenerator};
use veobatch_core::{ArtifactHandle, Job};

/// Executes one admitted job to its terminal outcome.
#[async_trait]
pub trait JobExecutor: Send + Sync + 'static {
    /// Run the job's remote operation and materialize its artifact.
    ///
    /// Implementations must resolve every failure into the returned
    /// error; the scheduler records it as the job's failure message.
    async fn execute(&self, job: &Job) -> anyhow::Result<ArtifactHandle>;
}

/// Production executor: submit, poll until done, then download.
pub struct RemoteExecutor {
    generator: VideoGenerator,
    fetcher: ArtifactFetcher,
}

impl RemoteExecutor {
    pub fn new(generator: VideoGenerator, fetcher: ArtifactFetcher) -> Self {
        Self { generator, fetcher }
    }

    /// Build an executor with the process-wide default credential taken
    /// from the environment.
    pub fn from_env() -> Self {
        Self::new(VideoGenerator::from_env(), ArtifactFetcher::default())
    }
}

#[async_trait]
impl JobExecutor for RemoteExecutor {
    async fn execute(&self, job: &Job) -> anyhow::Result<ArtifactHandle> {
        let artifact = self.generator.submit_and_await(job).await?;
        let handle = self.fetcher.fetch(&artifact, &job.auth).await?;
        Ok(handle)
    }
}
