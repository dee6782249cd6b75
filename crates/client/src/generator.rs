//! Submit-and-poll driver for remote generation operations.
//!
//! [`VideoGenerator`] resolves the effective credential for a job,
//! submits the generation request, and polls the operation handle until
//! it reports completion. API clients are cached per key so jobs sharing
//! a credential reuse the same [`VeoApi`] instance; the cache key is the
//! key value itself, so concurrent jobs with different credentials never
//! share a client.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use veobatch_core::Job;

use crate::api::{VeoApi, DEFAULT_BASE_URL};
use crate::error::ClientError;

/// Delay between successive polls of an in-flight operation.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Reference to a generated artifact, ready for download.
///
/// Carries the API key the operation ran under because the download
/// endpoint requires the same key as a query parameter.
#[derive(Debug, Clone)]
pub struct ArtifactRef {
    pub uri: String,
    pub api_key: String,
}

/// Drives generation operations against the remote service.
pub struct VideoGenerator {
    http: reqwest::Client,
    base_url: String,
    default_api_key: Option<String>,
    poll_interval: Duration,
    /// [`VeoApi`] instances cached by API key. Reuse is a performance
    /// optimization only; correctness never depends on a cache hit.
    clients: Mutex<HashMap<String, Arc<VeoApi>>>,
}

impl VideoGenerator {
    /// Create a generator with an optional process-wide default API key.
    pub fn new(default_api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_api_key,
            poll_interval: POLL_INTERVAL,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Create a generator whose default key comes from the
    /// `GEMINI_API_KEY` environment variable, if set.
    pub fn from_env() -> Self {
        Self::new(std::env::var("GEMINI_API_KEY").ok())
    }

    /// Override the service base URL (tests, self-hosted proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the poll cadence (tests).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Submit a job's generation request and await the artifact reference.
    ///
    /// Polls the operation handle at the configured interval until the
    /// service reports it done. There is no poll timeout: an operation
    /// the service never completes is polled indefinitely.
    ///
    /// Fails with [`ClientError::Configuration`] when no credential is
    /// available, and [`ClientError::RemoteService`] when the completed
    /// operation carries an error payload or no download link.
    pub async fn submit_and_await(&self, job: &Job) -> Result<ArtifactRef, ClientError> {
        let api = self.api_for(job.auth.api_key.as_deref())?;

        let mut operation = api.generate_videos(job).await?;
        tracing::info!(
            job_id = %job.id,
            operation = %operation.name,
            model = %job.model,
            "Generation operation submitted",
        );

        while !operation.done {
            tokio::time::sleep(self.poll_interval).await;
            operation = api.get_operation(&operation.name).await?;
        }

        if let Some(error) = operation.error {
            return Err(ClientError::RemoteService(error.message));
        }

        let uri = operation.first_video_uri().ok_or_else(|| {
            ClientError::RemoteService(
                "generation succeeded, but no download link was found".to_string(),
            )
        })?;

        tracing::info!(job_id = %job.id, "Generation operation completed");

        Ok(ArtifactRef {
            uri: uri.to_string(),
            api_key: api.api_key().to_string(),
        })
    }

    /// Resolve the [`VeoApi`] for a job, preferring its per-job key over
    /// the process-wide default.
    fn api_for(&self, override_key: Option<&str>) -> Result<Arc<VeoApi>, ClientError> {
        let effective = override_key
            .filter(|k| !k.is_empty())
            .or(self.default_api_key.as_deref())
            .ok_or_else(|| {
                ClientError::Configuration(
                    "provide an API key in the configuration or set GEMINI_API_KEY".to_string(),
                )
            })?;

        let mut clients = self.clients.lock().expect("client cache lock poisoned");
        let api = clients.entry(effective.to_string()).or_insert_with(|| {
            Arc::new(VeoApi::new(
                self.http.clone(),
                self.base_url.clone(),
                effective,
            ))
        });
        Ok(Arc::clone(api))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // -- credential resolution ------------------------------------------------

    #[test]
    fn missing_credential_is_a_configuration_error() {
        let generator = VideoGenerator::new(None);
        assert_matches!(
            generator.api_for(None),
            Err(ClientError::Configuration(_))
        );
    }

    #[test]
    fn empty_override_falls_back_to_default() {
        let generator = VideoGenerator::new(Some("default-key".to_string()));
        let api = generator.api_for(Some("")).unwrap();
        assert_eq!(api.api_key(), "default-key");
    }

    #[test]
    fn per_job_key_wins_over_default() {
        let generator = VideoGenerator::new(Some("default-key".to_string()));
        let api = generator.api_for(Some("job-key")).unwrap();
        assert_eq!(api.api_key(), "job-key");
    }

    // -- client cache ---------------------------------------------------------

    #[test]
    fn same_key_reuses_the_cached_client() {
        let generator = VideoGenerator::new(Some("k".to_string()));
        let a = generator.api_for(None).unwrap();
        let b = generator.api_for(None).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_keys_get_distinct_clients() {
        let generator = VideoGenerator::new(None);
        let a = generator.api_for(Some("alpha")).unwrap();
        let b = generator.api_for(Some("beta")).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.api_key(), "alpha");
        assert_eq!(b.api_key(), "beta");
    }
}
