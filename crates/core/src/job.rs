//! The job model: one independent generation request and its lifecycle.
//!
//! A [`Job`] is created in [`JobStatus::Pending`] and driven through the
//! state machine exclusively by the scheduler (`Processing`, `Success`,
//! `Failed`) or by explicit user action (`Failed` back to `Pending` via
//! retry). Generation parameters are copied from the configuration in
//! effect at submission time and never change afterwards.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::GlobalConfig;
use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// Status and input type
// ---------------------------------------------------------------------------

/// Lifecycle status of a job.
///
/// Transitions: `Pending -> Processing -> Success | Failed`, and
/// `Failed -> Pending` on retry. Nothing else is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Waiting for a free slot under the concurrency budget.
    Pending,
    /// Admitted; a remote generation operation is in flight.
    Processing,
    /// Generation finished and the artifact was fetched locally.
    Success,
    /// Generation or download failed; retryable.
    Failed,
}

impl JobStatus {
    /// Whether the job has reached a user-visible terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }
}

/// What kind of input drives the generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputType {
    /// Prompt text only.
    TextToVideo,
    /// Prompt text plus a reference image.
    ImageToVideo,
}

// ---------------------------------------------------------------------------
// Supporting value types
// ---------------------------------------------------------------------------

/// An opaque binary image source captured at submission time.
///
/// Cheap to clone; the payload is shared, not copied.
#[derive(Debug, Clone)]
pub struct ImageData {
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl ImageData {
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into().into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

/// Credentials captured at submission time.
///
/// Both fields are optional: a missing API key falls back to the
/// process-wide default at execution time, and the cookie is only
/// attached to artifact downloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub api_key: Option<String>,
    pub cookie: Option<String>,
}

impl AuthContext {
    /// True when neither credential field carries a value.
    pub fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.cookie.is_none()
    }
}

/// A locally resolvable reference to a fetched artifact.
///
/// Wraps the downloaded bytes behind an `Arc` so queue snapshots can be
/// cloned without duplicating video payloads.
#[derive(Debug, Clone)]
pub struct ArtifactHandle {
    bytes: Arc<[u8]>,
}

impl ArtifactHandle {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into().into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// A prompt paired with the configuration snapshot it was submitted under.
///
/// This is the unit the scheduler's `submit` accepts; validation happens
/// there, before any [`Job`] is created.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub prompt: String,
    pub config: GlobalConfig,
}

impl JobSpec {
    pub fn new(prompt: impl Into<String>, config: GlobalConfig) -> Self {
        Self {
            prompt: prompt.into(),
            config,
        }
    }
}

/// One independent generation request.
///
/// Invariants upheld by the scheduler:
/// - `result` is set iff `status == Success`.
/// - `error` is set iff `status == Failed`.
/// - `image` is present whenever `input_type == ImageToVideo`.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub prompt: String,
    pub input_type: InputType,
    pub model: String,
    pub aspect_ratio: String,
    pub output_count: u32,
    pub image: Option<ImageData>,
    pub auth: AuthContext,
    pub status: JobStatus,
    pub result: Option<ArtifactHandle>,
    pub error: Option<String>,
    pub created_at: Timestamp,
}

impl Job {
    /// Create a new `Pending` job from a validated spec.
    ///
    /// Callers must have validated the spec already (non-blank prompt,
    /// image present for image-to-video); this constructor only copies.
    pub fn from_spec(spec: JobSpec) -> Self {
        let JobSpec { prompt, config } = spec;
        Self {
            id: JobId::new_v4(),
            prompt,
            input_type: config.input_type,
            model: config.model,
            aspect_ratio: config.aspect_ratio,
            output_count: config.output_count,
            image: config.image,
            auth: config.auth,
            status: JobStatus::Pending,
            result: None,
            error: None,
            created_at: chrono::Utc::now(),
        }
    }

    /// Whether the terminal-field invariant holds for the current status.
    pub fn invariants_hold(&self) -> bool {
        match self.status {
            JobStatus::Pending | JobStatus::Processing => {
                self.result.is_none() && self.error.is_none()
            }
            JobStatus::Success => self.result.is_some() && self.error.is_none(),
            JobStatus::Failed => self.result.is_none() && self.error.is_some(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobalConfig;

    #[test]
    fn new_job_starts_pending_with_no_outcome() {
        let job = Job::from_spec(JobSpec::new("a city at night", GlobalConfig::default()));
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
        assert!(job.invariants_hold());
    }

    #[test]
    fn job_ids_are_unique() {
        let config = GlobalConfig::default();
        let a = Job::from_spec(JobSpec::new("one", config.clone()));
        let b = Job::from_spec(JobSpec::new("two", config));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn parameters_are_copied_from_config_snapshot() {
        let mut config = GlobalConfig::default();
        config.model = "veo-3-quality".to_string();
        config.aspect_ratio = "9:16".to_string();
        config.output_count = 2;

        let job = Job::from_spec(JobSpec::new("prompt", config.clone()));

        // Later edits to the template must not affect the job.
        config.model = "veo-2-fast".to_string();
        assert_eq!(job.model, "veo-3-quality");
        assert_eq!(job.aspect_ratio, "9:16");
        assert_eq!(job.output_count, 2);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Success.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn artifact_handle_shares_payload_across_clones() {
        let handle = ArtifactHandle::new(vec![1u8, 2, 3]);
        let clone = handle.clone();
        assert_eq!(handle.bytes().as_ptr(), clone.bytes().as_ptr());
        assert_eq!(clone.len(), 3);
    }

    #[test]
    fn empty_auth_context() {
        assert!(AuthContext::default().is_empty());
        let auth = AuthContext {
            api_key: Some("k".into()),
            cookie: None,
        };
        assert!(!auth.is_empty());
    }
}
