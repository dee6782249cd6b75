//! HTTP client for the remote video-generation service.
//!
//! [`VideoGenerator`] drives the long-running generation operation
//! (submit, poll until terminal, extract the artifact reference) and
//! [`ArtifactFetcher`] downloads the produced video. Both are consumed
//! by the queue crate's executor; neither knows anything about job
//! lifecycle state.

pub mod api;
pub mod error;
pub mod fetcher;
pub mod generator;

pub use error::ClientError;
pub use fetcher::ArtifactFetcher;
pub use generator::{ArtifactRef, VideoGenerator};
