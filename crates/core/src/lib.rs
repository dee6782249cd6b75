//! Pure domain types, constants, and validation for the batch video
//! generator.
//!
//! Everything in this crate is synchronous and I/O-free so it can be
//! unit-tested without a runtime. The scheduler, remote client, and
//! store crates all build on these types.

pub mod config;
pub mod error;
pub mod import;
pub mod job;
pub mod naming;
pub mod types;

pub use config::GlobalConfig;
pub use error::CoreError;
pub use job::{ArtifactHandle, AuthContext, ImageData, InputType, Job, JobSpec, JobStatus};
pub use types::{JobId, Timestamp};
