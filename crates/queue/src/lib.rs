//! The job queue scheduler.
//!
//! [`Scheduler`] owns the ordered job collection, enforces the FIFO
//! admission policy under the concurrency budget, and supervises each
//! admitted job's execution through a [`JobExecutor`]. The production
//! executor, [`RemoteExecutor`], composes the remote generation client
//! with the artifact fetcher.

pub mod executor;
pub mod scheduler;

pub use executor::{JobExecutor, RemoteExecutor};
pub use scheduler::Scheduler;
