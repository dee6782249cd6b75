//! Persistence and export collaborators.
//!
//! [`SettingsStore`] keeps the global configuration across sessions as
//! a JSON document keyed by a fixed namespace, and [`export`] bundles
//! finished artifacts into a single downloadable zip archive.

pub mod error;
pub mod export;
pub mod settings;

pub use error::StoreError;
pub use settings::SettingsStore;
