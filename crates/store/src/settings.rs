//! Configuration persistence.
//!
//! The global configuration survives across sessions as one JSON file
//! named after a fixed namespace. Binary fields (the reference image)
//! are excluded from serialization by the config type itself and are
//! therefore never persisted. There is no schema versioning: unknown
//! fields are ignored and missing ones fall back to defaults on load.

use std::path::{Path, PathBuf};

use veobatch_core::GlobalConfig;

use crate::error::StoreError;

/// Fixed namespace the configuration is stored under.
pub const CONFIG_NAMESPACE: &str = "gemini_video_generator_config";

/// Loads and saves the global configuration under a directory.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Create a store rooted at `dir`, using the fixed namespace.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{CONFIG_NAMESPACE}.json")),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted configuration.
    ///
    /// A missing or unreadable file yields the built-in defaults: a
    /// corrupt store must never prevent the application from starting.
    pub fn load(&self) -> GlobalConfig {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) => {
                if error.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), %error, "Failed to read configuration");
                }
                return GlobalConfig::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "Failed to parse configuration, using defaults");
                GlobalConfig::default()
            }
        }
    }

    /// Persist the configuration, creating parent directories as needed.
    pub fn save(&self, config: &GlobalConfig) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "Configuration saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
