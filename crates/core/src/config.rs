//! Generation constants and the mutable configuration template.
//!
//! [`GlobalConfig`] is the template copied into each new job at
//! submission time. It round-trips through JSON for persistence, except
//! for the image payload, which is never serialized.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::job::{AuthContext, ImageData, InputType};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Generation models offered to the user, in display order.
pub const MODELS: &[&str] = &["veo-3-fast", "veo-3-quality", "veo-2-fast", "veo-2-quality"];

/// Supported output aspect ratios.
pub const ASPECT_RATIOS: &[&str] = &["1:1", "16:9", "9:16", "4:3", "3:4"];

/// Maximum number of jobs allowed in `Processing` simultaneously.
pub const MAX_CONCURRENCY: usize = 4;

/// Minimum videos a single job may request.
pub const MIN_OUTPUT_COUNT: u32 = 1;

/// Maximum videos a single job may request.
pub const MAX_OUTPUT_COUNT: u32 = 4;

/// Default model: first entry of [`MODELS`].
pub const DEFAULT_MODEL: &str = "veo-3-fast";

/// Default aspect ratio for new configurations.
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

// ---------------------------------------------------------------------------
// GlobalConfig
// ---------------------------------------------------------------------------

/// The configuration in effect when jobs are submitted.
///
/// Every field is copied into the job at submission; later edits never
/// affect already-created jobs. Unknown or missing fields deserialize to
/// the built-in defaults, so persisted configurations from older
/// versions load cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub input_type: InputType,
    pub model: String,
    pub aspect_ratio: String,
    pub output_count: u32,
    /// Reference image for image-to-video jobs. Never persisted.
    #[serde(skip)]
    pub image: Option<ImageData>,
    #[serde(flatten)]
    pub auth: AuthContext,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            input_type: InputType::TextToVideo,
            model: DEFAULT_MODEL.to_string(),
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
            output_count: 1,
            image: None,
            auth: AuthContext::default(),
        }
    }
}

impl GlobalConfig {
    /// Check that this template can produce valid jobs.
    ///
    /// Image-to-video requires a reference image at submission time;
    /// the output count must stay within the allowed range.
    pub fn validate_for_submit(&self) -> Result<(), CoreError> {
        if self.input_type == InputType::ImageToVideo && self.image.is_none() {
            return Err(CoreError::Validation(
                "Image to Video input type requires a reference image".to_string(),
            ));
        }
        validate_output_count(self.output_count)
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Validate that a requested output count is within `[1, 4]`.
pub fn validate_output_count(count: u32) -> Result<(), CoreError> {
    if (MIN_OUTPUT_COUNT..=MAX_OUTPUT_COUNT).contains(&count) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Output count must be between {MIN_OUTPUT_COUNT} and {MAX_OUTPUT_COUNT}, got {count}"
        )))
    }
}

/// Validate that a prompt carries visible content.
pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.trim().is_empty() {
        Err(CoreError::Validation(
            "Prompt must not be empty".to_string(),
        ))
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // -- defaults -------------------------------------------------------------

    #[test]
    fn default_config_is_valid() {
        assert!(GlobalConfig::default().validate_for_submit().is_ok());
    }

    #[test]
    fn default_model_is_first_listed() {
        assert_eq!(GlobalConfig::default().model, MODELS[0]);
    }

    // -- validate_output_count ------------------------------------------------

    #[test]
    fn output_count_bounds() {
        assert!(validate_output_count(1).is_ok());
        assert!(validate_output_count(4).is_ok());
        assert_matches!(validate_output_count(0), Err(CoreError::Validation(_)));
        assert_matches!(validate_output_count(5), Err(CoreError::Validation(_)));
    }

    // -- validate_prompt ------------------------------------------------------

    #[test]
    fn blank_prompts_rejected() {
        assert_matches!(validate_prompt(""), Err(CoreError::Validation(_)));
        assert_matches!(validate_prompt("   \t"), Err(CoreError::Validation(_)));
        assert!(validate_prompt("a dog surfing").is_ok());
    }

    // -- validate_for_submit --------------------------------------------------

    #[test]
    fn image_to_video_without_image_rejected() {
        let config = GlobalConfig {
            input_type: InputType::ImageToVideo,
            ..GlobalConfig::default()
        };
        assert_matches!(
            config.validate_for_submit(),
            Err(CoreError::Validation(msg)) if msg.contains("reference image")
        );
    }

    #[test]
    fn image_to_video_with_image_accepted() {
        let config = GlobalConfig {
            input_type: InputType::ImageToVideo,
            image: Some(ImageData::new(vec![0u8; 4], "image/png")),
            ..GlobalConfig::default()
        };
        assert!(config.validate_for_submit().is_ok());
    }

    // -- persistence round trip -----------------------------------------------

    #[test]
    fn image_is_never_serialized() {
        let config = GlobalConfig {
            image: Some(ImageData::new(vec![1u8, 2, 3], "image/png")),
            ..GlobalConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("image/png"));

        let restored: GlobalConfig = serde_json::from_str(&json).unwrap();
        assert!(restored.image.is_none());
        assert_eq!(restored.model, config.model);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let restored: GlobalConfig = serde_json::from_str(r#"{"model":"veo-2-fast"}"#).unwrap();
        assert_eq!(restored.model, "veo-2-fast");
        assert_eq!(restored.aspect_ratio, DEFAULT_ASPECT_RATIO);
        assert_eq!(restored.output_count, 1);
    }
}
