//! Sub-configuration structs with their defaults.

use crate::llm::DEFAULT_GEMINI_ENDPOINT;
use crate::prompt::PromptVariant;
use serde::{Deserialize, Serialize};

/// Captioning loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Image extensions eligible for captioning (case-insensitive, no dot)
    pub supported_formats: Vec<String>,

    /// Extension of the sidecar caption file
    pub caption_extension: String,

    /// Minimum seconds between the start of consecutive requests
    pub request_interval_secs: f64,

    /// System instruction variant
    pub prompt_version: PromptVariant,

    /// User prompt sent alongside every image
    pub user_prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Leave images that already have a caption file untouched
    pub skip_existing: bool,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "heic".to_string(),
            ],
            caption_extension: "txt".to_string(),
            request_interval_secs: 6.0,
            prompt_version: PromptVariant::Optimized,
            user_prompt: "Caption the image. Never use gender-neutral language.".to_string(),
            temperature: 0.7,
            skip_existing: false,
        }
    }
}

/// Gemini API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL (without the `/models/...` suffix)
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            model: "gemini-2.0-flash-exp".to_string(),
            timeout_ms: 60_000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
