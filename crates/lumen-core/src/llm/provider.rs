//! Caption provider trait and request/response types.
//!
//! Defines the narrow interface the captioner talks to, so the batch loop and
//! its throttling can be exercised with a fake provider.

use crate::error::CaptionError;
use async_trait::async_trait;
use base64::Engine;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base64-encoded image ready to send to the inference API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type, when the extension maps to one
    pub media_type: Option<String>,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and the file's path.
    ///
    /// The MIME type is derived from the extension only; unknown
    /// extensions leave it unset rather than guessing.
    pub fn from_bytes(bytes: &[u8], path: &Path) -> Self {
        let media_type = media_type_for(path);
        if media_type.is_none() {
            tracing::debug!("No MIME type for {:?}, sending without one", path);
        }

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.map(String::from),
        }
    }
}

/// Map a file extension to an image MIME type.
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Content-safety categories the service can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// Blocking threshold for a harm category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
}

/// One category/threshold pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    /// Disable all four built-in filters so captioning never refuses on content.
    pub fn block_none() -> Vec<SafetySetting> {
        [
            HarmCategory::Harassment,
            HarmCategory::HateSpeech,
            HarmCategory::SexuallyExplicit,
            HarmCategory::DangerousContent,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: HarmBlockThreshold::BlockNone,
        })
        .collect()
    }
}

/// A request to caption one image.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    /// Source file, for logging and error context
    pub path: PathBuf,
    /// The image to caption
    pub image: ImageInput,
    /// User prompt sent next to the image
    pub prompt: String,
    /// System instruction for the selected prompt variant
    pub system_instruction: String,
    /// Safety thresholds
    pub safety: Vec<SafetySetting>,
    /// Sampling temperature
    pub temperature: f32,
}

/// The response from a caption call.
#[derive(Debug, Clone, Default)]
pub struct CaptionResponse {
    /// Generated text, untrimmed; empty when the model produced nothing
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Why generation stopped or was blocked, if reported
    pub finish_reason: Option<String>,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that caption backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the captioner holds a `Box<dyn CaptionProvider>`).
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini").
    fn name(&self) -> &str;

    /// Generate a caption for the given request.
    async fn caption(&self, request: &CaptionRequest) -> Result<CaptionResponse, CaptionError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}
