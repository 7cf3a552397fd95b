//! Inference-service integration for caption generation.
//!
//! Provides the provider abstraction the captioner depends on and the Gemini
//! `generateContent` implementation behind it.

pub(crate) mod gemini;
pub(crate) mod provider;

pub use gemini::{GeminiProvider, DEFAULT_GEMINI_ENDPOINT};
pub use provider::{
    media_type_for, CaptionProvider, CaptionRequest, CaptionResponse, HarmBlockThreshold,
    HarmCategory, ImageInput, SafetySetting,
};
