//! Lumen Core - batch image captioning library.
//!
//! Lumen walks a directory of images, sends each one to a hosted multimodal
//! model, and writes the returned caption next to the image as a `.txt` file.
//!
//! # Architecture
//!
//! A single sequential loop, no workers and no queues:
//!
//! ```text
//! Scan → Filter by extension → Read → generateContent → Write .txt → Throttle
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen_core::{Config, PromptVariant, RunConfiguration};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> lumen_core::Result<()> {
//!     let config = Config::load()?;
//!     let run = RunConfiguration {
//!         input_dir: "./photos".into(),
//!         api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
//!         prompt_variant: PromptVariant::Optimized,
//!         min_interval: Duration::from_secs(6),
//!     };
//!     let summary = lumen_core::run(&run, &config).await?;
//!     println!("Captioned {} image(s)", summary.captioned);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{CaptionError, ConfigError, LumenError, Result};
pub use llm::{CaptionProvider, GeminiProvider};
pub use pipeline::{BatchCaptioner, CaptionOptions, DiscoveredFile, FileDiscovery};
pub use prompt::PromptVariant;
pub use types::{BatchSummary, CaptionOutcome, CaptionResult, RunConfiguration};

use std::time::Duration;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build a Gemini-backed captioner for a run.
///
/// Values in `run` take precedence over the matching `config` fields.
/// Fails fast on an empty credential or an invalid configuration.
pub fn build_captioner(run: &RunConfiguration, config: &Config) -> Result<BatchCaptioner> {
    if run.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "API key is empty. Pass --api-key or set GEMINI_API_KEY.".into(),
        )
        .into());
    }
    config.validate()?;

    let timeout = Duration::from_millis(config.gemini.timeout_ms);
    let provider = GeminiProvider::with_endpoint(
        run.api_key.trim(),
        &config.gemini.model,
        &config.gemini.endpoint,
        timeout,
    );

    let options = CaptionOptions {
        prompt_variant: run.prompt_variant,
        min_interval: run.min_interval,
        ..CaptionOptions::from_config(&config.captioning, timeout)
    };

    Ok(BatchCaptioner::new(
        Box::new(provider),
        FileDiscovery::new(&config.captioning),
        options,
    ))
}

/// Caption every eligible image in `run.input_dir`.
///
/// Per-file errors are logged and counted in the summary; only setup
/// failures (bad credential, bad config, unreadable directory) are returned.
pub async fn run(run: &RunConfiguration, config: &Config) -> Result<BatchSummary> {
    let captioner = build_captioner(run, config)?;
    captioner.run(&run.input_dir, |_| {}).await
}
