//! Batch captioner: the sequential read → request → write → throttle loop.
//!
//! Each eligible file is handled by [`BatchCaptioner::caption_file`], which
//! returns a `Result` instead of bailing out. [`BatchCaptioner::run`] only
//! sequences files, paces requests, logs, and reports results through a
//! callback. One file's failure never stops the batch.

use std::path::Path;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::CaptionConfig;
use crate::error::{CaptionError, LumenError};
use crate::llm::{CaptionProvider, CaptionRequest, ImageInput, SafetySetting};
use crate::prompt::PromptVariant;
use crate::types::{BatchSummary, CaptionOutcome, CaptionResult};

use super::discovery::{caption_path, DiscoveredFile, FileDiscovery};
use super::throttle::Throttle;

/// Options for one captioning run.
#[derive(Debug, Clone)]
pub struct CaptionOptions {
    /// Which system instruction to send
    pub prompt_variant: PromptVariant,
    /// User prompt sent alongside each image
    pub user_prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Minimum spacing between request starts
    pub min_interval: Duration,
    /// Upper bound on a single request
    pub timeout: Duration,
    /// Extension of the sidecar caption file
    pub caption_extension: String,
    /// Leave images with an existing caption file alone
    pub skip_existing: bool,
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self::from_config(&CaptionConfig::default(), Duration::from_secs(60))
    }
}

impl CaptionOptions {
    /// Build options from the `[captioning]` section and a request timeout.
    pub fn from_config(config: &CaptionConfig, timeout: Duration) -> Self {
        Self {
            prompt_variant: config.prompt_version,
            user_prompt: config.user_prompt.clone(),
            temperature: config.temperature,
            min_interval: Duration::from_secs_f64(config.request_interval_secs.max(0.0)),
            timeout,
            caption_extension: config.caption_extension.clone(),
            skip_existing: config.skip_existing,
        }
    }
}

/// Sequential captioner over a single provider.
pub struct BatchCaptioner {
    provider: Box<dyn CaptionProvider>,
    discovery: FileDiscovery,
    throttle: Throttle,
    options: CaptionOptions,
}

impl BatchCaptioner {
    pub fn new(
        provider: Box<dyn CaptionProvider>,
        discovery: FileDiscovery,
        options: CaptionOptions,
    ) -> Self {
        Self {
            provider,
            discovery,
            throttle: Throttle::new(options.min_interval),
            options,
        }
    }

    pub fn options(&self) -> &CaptionOptions {
        &self.options
    }

    /// List the eligible files in `dir` without processing them.
    pub fn discover(&self, dir: &Path) -> Result<Vec<DiscoveredFile>, LumenError> {
        self.discovery.discover(dir)
    }

    /// Caption every eligible file directly inside `dir`.
    ///
    /// Fails only if the directory cannot be listed.
    pub async fn run<F>(&self, dir: &Path, on_result: F) -> Result<BatchSummary, LumenError>
    where
        F: FnMut(&CaptionResult),
    {
        let files = self.discover(dir)?;
        Ok(self.run_files(&files, on_result).await)
    }

    /// Caption an already-discovered list of files, in order.
    pub async fn run_files<F>(&self, files: &[DiscoveredFile], mut on_result: F) -> BatchSummary
    where
        F: FnMut(&CaptionResult),
    {
        tracing::debug!(
            "Captioning {} file(s) with {} every {:.1}s",
            files.len(),
            self.provider.name(),
            self.throttle.min_interval().as_secs_f64()
        );
        let batch_start = Instant::now();
        let mut summary = BatchSummary::default();
        let mut previous_start: Option<Instant> = None;

        for file in files {
            let output = caption_path(&file.path, &self.options.caption_extension);

            if self.options.skip_existing && output.exists() {
                tracing::info!("Skipping {:?}: caption already exists", file.path);
                let result = CaptionResult {
                    source: file.path.clone(),
                    output,
                    outcome: Ok(CaptionOutcome::Skipped),
                };
                summary.record(&result);
                on_result(&result);
                continue;
            }

            // Spacing applies between attempted files only; no wait after the last one.
            if let Some(started) = previous_start {
                self.throttle.pace(started).await;
            }
            let started = Instant::now();
            previous_start = Some(started);

            let result = CaptionResult {
                source: file.path.clone(),
                output: output.clone(),
                outcome: self.caption_file(&file.path, &output).await,
            };
            log_result(&result);
            summary.record(&result);
            on_result(&result);
        }

        summary.elapsed = batch_start.elapsed();
        summary
    }

    /// Read, caption and write a single image.
    pub async fn caption_file(
        &self,
        path: &Path,
        output: &Path,
    ) -> Result<CaptionOutcome, CaptionError> {
        tracing::info!("Processing {}...", display_name(path));

        let bytes = tokio::fs::read(path).await.map_err(|e| CaptionError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let request = self.build_request(path, &bytes);
        let timeout = self.options.timeout.min(self.provider.timeout());

        let response = tokio::time::timeout(timeout, self.provider.caption(&request))
            .await
            .map_err(|_| CaptionError::Timeout {
                path: path.to_path_buf(),
                timeout_ms: timeout.as_millis() as u64,
            })??;

        let caption = response.text.trim();
        if caption.is_empty() {
            return Err(CaptionError::EmptyResponse {
                path: path.to_path_buf(),
                reason: response
                    .finish_reason
                    .unwrap_or_else(|| "empty text".to_string()),
            });
        }

        tokio::fs::write(output, caption)
            .await
            .map_err(|e| CaptionError::Write {
                path: output.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(CaptionOutcome::Written {
            caption: caption.to_string(),
            model: response.model,
            tokens_used: response.tokens_used,
            latency_ms: response.latency_ms,
        })
    }

    fn build_request(&self, path: &Path, bytes: &[u8]) -> CaptionRequest {
        CaptionRequest {
            path: path.to_path_buf(),
            image: ImageInput::from_bytes(bytes, path),
            prompt: self.options.user_prompt.clone(),
            system_instruction: self.options.prompt_variant.system_instruction().to_string(),
            safety: SafetySetting::block_none(),
            temperature: self.options.temperature,
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn log_result(result: &CaptionResult) {
    match &result.outcome {
        Ok(CaptionOutcome::Written {
            model,
            tokens_used,
            latency_ms,
            ..
        }) => match tokens_used {
            Some(tokens) => tracing::info!(
                "Saved caption to {:?} ({model}, {tokens} tokens, {latency_ms}ms)",
                result.output
            ),
            None => tracing::info!(
                "Saved caption to {:?} ({model}, {latency_ms}ms)",
                result.output
            ),
        },
        Ok(CaptionOutcome::Skipped) => {}
        Err(CaptionError::EmptyResponse { reason, .. }) => {
            tracing::warn!("No caption generated for {} ({reason})", result.file_name());
        }
        Err(e) => {
            tracing::error!("Error processing {}: {e}", result.file_name());
        }
    }
}
