//! Core data types for the Lumen captioning pipeline.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CaptionError;
use crate::prompt::PromptVariant;

/// Everything a single run needs that is not file-level configuration.
///
/// Built once by the caller and read-only for the rest of the run.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    /// Directory whose direct entries are captioned
    pub input_dir: PathBuf,

    /// Credential for the inference service
    pub api_key: String,

    /// System instruction variant
    pub prompt_variant: PromptVariant,

    /// Minimum spacing between the start of consecutive requests
    pub min_interval: Duration,
}

/// What happened to a file that did not error.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptionOutcome {
    /// Caption text was written to the output path
    Written {
        caption: String,
        model: String,
        tokens_used: Option<u32>,
        latency_ms: u64,
    },
    /// A caption file already existed and skip-existing is on
    Skipped,
}

/// Per-file record handed to the batch callback.
#[derive(Debug)]
pub struct CaptionResult {
    /// The image that was captioned
    pub source: PathBuf,

    /// Where the caption was (or would have been) written
    pub output: PathBuf,

    /// Outcome, or the error that stopped this file
    pub outcome: Result<CaptionOutcome, CaptionError>,
}

impl CaptionResult {
    /// The caption text, if one was written.
    pub fn caption(&self) -> Option<&str> {
        match &self.outcome {
            Ok(CaptionOutcome::Written { caption, .. }) => Some(caption),
            _ => None,
        }
    }

    /// File name of the source, for log lines.
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Counts for a completed batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// Files with a caption written
    pub captioned: usize,

    /// Files where the service returned no text
    pub empty: usize,

    /// Files that hit a read, request, timeout or write error
    pub failed: usize,

    /// Files left alone because a caption already existed
    pub skipped: usize,

    /// Wall-clock time for the whole batch
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Files for which a request was attempted (everything but skips).
    pub fn attempted(&self) -> usize {
        self.captioned + self.empty + self.failed
    }

    /// True when at least one file was attempted and every attempt hard-failed.
    pub fn all_failed(&self) -> bool {
        self.failed > 0 && self.failed == self.attempted()
    }

    pub(crate) fn record(&mut self, result: &CaptionResult) {
        match &result.outcome {
            Ok(CaptionOutcome::Written { .. }) => self.captioned += 1,
            Ok(CaptionOutcome::Skipped) => self.skipped += 1,
            Err(e) if !e.is_failure() => self.empty += 1,
            Err(_) => self.failed += 1,
        }
    }
}
