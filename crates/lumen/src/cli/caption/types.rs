//! CLI enum types for the caption command.

use clap::ValueEnum;
use lumen_core::PromptVariant;

/// System instruction variants selectable from the command line.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum PromptVersion {
    /// Exhaustive VLM-expert instruction
    Original,
    /// Condensed checklist instruction (default)
    Optimized,
}

impl From<PromptVersion> for PromptVariant {
    fn from(version: PromptVersion) -> Self {
        match version {
            PromptVersion::Original => PromptVariant::Original,
            PromptVersion::Optimized => PromptVariant::Optimized,
        }
    }
}

impl std::fmt::Display for PromptVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptVersion::Original => write!(f, "original"),
            PromptVersion::Optimized => write!(f, "optimized"),
        }
    }
}
