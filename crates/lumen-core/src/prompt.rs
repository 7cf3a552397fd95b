//! System-instruction prompt variants.
//!
//! Both texts are compiled into the binary. The variant is chosen once per run
//! and passed explicitly to the captioner.

use serde::{Deserialize, Serialize};
use std::fmt;

const ORIGINAL_PROMPT: &str = include_str!("../prompts/original.txt");
const OPTIMIZED_PROMPT: &str = include_str!("../prompts/optimized.txt");

/// Which system instruction to send with every caption request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptVariant {
    /// Exhaustive VLM-expert instruction
    Original,
    /// Condensed, ordered checklist
    #[default]
    Optimized,
}

impl PromptVariant {
    /// The system-instruction text for this variant.
    pub fn system_instruction(self) -> &'static str {
        match self {
            PromptVariant::Original => ORIGINAL_PROMPT,
            PromptVariant::Optimized => OPTIMIZED_PROMPT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PromptVariant::Original => "original",
            PromptVariant::Optimized => "optimized",
        }
    }
}

impl fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
