//! Top-level captioning: `lumen --input-dir <DIR> --api-key <KEY>`.

mod batch;
mod setup;
pub mod types;

pub use types::PromptVersion;

use clap::Args;
use lumen_core::Config;
use std::path::PathBuf;

use batch::caption_directory;
use setup::setup_captioner;

/// Arguments for captioning a directory.
///
/// Flattened into the root command so the common case needs no subcommand.
#[derive(Args, Debug, Default)]
pub struct CaptionArgs {
    /// Directory of images to caption (not searched recursively)
    #[arg(long, value_name = "DIR", required = true)]
    pub input_dir: Option<PathBuf>,

    /// API key for the Gemini API
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, required = true)]
    pub api_key: Option<String>,

    /// Minimum seconds between requests [default: 6.0]
    #[arg(long, value_name = "SECS", value_parser = parse_interval)]
    pub request_interval: Option<f64>,

    /// System instruction variant [default: optimized]
    #[arg(long, value_enum)]
    pub prompt_version: Option<PromptVersion>,

    /// Leave images that already have a caption file untouched
    #[arg(long)]
    pub skip_existing: bool,

    /// Gemini model name (overrides the config file)
    #[arg(long)]
    pub model: Option<String>,
}

fn parse_interval(s: &str) -> Result<f64, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number of seconds"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("request interval must be >= 0, got {s}"));
    }
    Ok(secs)
}

/// Caption every eligible image in the input directory.
pub async fn execute(args: CaptionArgs, config: Config) -> anyhow::Result<()> {
    let ctx = setup_captioner(&args, config)?;
    caption_directory(&ctx.captioner, &ctx.run.input_dir).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_args_default_leaves_overrides_unset() {
        let args = CaptionArgs::default();
        assert!(args.input_dir.is_none());
        assert!(args.request_interval.is_none());
        assert!(args.prompt_version.is_none());
        assert!(args.model.is_none());
        assert!(!args.skip_existing);
    }

    #[test]
    fn parse_interval_accepts_fractions() {
        assert_eq!(parse_interval("6.0"), Ok(6.0));
        assert_eq!(parse_interval("0"), Ok(0.0));
        assert_eq!(parse_interval("0.25"), Ok(0.25));
    }

    #[test]
    fn parse_interval_rejects_bad_values() {
        assert!(parse_interval("-1").is_err());
        assert!(parse_interval("soon").is_err());
        assert!(parse_interval("inf").is_err());
    }
}
