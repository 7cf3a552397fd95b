//! Captioner setup: input validation, config overrides, provider creation.

use lumen_core::config::expand_path;
use lumen_core::{BatchCaptioner, Config, PromptVariant, RunConfiguration};

use super::CaptionArgs;

/// Everything needed to run a batch, assembled by `setup_captioner()`.
pub(crate) struct CaptionContext {
    pub captioner: BatchCaptioner,
    pub run: RunConfiguration,
}

/// Validate input, layer CLI flags over the config, and build the captioner.
pub(crate) fn setup_captioner(
    args: &CaptionArgs,
    config: Config,
) -> anyhow::Result<CaptionContext> {
    let (run, config) = resolve_run(args, config)?;
    let captioner = lumen_core::build_captioner(&run, &config)?;
    Ok(CaptionContext { captioner, run })
}

/// Apply CLI overrides and produce the immutable run configuration.
pub(crate) fn resolve_run(
    args: &CaptionArgs,
    mut config: Config,
) -> anyhow::Result<(RunConfiguration, Config)> {
    let Some(input_dir) = args.input_dir.as_deref() else {
        anyhow::bail!("--input-dir is required");
    };
    let input_dir = expand_path(input_dir);

    if !input_dir.exists() {
        anyhow::bail!(
            "Input directory does not exist: {:?}\n\n  Hint: Check the path and try again.",
            input_dir
        );
    }
    if !input_dir.is_dir() {
        anyhow::bail!("Input path is not a directory: {:?}", input_dir);
    }

    let api_key = args
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| anyhow::anyhow!("API key is empty. Pass --api-key or set GEMINI_API_KEY."))?
        .to_string();

    if let Some(secs) = args.request_interval {
        config.captioning.request_interval_secs = secs;
    }
    if let Some(version) = args.prompt_version {
        config.captioning.prompt_version = version.into();
    }
    if args.skip_existing {
        config.captioning.skip_existing = true;
    }
    if let Some(ref model) = args.model {
        config.gemini.model = model.clone();
    }
    config.validate()?;

    let prompt_variant: PromptVariant = config.captioning.prompt_version;
    let run = RunConfiguration {
        input_dir,
        api_key,
        prompt_variant,
        min_interval: config.request_interval(),
    };

    Ok((run, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::caption::PromptVersion;
    use std::time::Duration;

    fn args_for(dir: &std::path::Path) -> CaptionArgs {
        CaptionArgs {
            input_dir: Some(dir.to_path_buf()),
            api_key: Some("key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn resolve_run_uses_config_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (run, config) = resolve_run(&args_for(dir.path()), Config::default()).unwrap();

        assert_eq!(run.min_interval, Duration::from_secs(6));
        assert_eq!(run.prompt_variant, PromptVariant::Optimized);
        assert_eq!(run.api_key, "key");
        assert!(!config.captioning.skip_existing);
    }

    #[test]
    fn resolve_run_applies_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let args = CaptionArgs {
            request_interval: Some(1.5),
            prompt_version: Some(PromptVersion::Original),
            skip_existing: true,
            model: Some("gemini-1.5-pro".to_string()),
            ..args_for(dir.path())
        };

        let (run, config) = resolve_run(&args, Config::default()).unwrap();
        assert_eq!(run.min_interval, Duration::from_millis(1500));
        assert_eq!(run.prompt_variant, PromptVariant::Original);
        assert!(config.captioning.skip_existing);
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
    }

    #[test]
    fn resolve_run_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_for(&dir.path().join("missing"));
        let err = resolve_run(&args, Config::default()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn resolve_run_rejects_file_as_input() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.jpg");
        std::fs::write(&file, b"x").unwrap();
        let err = resolve_run(&args_for(&file), Config::default()).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn resolve_run_rejects_blank_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let args = CaptionArgs {
            api_key: Some("  ".to_string()),
            ..args_for(dir.path())
        };
        let err = resolve_run(&args, Config::default()).unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn setup_captioner_builds_from_args() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = setup_captioner(&args_for(dir.path()), Config::default()).unwrap();
        assert_eq!(ctx.captioner.options().min_interval, Duration::from_secs(6));
        assert_eq!(ctx.run.input_dir, dir.path());
    }
}
