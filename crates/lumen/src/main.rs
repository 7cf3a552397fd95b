//! Lumen CLI - batch image captioning with Gemini.
//!
//! Lumen sends every image in a directory to a hosted multimodal model and
//! writes the caption next to it as `<name>.txt`. Requests go out one at a
//! time, spaced by a minimum interval to stay under the API rate limit.
//!
//! # Usage
//!
//! ```bash
//! # Caption a directory (key from flag or GEMINI_API_KEY)
//! lumen --input-dir ./photos --api-key "$GEMINI_API_KEY"
//!
//! # Slower pacing, original prompt, keep existing captions
//! lumen --input-dir ./photos --request-interval 10 --prompt-version original --skip-existing
//!
//! # View configuration
//! lumen config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Lumen - batch image captioning, one text file per image.
#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_negates_reqs = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(flatten)]
    caption: cli::caption::CaptionArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match lumen_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `lumen config path`."
            );
            lumen_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Lumen v{}", lumen_core::VERSION);

    match cli.command {
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None => cli::caption::execute(cli.caption, config).await,
    }
}
