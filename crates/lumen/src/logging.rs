//! Logging setup for the `lumen` binary.
//!
//! Events go to stderr so they interleave with the progress bar and never
//! mix with anything a caller pipes from stdout.

use lumen_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive for the configured level.
///
/// `--verbose` raises anything quieter than `debug` to `debug`; a configured
/// `trace` is kept.
fn level_directive(level: &str, verbose: bool) -> String {
    let level = level.trim().to_ascii_lowercase();
    if verbose && level != "trace" {
        "debug".to_string()
    } else {
        level
    }
}

/// `RUST_LOG` wins when set; otherwise the directive from the config.
fn build_filter(level: &str, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(level, verbose)))
}

/// Install the global subscriber from the `[logging]` section and CLI flags.
pub fn init_from_config(config: &Config, verbose: bool, json_logs: bool) {
    let filter = build_filter(&config.logging.level, verbose);
    let json_format = json_logs || config.logging.format.eq_ignore_ascii_case("json");

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    fn enabled_under(directive: String, level: Level) -> bool {
        let subscriber = tracing_subscriber::registry().with(EnvFilter::new(directive));
        tracing::subscriber::with_default(subscriber, || match level {
            Level::ERROR => tracing::enabled!(Level::ERROR),
            Level::WARN => tracing::enabled!(Level::WARN),
            Level::INFO => tracing::enabled!(Level::INFO),
            Level::DEBUG => tracing::enabled!(Level::DEBUG),
            _ => tracing::enabled!(Level::TRACE),
        })
    }

    #[test]
    fn warn_level_suppresses_info() {
        let directive = level_directive("warn", false);
        assert_eq!(directive, "warn");
        assert!(enabled_under(directive.clone(), Level::WARN));
        assert!(!enabled_under(directive, Level::INFO));
    }

    #[test]
    fn error_level_suppresses_warn() {
        let directive = level_directive("error", false);
        assert!(enabled_under(directive.clone(), Level::ERROR));
        assert!(!enabled_under(directive, Level::WARN));
    }

    #[test]
    fn verbose_raises_to_debug() {
        assert_eq!(level_directive("warn", true), "debug");
        assert_eq!(level_directive("info", true), "debug");
        assert!(enabled_under(level_directive("warn", true), Level::DEBUG));
    }

    #[test]
    fn verbose_keeps_trace() {
        assert_eq!(level_directive("trace", true), "trace");
    }

    #[test]
    fn level_is_case_insensitive() {
        assert_eq!(level_directive(" WARN ", false), "warn");
    }
}
