//! Batch captioning with a progress bar and a closing summary.

use std::path::Path;

use lumen_core::{BatchCaptioner, BatchSummary, CaptionResult, DiscoveredFile, FileDiscovery};

/// Caption every eligible file in `dir` and report the outcome.
///
/// Returns an error only when the directory cannot be listed or when every
/// attempted file failed; partial failures are reported in the summary.
pub async fn caption_directory(
    captioner: &BatchCaptioner,
    dir: &Path,
) -> anyhow::Result<BatchSummary> {
    let files = captioner.discover(dir)?;
    if files.is_empty() {
        tracing::warn!("No supported image files found in {:?}", dir);
        return Ok(BatchSummary::default());
    }

    let options = captioner.options();
    tracing::info!(
        "Found {} image(s) to caption ({} prompt, {:.1}s interval)",
        files.len(),
        options.prompt_variant,
        options.min_interval.as_secs_f64()
    );

    let summary = caption_batch(captioner, &files).await;

    if summary.all_failed() {
        anyhow::bail!(
            "All {} attempted image(s) failed. Check the API key, model name and network.",
            summary.attempted()
        );
    }
    Ok(summary)
}

/// Caption the discovered files, updating a progress bar as each one finishes.
pub async fn caption_batch(
    captioner: &BatchCaptioner,
    files: &[DiscoveredFile],
) -> BatchSummary {
    let progress = create_progress_bar(files.len() as u64);
    let total_bytes = FileDiscovery::total_size(files);

    let summary = captioner
        .run_files(files, |result: &CaptionResult| {
            progress.inc(1);
            progress.set_message(result.file_name());
        })
        .await;

    progress.finish_and_clear();
    print_summary(&summary, total_bytes);
    summary
}

/// Create a progress bar for batch captioning.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(concat!(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] ",
            "{pos}/{len} ({percent}%) {msg}",
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch captioning.
fn print_summary(summary: &BatchSummary, total_bytes: u64) {
    let elapsed = summary.elapsed.as_secs_f64();
    let rate = if elapsed > 0.0 {
        summary.attempted() as f64 * 60.0 / elapsed
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Captioned:    {:>8}", summary.captioned);
    if summary.empty > 0 {
        eprintln!("    No caption:   {:>8}", summary.empty);
    }
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    if summary.skipped > 0 {
        eprintln!("    Skipped:      {:>8}", summary.skipped);
    }
    eprintln!("  ------------------------------------");
    eprintln!(
        "    Total:        {:>8}",
        summary.attempted() + summary.skipped
    );
    eprintln!("    Input size:   {:>7.1} MB", total_bytes as f64 / 1_000_000.0);
    eprintln!("    Duration:     {:>7.1}s", elapsed);
    eprintln!("    Rate:         {:>7.1} img/min", rate);
    eprintln!("  ====================================");
}
