use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pixel_squeeze::cli::Args;
use pixel_squeeze::config::Settings;
use pixel_squeeze::constants::{
    COMPRESSION_RATIO_PREFIX, LOADING_MESSAGE, ORIGINAL_SIZE_PREFIX, PROCESSED_SIZE_PREFIX,
    SUCCESS_PREFIX,
};
use pixel_squeeze::presenter::{present, render_html, Presentation};
use pixel_squeeze::{error, info, logger, verbose, warn, ImageEngine, JobState, Session};
use rayon::ThreadPoolBuilder;
use std::fs;
use std::process::ExitCode;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let settings = args.into_settings()?;

    logger::init(settings.quiet, settings.verbose);
    setup_thread_pool(settings.threads);
    settings.validate()?;

    let source = settings
        .load_source()
        .with_context(|| format!("failed to read {}", settings.input.display()))?;

    info!("🗜️  {} {:?}", settings.options.mode, settings.input);
    verbose!(
        "format={} quality={} target={}KB max-dimension={}",
        settings.options.output_format.as_str(),
        settings.options.quality,
        settings.options.target_size_kb,
        settings.max_width_or_height
    );

    let mut session = Session::new(
        ImageEngine::new(),
        settings.max_width_or_height,
        settings.use_worker,
    );

    let pending = session.select(source, settings.options);
    let spinner = loading_spinner(&settings);
    let completion = pending.run().await;
    spinner.finish_and_clear();
    session.complete(completion);

    let presentation = present(session.state());
    if let Some(report) = &settings.report {
        fs::write(report, render_html(&presentation))
            .with_context(|| format!("failed to write report {}", report.display()))?;
        verbose!("Report written to {:?}", report);
    }

    match session.state() {
        JobState::Ready(_) => {
            show_result(&presentation, &settings)?;
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            if let Some(message) = &presentation.error {
                error!("{}", message);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn setup_thread_pool(threads: Option<usize>) {
    if let Some(num_threads) = threads {
        ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .unwrap_or_else(|e| {
                warn!("Failed to set thread pool size: {}", e);
            });
    }
}

fn loading_spinner(settings: &Settings) -> ProgressBar {
    if settings.quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(LOADING_MESSAGE);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn show_result(presentation: &Presentation, settings: &Settings) -> anyhow::Result<()> {
    if let Some(original) = &presentation.original {
        info!("{} {}", ORIGINAL_SIZE_PREFIX, original.describe());
    }

    let Some(processed) = &presentation.processed else {
        return Ok(());
    };

    info!("{} {}", PROCESSED_SIZE_PREFIX, processed.preview.describe());
    info!("{} {:.1}%", COMPRESSION_RATIO_PREFIX, processed.ratio);
    if processed.ratio < 0.0 {
        warn!("File size increased by {:.1}%", processed.ratio.abs());
    }

    let path = processed
        .download
        .save_to(&settings.output_dir)
        .with_context(|| format!("failed to save into {}", settings.output_dir.display()))?;
    info!("{} {}: {}", SUCCESS_PREFIX, processed.heading, path.display());

    Ok(())
}
