//! Binary entrypoint for slideview.
//!
//! Scans a directory of photos and drives the loading engine through the
//! collection like a slideshow, logging ready events and statistics.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use slideview::decode::ImageDecoder;
use slideview::events::EngineEvent;

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "slideview", about = "Windowed photo loading engine demo")]
struct Cli {
    /// Directory to scan for photos
    photos: PathBuf,

    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Per-photo dwell time (ms)
    #[arg(long, value_name = "MILLIS", default_value_t = 2000)]
    delay_ms: u64,

    /// Stop after this many steps instead of looping forever
    #[arg(long, value_name = "COUNT")]
    steps: Option<usize>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("slideview={}", level).parse().unwrap());
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = match &cli.config {
        Some(path) => slideview::config::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => slideview::EngineConfiguration::default(),
    };
    cfg.validate().context("validating configuration")?;

    let photos = slideview::scan::scan_photos(&cli.photos)?;
    let count = photos.len();
    info!(count, "scanned images");

    let (handle, mut events, loader_task) = slideview::spawn(photos, Arc::new(ImageDecoder), cfg);

    let probe_cancel = CancellationToken::new();
    let probe = tokio::spawn(slideview::tasks::monitor::run(
        handle.clone(),
        Duration::from_secs(5),
        probe_cancel.clone(),
    ));

    let drain = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let EngineEvent::CurrentReady { index } = event {
                info!(index, "photo ready");
            }
        }
    });

    let dwell = Duration::from_millis(cli.delay_ms);
    info!(dwell = %humantime::format_duration(dwell), "starting slideshow");
    let mut index = 0usize;
    let mut steps = 0usize;
    loop {
        handle.set_current_index(index).await;
        handle.request_immediate(index).await;
        steps += 1;
        if cli.steps.is_some_and(|limit| steps >= limit) {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl-c; shutting down");
                break;
            }
            _ = sleep(dwell) => {
                index = (index + 1) % count;
            }
        }
    }

    let stats = handle.statistics();
    info!(
        hit_rate = stats.hit_rate,
        total_cost = stats.total_cost,
        resident = stats.resident_count,
        "final statistics"
    );

    probe_cancel.cancel();
    handle.shutdown();
    let _ = probe.await;
    loader_task.await??;
    let _ = drain.await;
    Ok(())
}
