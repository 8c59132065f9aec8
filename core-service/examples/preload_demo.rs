//! Preload demonstration against a real font origin
//!
//! Downloads the priority pages into a scratch directory, printing progress
//! as pages settle, then shows the cache statistics.
//!
//! Run with:
//! ```bash
//! cargo run -p core-service --example preload_demo -- https://cdn.example.com/fonts/
//!
//! # Custom app directory and JSON logs
//! cargo run -p core-service --example preload_demo -- \
//!     https://cdn.example.com/fonts/ /tmp/mushaf json
//! ```

use anyhow::{bail, Context};
use bridge_traits::LogLevel;
use core_runtime::events::RecvError;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::{CoreEvent, FontEvent, PreloadOutcome};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let Some(origin) = args.get(1).cloned() else {
        bail!("usage: preload_demo <font-origin> [app-dir] [pretty|json|compact]");
    };
    let app_dir = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("mushaf-preload-demo"));
    let format = match args.get(3).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };

    init_logging(
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Debug),
    )
    .context("failed to initialize logging")?;

    let core = core_service::bootstrap_desktop(origin, &app_dir)
        .await
        .context("failed to bootstrap core service")?;
    info!(assets_dir = ?core.assets_dir(), pages = core.preload_pages().len(), "Core ready");

    let mut events = core.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };
            if let CoreEvent::Fonts(FontEvent::PageProgress {
                page,
                current,
                total,
                percentage,
                success,
                ..
            }) = event
            {
                let mark = if success { "ok" } else { "FAILED" };
                println!("[{:>3}%] {:>3}/{} page {:>3} {}", percentage, current, total, page, mark);
            }
        }
    });

    match core.start_preload().await? {
        PreloadOutcome::AlreadyPreloaded => info!("Fonts were already preloaded"),
        PreloadOutcome::AlreadyRunning => warn!("A preload is already running"),
        PreloadOutcome::Completed(report) => info!(
            downloaded = report.downloaded(),
            from_cache = report.from_cache(),
            "Preload completed"
        ),
        PreloadOutcome::PartiallyFailed(report) => warn!(
            failed_pages = ?report.failed_pages(),
            "Preload partially failed; run again to retry"
        ),
    }

    let stats = core.cache_stats().await;
    println!(
        "cached pages: {} ({} KiB)",
        stats.total_cached,
        stats.total_size_bytes / 1024
    );

    drop(core);
    printer.abort();
    Ok(())
}
