//! Tracing setup: console output always, plus a daily log file in production.

use crate::infrastructure::config::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Chromium's protocol chatter is only useful when debugging the driver itself.
const QUIET_TARGETS: &str = "chromiumoxide=warn,hyper=info,reqwest=info";

fn console_filter(is_production: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if is_production { "info" } else { "debug" };
        EnvFilter::new(format!("{level},{QUIET_TARGETS}"))
    })
}

/// Install the global subscriber. `RUST_LOG` overrides the console level.
///
/// In production the file layer writes `webook.log.<date>` under `<config_dir>/webook/logs`
/// through a background writer; keep the returned guard alive until exit so buffered lines
/// are flushed.
pub fn setup(is_production: bool) -> Option<WorkerGuard> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_filter(console_filter(is_production));

    let log_dir = paths::log_dir();
    let (file_layer, guard) = match is_production.then(|| std::fs::create_dir_all(&log_dir)) {
        Some(Ok(())) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "webook.log"));
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(format!("info,{QUIET_TARGETS}")));
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!("Warning: cannot create log directory {:?}: {}", log_dir, e);
            (None, None)
        }
        None => (None, None),
    };
    let file_enabled = file_layer.is_some();

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    if file_enabled {
        tracing::info!("Writing logs to {:?}", log_dir);
    }
    tracing::debug!(production = is_production, "Logging initialized");
    guard
}
