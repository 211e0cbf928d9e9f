//! Telemetry and logging initialization.
//!
//! Sets up structured logging with tracing and optional JSON output.

use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::{
    fmt, fmt::MakeWriter, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

// The file writer's guard must live for the entire program duration
static LOG_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(None);

/// Initialize telemetry from the logging section of the config.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    match &config.log_file {
        Some(path) => init_telemetry_with_file(&config.level, path, config.format == "json"),
        None => init_telemetry(&config.level, config.format == "json"),
    }
}

/// Initialize telemetry on stderr.
pub fn init_telemetry(log_level: &str, json_format: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(log_level)?;

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}

/// Initialize telemetry with file output.
pub fn init_telemetry_with_file(
    log_level: &str,
    log_file: &std::path::Path,
    json_format: bool,
) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(log_level)?;

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer(non_blocking, json_format))
        .try_init()?;

    if let Ok(mut g) = LOG_GUARD.lock() {
        *g = Some(guard);
    }

    Ok(())
}

/// Plain-text or JSON fmt layer without ANSI colors.
fn file_layer<S, W>(writer: W, json_format: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_ansi(false).with_writer(writer);
    if json_format {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}
