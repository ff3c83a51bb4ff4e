//! Telemetry setup

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::{LogFormat, LoggingSettings};
use crate::error::AppError;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. When `file_dir` is set, a JSON
/// copy of every event goes to a daily rolling file through a non-blocking
/// writer; the returned guard must stay alive until shutdown or buffered
/// lines are lost.
pub fn init_telemetry(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, AppError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| AppError::TelemetryError(e.to_string()))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    match settings.format {
        LogFormat::Json => layers.push(
            fmt::layer()
                .json()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_thread_ids(true)
                .boxed(),
        ),
        LogFormat::Pretty => layers.push(
            fmt::layer()
                .pretty()
                .with_writer(std::io::stdout)
                .with_target(true)
                .boxed(),
        ),
    }

    let guard = match settings.file_dir.as_deref() {
        Some(dir) => {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("backoffice")
                .filename_suffix("log")
                .build(dir)
                .map_err(|e| AppError::TelemetryError(e.to_string()))?;
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            layers.push(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false) // No colors in file
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| AppError::TelemetryError(e.to_string()))?;

    Ok(guard)
}
