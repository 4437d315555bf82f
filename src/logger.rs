use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants::{LOGS_DIR, LOG_FILE_NAME};

const DEFAULT_LOG_LEVEL: &str = "info";

pub fn init_logger(dir: impl AsRef<Path>, file_name: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_target(false).with_ansi(false).with_writer(file_writer))
        .init();

    guard
}

pub fn init_default_logger() -> WorkerGuard {
    init_logger(LOGS_DIR, LOG_FILE_NAME)
}
