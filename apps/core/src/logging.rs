use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder as RollingBuilder, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "launchdeck";
const MAX_LOG_FILES: usize = 5;

static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

fn worker_guard_slot() -> &'static Mutex<Option<WorkerGuard>> {
    static SLOT: OnceLock<Mutex<Option<WorkerGuard>>> = OnceLock::new();
    SLOT.get_or_init(|| Mutex::new(None))
}

#[derive(Debug, Clone)]
pub struct LoggingGuard {
    pub log_dir: PathBuf,
    pub level: String,
}

pub fn logs_dir() -> PathBuf {
    crate::config::stable_app_data_dir().join("logs")
}

/// Installs the file subscriber. Safe to call twice; later calls keep the first subscriber.
pub fn init(cfg: &Config) -> Result<LoggingGuard, std::io::Error> {
    let log_dir = logs_dir();
    fs::create_dir_all(&log_dir)?;

    let file_appender = RollingBuilder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(&log_dir)
        .map_err(std::io::Error::other)?;
    let (file_writer, worker_guard) = tracing_appender::non_blocking(file_appender);

    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| cfg.log_level.clone());
    if !tracing::dispatcher::has_been_set() {
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(level.clone()))
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(file_writer),
            );
        if subscriber.try_init().is_ok() {
            if let Ok(mut slot) = worker_guard_slot().lock() {
                *slot = Some(worker_guard);
            }
        }
    }

    install_panic_hook();
    Ok(LoggingGuard { log_dir, level })
}

fn install_panic_hook() {
    let _ = PANIC_HOOK_INSTALLED.get_or_init(|| {
        let prior = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic payload unavailable".to_string());
            tracing::error!(event = "panic", location, payload);
            prior(panic_info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::logs_dir;

    #[test]
    fn logs_dir_uses_stable_app_data_layout() {
        let dir = logs_dir();
        assert!(dir
            .to_string_lossy()
            .to_ascii_lowercase()
            .contains("launchdeck"));
    }
}
