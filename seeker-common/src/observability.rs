//! Logging setup for the `seeker` binary and its integration tests.
//!
//! Standard output carries the streamed answer, so events go to a daily
//! rolling file and, when asked, to `stderr`. Never to stdout.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Utc;
use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Overrides the log directory when [`LogConfig::log_dir`] is unset.
pub const LOG_DIR_ENV: &str = "SEEKER_LOG_DIR";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Used as the log file prefix and the default directory name.
    pub app_name: &'static str,
    pub log_dir: Option<PathBuf>,
    /// Duplicate events to `stderr`.
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: &'static str,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "seeker",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info",
        }
    }
}

impl LogConfig {
    /// Explicit directory, then `SEEKER_LOG_DIR`, then the platform data dir.
    pub fn resolve_dir(&self) -> PathBuf {
        let env_dir = std::env::var_os(LOG_DIR_ENV).map(PathBuf::from);
        match self.log_dir.clone().or(env_dir) {
            Some(dir) => with_home(&dir),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(self.app_name),
        }
    }

    /// Name the daily appender gives today's file (it rotates on UTC dates).
    fn file_for_today(&self) -> String {
        format!("{}.{}.log", self.app_name, Utc::now().format("%Y-%m-%d"))
    }

    fn layers<W>(&self, file: W) -> Vec<Box<dyn Layer<Registry> + Send + Sync>>
    where
        W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
    {
        let stderr = self.emit_stderr;
        match self.format {
            LogFormat::Text => {
                let mut layers = vec![fmt::layer().with_writer(file).with_ansi(false).boxed()];
                if stderr {
                    layers.push(fmt::layer().with_writer(std::io::stderr).boxed());
                }
                layers
            }
            LogFormat::Json => {
                let mut layers = vec![fmt::layer().json().with_writer(file).boxed()];
                if stderr {
                    layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
                }
                layers
            }
        }
    }
}

/// Install the global subscriber and return today's log file.
///
/// Only the first call installs anything. Later calls return the path
/// resolved by the first one.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = config.resolve_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.app_name)
        .filename_suffix("log")
        .build(&dir)
        .context("failed to open rolling log file")?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter));

    tracing_subscriber::registry()
        .with(config.layers(writer))
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let path = dir.join(config.file_for_today());
    let _ = LOG_PATH.set(path.clone());
    Ok(path)
}

fn with_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let config = LogConfig {
            log_dir: Some(PathBuf::from("/var/log/seeker")),
            ..LogConfig::default()
        };
        assert_eq!(config.resolve_dir(), PathBuf::from("/var/log/seeker"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else { return };
        assert_eq!(with_home(Path::new("~/logs")), home.join("logs"));
        assert_eq!(with_home(Path::new("logs/x")), PathBuf::from("logs/x"));
    }

    #[test]
    fn file_name_carries_prefix_and_date() {
        let name = LogConfig::default().file_for_today();
        assert!(name.starts_with("seeker."));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "seeker.2026-01-01.log".len());
    }
}
