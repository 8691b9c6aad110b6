/*
[INPUT]:  Log settings (directory, file name, level, retention)
[OUTPUT]: Global tracing subscriber writing to a daily rolling file
[POS]:    Diagnostics - optional sink for the crate's tracing events
[UPDATE]: When changing log format, rotation or retention
*/

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::http::{BetaexError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogSettings {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// `EnvFilter` directive, e.g. `info` or `betaex_adapter=debug`
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            file_name: default_file_name(),
            level: default_level(),
            max_files: default_max_files(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("log")
}

fn default_file_name() -> String {
    "betaex.log".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_max_files() -> usize {
    30
}

/// Install the global subscriber. Keep the guard alive to flush on exit.
pub fn init_logging(settings: &LogSettings) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_new(&settings.level)
        .map_err(|err| BetaexError::Config(format!("invalid log level '{}': {err}", settings.level)))?;

    std::fs::create_dir_all(&settings.directory).map_err(|err| {
        BetaexError::Config(format!(
            "cannot create log directory {}: {err}",
            settings.directory.display()
        ))
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(settings.file_name.clone())
        .max_log_files(settings.max_files)
        .build(&settings.directory)
        .map_err(|err| BetaexError::Config(format!("cannot open log file: {err}")))?;

    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| BetaexError::Config(format!("initialize tracing subscriber: {err}")))?;

    Ok(guard)
}
