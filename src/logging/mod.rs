//! Composite loggers built from the `logger` configuration section.
//!
//! A [`Logger`] owns its own `tracing` dispatcher instead of installing a
//! global subscriber, so it can be rebuilt on every reconfiguration and
//! several of them (framework and wire client) can coexist.

mod sink;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{Dispatch, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;

pub use sink::Console;

use crate::config::Configuration;
use crate::error::{Error, Result};
use sink::Sinks;

pub const FRAMEWORK_LOGGER: &str = "flyq_framework";
pub const KAFKA_CLIENT_LOGGER: &str = "flyq_client";

/// Typed view of the `logger` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    pub file: Option<PathBuf>,
    pub level: String,
    pub stdout_json: bool,
    #[serde(alias = "ruby_kafka")]
    pub kafka_client: Option<KafkaClientLoggerSettings>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
            stdout_json: false,
            kafka_client: None,
        }
    }
}

impl LoggerSettings {
    /// The log file, unless unset or empty.
    pub fn file_path(&self) -> Option<&Path> {
        self.file.as_deref().filter(|p| !p.as_os_str().is_empty())
    }
}

/// `logger.kafka_client`: diagnostics of the wire client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KafkaClientLoggerSettings {
    pub level: String,
}

impl Default for KafkaClientLoggerSettings {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
        }
    }
}

/// Accepts the usual level names plus `fatal`, which maps to `error`.
pub fn parse_level(name: &str) -> Result<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "fatal" => Ok(LevelFilter::ERROR),
        other => other
            .parse::<LevelFilter>()
            .map_err(|_| Error::InvalidLogLevel(name.to_string())),
    }
}

/// A leveled logger backed by an isolated `tracing` dispatcher.
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    dispatch: Dispatch,
}

impl Logger {
    /// Wraps any subscriber, e.g. one built by the application itself.
    pub fn from_subscriber<S>(name: &str, subscriber: S) -> Self
    where
        S: Subscriber + Send + Sync + 'static,
    {
        Self::from_dispatch(name, Dispatch::new(subscriber))
    }

    pub fn from_dispatch(name: &str, dispatch: Dispatch) -> Self {
        Self {
            name: Arc::from(name),
            dispatch,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Runs `f` with this logger as the current dispatcher, so plain
    /// `tracing` macros inside it land in this logger's sinks.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    pub fn log(&self, level: Level, message: impl fmt::Display) {
        let logger = &*self.name;
        self.in_scope(|| match level {
            Level::ERROR => tracing::error!(logger, "{}", message),
            Level::WARN => tracing::warn!(logger, "{}", message),
            Level::INFO => tracing::info!(logger, "{}", message),
            Level::DEBUG => tracing::debug!(logger, "{}", message),
            _ => tracing::trace!(logger, "{}", message),
        })
    }

    pub fn trace(&self, message: impl fmt::Display) {
        self.log(Level::TRACE, message)
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::DEBUG, message)
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::INFO, message)
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::WARN, message)
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::ERROR, message)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Loggers produced by one `configure_logger` run.
#[derive(Debug, Clone)]
pub(crate) struct LoggerState {
    pub(crate) logger: Logger,
    pub(crate) kafka_logger: Option<Logger>,
}

pub(crate) fn configure(config: &Configuration, console: &Console, silence: bool) -> Result<LoggerState> {
    let settings = config.logger_settings()?;
    let mut sinks = None;

    let logger = match config.custom_logger() {
        Some(custom) => custom.clone(),
        None => open_once(&mut sinks, &settings, console, silence)?
            .logger(FRAMEWORK_LOGGER, parse_level(&settings.level)?),
    };

    let kafka_logger = match (config.custom_kafka_logger(), &settings.kafka_client) {
        (Some(custom), _) => Some(custom.clone()),
        (None, Some(section)) => Some(
            open_once(&mut sinks, &settings, console, silence)?
                .logger(KAFKA_CLIENT_LOGGER, parse_level(&section.level)?),
        ),
        (None, None) => None,
    };

    Ok(LoggerState {
        logger,
        kafka_logger,
    })
}

fn open_once<'s>(
    slot: &'s mut Option<Sinks>,
    settings: &LoggerSettings,
    console: &Console,
    silence: bool,
) -> Result<&'s Sinks> {
    let sinks = match slot.take() {
        Some(sinks) => sinks,
        None => Sinks::open(settings, console, silence)?,
    };
    Ok(slot.insert(sinks))
}
