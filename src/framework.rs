use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use flyq_client::FlyqClient;
use serde_json::{Map, Value};
use tracing::debug;

use crate::backoff::{BackoffOverrides, BackoffSettings, ExponentialBackoff};
use crate::config::{ConfigSource, Configuration, Loader};
use crate::error::{Error, Result};
use crate::logging::{self, Console, Logger, LoggerState};

/// Whether installing a configuration also rebuilds the loggers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoggerSetup {
    #[default]
    Configure,
    Skip,
}

/// Holds the current configuration and the collaborators built from it.
///
/// Every `configure` replaces the snapshot wholesale. Readers get whatever
/// snapshot is installed at the time of the call.
#[derive(Debug)]
pub struct Framework {
    config: ArcSwapOption<Configuration>,
    loggers: ArcSwapOption<LoggerState>,
    silence_log: AtomicBool,
    console: Console,
}

impl Default for Framework {
    fn default() -> Self {
        Self::new()
    }
}

impl Framework {
    pub fn new() -> Self {
        Self::with_console(Console::stdout())
    }

    /// A framework whose stdout sink writes to `console` instead.
    pub fn with_console(console: Console) -> Self {
        Self {
            config: ArcSwapOption::empty(),
            loggers: ArcSwapOption::empty(),
            silence_log: AtomicBool::new(false),
            console,
        }
    }

    /// Loads `source` over the defaults, installs it and rebuilds the loggers.
    pub fn configure(&self, source: impl Into<ConfigSource>) -> Result<Arc<Configuration>> {
        self.install(Loader::new(source).load()?, LoggerSetup::Configure)
    }

    /// Replaces the current configuration with `config`.
    ///
    /// Loggers from the previous configuration are dropped either way; with
    /// [`LoggerSetup::Skip`] none are built until `configure_logger` runs.
    pub fn install(&self, config: Configuration, setup: LoggerSetup) -> Result<Arc<Configuration>> {
        let config = Arc::new(config);
        self.config.store(Some(Arc::clone(&config)));
        self.loggers.store(None);

        if setup == LoggerSetup::Configure {
            self.configure_logger()?;
        }
        self.emit(|| debug!(sections = config.tree().len(), "configuration installed"));
        Ok(config)
    }

    pub fn config(&self) -> Result<Arc<Configuration>> {
        self.config.load_full().ok_or(Error::NotConfigured)
    }

    pub fn is_configured(&self) -> bool {
        self.config.load().is_some()
    }

    /// Applies `patch` to a copy of the current configuration and installs
    /// the copy. Loggers are left as they are; call `configure_logger` to
    /// pick up logger changes.
    pub fn update_config<F>(&self, patch: F) -> Result<Arc<Configuration>>
    where
        F: FnOnce(&mut Configuration),
    {
        let mut next = Configuration::clone(&*self.config()?);
        patch(&mut next);
        next.validate()?;

        let next = Arc::new(next);
        self.config.store(Some(Arc::clone(&next)));
        Ok(next)
    }

    /// Drops the configuration and loggers.
    pub fn reset(&self) {
        self.config.store(None);
        self.loggers.store(None);
    }

    /// Rebuilds the loggers from the installed configuration.
    pub fn configure_logger(&self) -> Result<()> {
        let config = self.config()?;
        let state = logging::configure(&config, &self.console, self.silence_log())?;
        let kafka_logger = state.kafka_logger.is_some();
        self.loggers.store(Some(Arc::new(state)));
        self.emit(|| {
            debug!(kafka_logger, silenced = self.silence_log(), "loggers configured")
        });
        Ok(())
    }

    /// Runs `event` against the framework logger, or the ambient dispatcher
    /// when none is built yet.
    fn emit(&self, event: impl FnOnce()) {
        match self.logger() {
            Some(logger) => logger.in_scope(event),
            None => event(),
        }
    }

    pub fn logger(&self) -> Option<Logger> {
        self.loggers.load_full().map(|state| state.logger.clone())
    }

    /// Logger handed to the wire client, if `logger.kafka_client` or a custom
    /// kafka logger is configured.
    pub fn kafka_logger(&self) -> Option<Logger> {
        self.loggers
            .load_full()
            .and_then(|state| state.kafka_logger.clone())
    }

    pub fn silence_log(&self) -> bool {
        self.silence_log.load(Ordering::Relaxed)
    }

    /// Suppresses the stdout sink of loggers built from now on.
    pub fn set_silence_log(&self, silence: bool) {
        self.silence_log.store(silence, Ordering::Relaxed);
    }

    /// Arguments the wire client is constructed with: the `kafka` section
    /// plus the current kafka logger.
    pub fn client_args(&self) -> Result<ClientArgs> {
        let config = self.config()?;
        let mut params = config.kafka()?.to_hash();
        params.remove("logger");
        Ok(ClientArgs {
            params,
            logger: self.kafka_logger(),
        })
    }

    pub fn create_kafka_client(&self) -> Result<FlyqClient> {
        self.client_args()?.into_client()
    }

    /// A fresh backoff seeded from the `backoff` section, or the built-in
    /// bounds when nothing is configured.
    pub fn create_exponential_backoff(
        &self,
        overrides: Option<BackoffOverrides>,
    ) -> Result<ExponentialBackoff> {
        let defaults = match self.config.load_full() {
            Some(config) => config.backoff_settings()?,
            None => BackoffSettings::default(),
        };
        let settings = defaults.with_overrides(overrides.unwrap_or_default());
        ExponentialBackoff::from_settings(settings)
    }
}

/// Parameter set passed to [`FlyqClient::from_params`].
#[derive(Debug, Clone)]
pub struct ClientArgs {
    pub params: Map<String, Value>,
    pub logger: Option<Logger>,
}

impl ClientArgs {
    pub fn into_client(self) -> Result<FlyqClient> {
        let logger = self.logger.map(|l| l.dispatch().clone());
        Ok(FlyqClient::from_params(self.params, logger)?)
    }
}
