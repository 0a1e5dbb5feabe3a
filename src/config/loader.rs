use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use super::defaults::defaults;
use super::merge::deep_merge;
use super::Configuration;
use crate::deep_struct::{value_kind, DeepStruct};
use crate::error::{Error, Result};
use crate::logging::Logger;
use crate::template;

/// Where settings come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// YAML file, rendered through the template pass before parsing.
    File(PathBuf),
    /// In-memory settings, already shaped like a parsed file.
    Settings(Value),
}

impl From<&str> for ConfigSource {
    fn from(path: &str) -> Self {
        ConfigSource::File(PathBuf::from(path))
    }
}

impl From<String> for ConfigSource {
    fn from(path: String) -> Self {
        ConfigSource::File(PathBuf::from(path))
    }
}

impl From<&Path> for ConfigSource {
    fn from(path: &Path) -> Self {
        ConfigSource::File(path.to_path_buf())
    }
}

impl From<PathBuf> for ConfigSource {
    fn from(path: PathBuf) -> Self {
        ConfigSource::File(path)
    }
}

impl From<Value> for ConfigSource {
    fn from(settings: Value) -> Self {
        ConfigSource::Settings(settings)
    }
}

impl From<Map<String, Value>> for ConfigSource {
    fn from(settings: Map<String, Value>) -> Self {
        ConfigSource::Settings(Value::Object(settings))
    }
}

/// Builds a [`Configuration`] from a source merged over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    source: ConfigSource,
    custom_logger: Option<Logger>,
    custom_kafka_logger: Option<Logger>,
}

impl Loader {
    pub fn new(source: impl Into<ConfigSource>) -> Self {
        Self {
            source: source.into(),
            custom_logger: None,
            custom_kafka_logger: None,
        }
    }

    /// Use `logger` instead of building one from the `logger` section.
    pub fn custom_logger(mut self, logger: Logger) -> Self {
        self.custom_logger = Some(logger);
        self
    }

    /// Use `logger` for wire-client diagnostics.
    pub fn custom_kafka_logger(mut self, logger: Logger) -> Self {
        self.custom_kafka_logger = Some(logger);
        self
    }

    pub fn load(self) -> Result<Configuration> {
        let overrides = match self.source {
            ConfigSource::File(path) => read_file(&path)?,
            ConfigSource::Settings(settings) => match settings {
                Value::Object(_) => settings,
                other => {
                    return Err(Error::Shape {
                        path: "<root>".to_string(),
                        expected: "a mapping",
                        found: value_kind(&other),
                    })
                }
            },
        };

        let mut merged = defaults();
        deep_merge(&mut merged, overrides);

        let config = Configuration {
            tree: DeepStruct::from_value(merged)?,
            custom_logger: self.custom_logger,
            custom_kafka_logger: self.custom_kafka_logger,
        };
        config.validate()?;
        Ok(config)
    }
}

fn read_file(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::SourceNotFound(path.to_path_buf()));
    }

    let raw = fs::read_to_string(path).map_err(|source| Error::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    let rendered = template::render(&raw).map_err(|e| Error::Template {
        path: path.to_path_buf(),
        line: e.line,
        message: e.message,
    })?;
    let value: Value = serde_yaml::from_str(&rendered).map_err(|source| Error::SourceParse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), "configuration file parsed");

    match value {
        Value::Object(_) => Ok(value),
        other => Err(Error::SourceNotMapping {
            path: path.to_path_buf(),
            found: value_kind(&other),
        }),
    }
}
