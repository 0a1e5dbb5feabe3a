mod defaults;
mod loader;
mod merge;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use loader::{ConfigSource, Loader};
pub use merge::deep_merge;

use crate::backoff::BackoffSettings;
use crate::deep_struct::{DeepStruct, Node};
use crate::error::{Error, Result};
use crate::logging::{Logger, LoggerSettings};

/// One fully merged configuration snapshot.
///
/// The tree always holds the defaults merged with whatever the source
/// provided. Custom loggers are carried next to it since they are not data.
#[derive(Debug, Clone)]
pub struct Configuration {
    tree: DeepStruct,
    custom_logger: Option<Logger>,
    custom_kafka_logger: Option<Logger>,
}

impl Configuration {
    pub fn tree(&self) -> &DeepStruct {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DeepStruct {
        &mut self.tree
    }

    pub fn section(&self, name: &str) -> Result<&DeepStruct> {
        match self.tree.get(name) {
            Some(Node::Struct(inner)) => Ok(inner),
            other => Err(not_a_mapping(name, other)),
        }
    }

    pub fn section_mut(&mut self, name: &str) -> Result<&mut DeepStruct> {
        match self.tree.get_mut(name) {
            Some(Node::Struct(inner)) => Ok(inner),
            other => Err(not_a_mapping(name, other.map(|n| &*n))),
        }
    }

    /// Connection parameters for the wire client.
    pub fn kafka(&self) -> Result<&DeepStruct> {
        self.section("kafka")
    }

    pub fn kafka_mut(&mut self) -> Result<&mut DeepStruct> {
        self.section_mut("kafka")
    }

    /// The raw `logger` section. See [`Configuration::logger_settings`] for
    /// the typed view.
    pub fn logger(&self) -> Result<&DeepStruct> {
        self.section("logger")
    }

    pub fn logger_mut(&mut self) -> Result<&mut DeepStruct> {
        self.section_mut("logger")
    }

    pub fn logger_settings(&self) -> Result<LoggerSettings> {
        self.typed("logger")
    }

    pub fn backoff_settings(&self) -> Result<BackoffSettings> {
        self.typed("backoff")
    }

    pub fn producer_hash(&self) -> Option<Map<String, Value>> {
        self.tree.section("producer").map(DeepStruct::to_hash)
    }

    pub fn consumer_hash(&self) -> Option<Map<String, Value>> {
        self.tree.section("consumer").map(DeepStruct::to_hash)
    }

    pub fn listeners(&self) -> Vec<&DeepStruct> {
        self.tree
            .list("listeners")
            .map(|items| items.iter().filter_map(|n| n.as_struct()).collect())
            .unwrap_or_default()
    }

    pub fn custom_logger(&self) -> Option<&Logger> {
        self.custom_logger.as_ref()
    }

    pub fn set_custom_logger(&mut self, logger: Option<Logger>) {
        self.custom_logger = logger;
    }

    pub fn custom_kafka_logger(&self) -> Option<&Logger> {
        self.custom_kafka_logger.as_ref()
    }

    pub fn set_custom_kafka_logger(&mut self, logger: Option<Logger>) {
        self.custom_kafka_logger = logger;
    }

    pub fn to_hash(&self) -> Map<String, Value> {
        self.tree.to_hash()
    }

    fn typed<T: DeserializeOwned>(&self, section: &'static str) -> Result<T> {
        let map = self.section(section)?.to_hash();
        serde_json::from_value(Value::Object(map))
            .map_err(|source| Error::InvalidSection { section, source })
    }

    /// Shape checks for the sections the framework itself reads.
    pub(crate) fn validate(&self) -> Result<()> {
        self.kafka()?;
        let logger = self.logger_settings()?;
        crate::logging::parse_level(&logger.level)?;
        if let Some(kafka_client) = &logger.kafka_client {
            crate::logging::parse_level(&kafka_client.level)?;
        }
        let backoff = self.backoff_settings()?;
        backoff.validate()?;

        if let Some(node) = self.tree.get("listeners") {
            let items = node.as_list().ok_or_else(|| Error::Shape {
                path: "listeners".to_string(),
                expected: "a sequence",
                found: node.kind(),
            })?;
            for (i, item) in items.iter().enumerate() {
                if item.as_struct().is_none() {
                    return Err(Error::Shape {
                        path: format!("listeners.{i}"),
                        expected: "a mapping",
                        found: item.kind(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn not_a_mapping(path: &str, found: Option<&Node>) -> Error {
    Error::Shape {
        path: path.to_string(),
        expected: "a mapping",
        found: found.map_or("nothing", Node::kind),
    }
}
