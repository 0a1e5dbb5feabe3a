use std::io;
use std::path::PathBuf;

use flyq_client::ClientError;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file {0:?} does not exist")]
    SourceNotFound(PathBuf),

    #[error("reading configuration file {path:?}: {source}")]
    SourceRead { path: PathBuf, source: io::Error },

    #[error("template error in {path:?} at line {line}: {message}")]
    Template {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("parsing configuration file {path:?}: {source}")]
    SourceParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("configuration file {path:?} must contain a mapping, found {found}")]
    SourceNotMapping { path: PathBuf, found: &'static str },

    #[error("expected {expected} at `{path}`, found {found}")]
    Shape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid `{section}` section: {source}")]
    InvalidSection {
        section: &'static str,
        source: serde_json::Error,
    },

    #[error("not configured: call configure() first")]
    NotConfigured,

    #[error("kafka client construction failed: {0}")]
    ClientConstruction(#[from] ClientError),

    #[error("opening log file {path:?}: {source}")]
    LoggerIo { path: PathBuf, source: io::Error },

    #[error("unknown log level {0:?}")]
    InvalidLogLevel(String),

    #[error("invalid backoff bounds: min_ms {min_ms}, max_ms {max_ms} (min_ms must be positive and not exceed max_ms)")]
    InvalidBackoff { min_ms: u128, max_ms: u128 },

    #[error("backoff multiplier must be a finite value >= 1.0, got {0}")]
    InvalidMultiplier(f64),
}
