pub mod backoff;
pub mod config;
mod deep_struct;
mod error;
mod framework;
pub mod logging;
pub mod template;

use std::sync::OnceLock;

pub use backoff::{BackoffOverrides, BackoffSettings, ExponentialBackoff};
pub use config::{ConfigSource, Configuration, Loader};
pub use deep_struct::{DeepStruct, Node};
pub use error::{Error, Result};
pub use flyq_client::{ClientError, ClientOptions, FlyqClient};
pub use framework::{ClientArgs, Framework, LoggerSetup};
pub use logging::{Console, Logger, LoggerSettings};

/// Created empty on first use; `configure` it once during startup.
static FRAMEWORK: OnceLock<Framework> = OnceLock::new();

/// Process-wide instance for code that does not carry its own [`Framework`].
pub fn framework() -> &'static Framework {
    FRAMEWORK.get_or_init(Framework::new)
}
