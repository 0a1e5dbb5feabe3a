// flyq-client/src/lib.rs

mod client;
mod error;
mod options;

pub use client::{BrokerConnection, FlyqClient};
pub use error::ClientError;
pub use options::{BrokerAddr, ClientOptions};
