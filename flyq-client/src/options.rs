use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Connection parameters accepted by [`FlyqClient`](crate::FlyqClient).
///
/// Timeouts are whole seconds; `None` keeps the OS default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientOptions {
    pub client_id: String,
    pub seed_brokers: Vec<String>,
    pub connect_timeout: Option<u64>,
    pub socket_timeout: Option<u64>,
    pub ssl_ca_cert: Option<String>,
    pub ssl_client_cert: Option<String>,
    pub ssl_client_cert_key: Option<String>,
    pub ssl_ca_certs_from_system: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            client_id: "flyq".to_string(),
            seed_brokers: vec!["localhost:9092".to_string()],
            connect_timeout: None,
            socket_timeout: None,
            ssl_ca_cert: None,
            ssl_client_cert: None,
            ssl_client_cert_key: None,
            ssl_ca_certs_from_system: false,
        }
    }
}

impl ClientOptions {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout.map(Duration::from_secs)
    }

    pub fn socket_timeout(&self) -> Option<Duration> {
        self.socket_timeout.map(Duration::from_secs)
    }

    pub fn tls_enabled(&self) -> bool {
        self.ssl_ca_cert.is_some() || self.ssl_ca_certs_from_system || self.ssl_client_cert.is_some()
    }

    /// Checks the parameters and resolves the seed list.
    pub fn validate(&self) -> Result<Vec<BrokerAddr>, ClientError> {
        if self.client_id.trim().is_empty() {
            return Err(ClientError::EmptyClientId);
        }
        if self.ssl_client_cert.is_some() != self.ssl_client_cert_key.is_some() {
            return Err(ClientError::IncompleteClientCert);
        }
        if self.seed_brokers.is_empty() {
            return Err(ClientError::NoSeedBrokers);
        }
        self.seed_brokers.iter().map(|b| b.parse()).collect()
    }
}

/// A `host:port` pair from the seed list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrokerAddr {
    pub host: String,
    pub port: u16,
}

impl FromStr for BrokerAddr {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ClientError::InvalidBrokerAddress(s.to_string());
        let (host, port) = s.trim().rsplit_once(':').ok_or_else(invalid)?;
        // [::1]:9092
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse::<u16>().map_err(|_| invalid())?;
        Ok(BrokerAddr {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for BrokerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
