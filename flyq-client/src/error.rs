use thiserror::Error;

/// Raised while building a [`FlyqClient`](crate::FlyqClient) from its parameters.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid client parameters: {0}")]
    InvalidParams(#[from] serde_json::Error),

    #[error("client_id must not be empty")]
    EmptyClientId,

    #[error("no seed brokers configured")]
    NoSeedBrokers,

    #[error("invalid broker address {0:?}: expected host:port")]
    InvalidBrokerAddress(String),

    #[error("ssl_client_cert and ssl_client_cert_key must be set together")]
    IncompleteClientCert,
}
