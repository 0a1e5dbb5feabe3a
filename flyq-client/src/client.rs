use anyhow::{anyhow, Context};
use serde_json::{Map, Value};
use tokio::net::TcpStream;
use tracing::{debug, warn, Dispatch};

use crate::{BrokerAddr, ClientError, ClientOptions};

/// Client handle for a FlyQ cluster.
///
/// Construction only checks the parameters; no socket is opened until
/// [`FlyqClient::connect`].
#[derive(Debug, Clone)]
pub struct FlyqClient {
    options: ClientOptions,
    brokers: Vec<BrokerAddr>,
    logger: Option<Dispatch>,
}

impl FlyqClient {
    pub fn new(options: ClientOptions, logger: Option<Dispatch>) -> Result<Self, ClientError> {
        let brokers = options.validate()?;
        Ok(FlyqClient {
            options,
            brokers,
            logger,
        })
    }

    /// Builds a client from a loosely typed parameter mapping, e.g. a
    /// configuration section. Unknown keys are rejected.
    pub fn from_params(
        params: Map<String, Value>,
        logger: Option<Dispatch>,
    ) -> Result<Self, ClientError> {
        let options: ClientOptions = serde_json::from_value(Value::Object(params))?;
        Self::new(options, logger)
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn client_id(&self) -> &str {
        &self.options.client_id
    }

    pub fn seed_brokers(&self) -> &[BrokerAddr] {
        &self.brokers
    }

    /// Diagnostics sink attached at construction, if any.
    pub fn logger(&self) -> Option<&Dispatch> {
        self.logger.as_ref()
    }

    fn log(&self, emit: impl FnOnce()) {
        if let Some(dispatch) = &self.logger {
            tracing::dispatcher::with_default(dispatch, emit);
        }
    }

    /// Opens a connection to the first reachable seed broker, in list order.
    pub async fn connect(&self) -> anyhow::Result<BrokerConnection> {
        let mut last_error = None;

        for broker in &self.brokers {
            match self.connect_to(broker).await {
                Ok(stream) => {
                    self.log(|| debug!(client_id = %self.options.client_id, %broker, "connected to seed broker"));
                    return Ok(BrokerConnection {
                        broker: broker.clone(),
                        stream,
                    });
                }
                Err(e) => {
                    self.log(|| warn!(client_id = %self.options.client_id, %broker, error = %e, "seed broker unreachable"));
                    last_error = Some(e);
                }
            }
        }

        let error = last_error.unwrap_or_else(|| anyhow!("seed broker list is empty"));
        Err(error.context(format!(
            "Failed to connect to any FlyQ seed broker for client {}",
            self.options.client_id
        )))
    }

    async fn connect_to(&self, broker: &BrokerAddr) -> anyhow::Result<TcpStream> {
        let connect = TcpStream::connect((broker.host.as_str(), broker.port));
        let stream = match self.options.connect_timeout() {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .with_context(|| format!("timed out connecting to {broker}"))?
                .with_context(|| format!("connecting to {broker}"))?,
            None => connect
                .await
                .with_context(|| format!("connecting to {broker}"))?,
        };
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

/// An open socket to one broker of the cluster.
#[derive(Debug)]
pub struct BrokerConnection {
    broker: BrokerAddr,
    stream: TcpStream,
}

impl BrokerConnection {
    pub fn broker(&self) -> &BrokerAddr {
        &self.broker
    }

    pub fn stream(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}
