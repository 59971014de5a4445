//! HTTP client for the node REST gateway.

use crate::address::NodeAddress;
use crate::error::ClientError;
use crate::node::{NodeHealth, NodeInfo, NodeServer};
use log::debug;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

/// Default timeout for a single REST request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const NODE_INFO_ROUTE: &str = "/node/info";
const NODE_PEERS_ROUTE: &str = "/node/peers";
const NODE_HEALTH_ROUTE: &str = "/node/health";
const NODE_SERVER_ROUTE: &str = "/node/server";

/// Default user agent sent with every request.
pub fn default_user_agent() -> String {
    format!("catcollector/{}", env!("CARGO_PKG_VERSION"))
}

/// Configuration used to build a [`RestClient`].
#[derive(Debug, Clone)]
pub struct RestClientConfiguration {
    /// Timeout covering connect, request and body read.
    pub request_timeout: Duration,
    /// User agent header value.
    pub user_agent: String,
}

impl Default for RestClientConfiguration {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }
}

impl RestClientConfiguration {
    /// Set the timeout for a single request.
    ///
    /// Public nodes are frequently slow or offline, a short timeout keeps a
    /// collection from stalling on them.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Maximum time to wait for one response (defaults to 10 seconds).
    ///
    /// # Returns
    ///
    /// Self for method chaining.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the user agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl fmt::Display for RestClientConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RestClientConfiguration {{ timeout: {:?}, user_agent: \"{}\" }}",
            self.request_timeout, self.user_agent
        )
    }
}

/// Client for the `/node/*` routes of a Symbol REST gateway.
///
/// Cheap to clone, clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
}

impl RestClient {
    /// Build a client from a configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(RestClient)` - The configured client.
    /// * `Err(ClientError)` - If the TLS backend could not be initialized.
    pub fn new(config: RestClientConfiguration) -> Result<Self, ClientError> {
        debug!("Building REST client with {config}");
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent)
            .build()?;
        Ok(Self { http })
    }

    /// Wrap an already configured `reqwest` client.
    pub fn from_http(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        node: &NodeAddress,
        route: &str,
    ) -> Result<T, ClientError> {
        let url = node.route(route);
        let response = self.http.get(&url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        debug!("Received {} bytes from {url}", body.len());
        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetch the identity of a node.
    pub async fn node_info(&self, node: &NodeAddress) -> Result<NodeInfo, ClientError> {
        self.get_json(node, NODE_INFO_ROUTE).await
    }

    /// Fetch the peers a node is connected to.
    pub async fn node_peers(&self, node: &NodeAddress) -> Result<Vec<NodeInfo>, ClientError> {
        self.get_json(node, NODE_PEERS_ROUTE).await
    }

    /// Fetch the health of a node's API process and database.
    pub async fn node_health(&self, node: &NodeAddress) -> Result<NodeHealth, ClientError> {
        self.get_json(node, NODE_HEALTH_ROUTE).await
    }

    /// Fetch the REST and SDK versions of a node's gateway.
    pub async fn node_server(&self, node: &NodeAddress) -> Result<NodeServer, ClientError> {
        self.get_json(node, NODE_SERVER_ROUTE).await
    }
}
