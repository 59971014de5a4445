//! Builder pattern for configuring and creating collector instances.

use crate::collector::Collector;
use crate::error::CollectorBuilderError;
use crate::query::NodeQuery;
use crate::visited::ExcludedNodes;
use catcollector_client::{NodeAddress, Protocol, DEFAULT_HTTP_PORT};
use std::time::Duration;

/// Default maximum number of concurrent node processing tasks.
pub const DEFAULT_MAX_CONCURRENT_TASKS: usize = 8;

/// Builder for creating a customized [`Collector`] instance.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use catcollector::{CollectorBuilder, NodeAddress, RestClient, RestClientConfiguration};
/// use std::time::Duration;
///
/// let client = RestClient::new(RestClientConfiguration::default())?;
/// let seed = NodeAddress::parse("http://symbol.dev:3000")?;
///
/// // Create a basic collector
/// let basic = CollectorBuilder::new(client.clone(), seed.clone()).build();
///
/// // Create a collector with custom settings
/// let custom = CollectorBuilder::new(client, seed)
///     .with_max_concurrent_tasks(16)?
///     .with_excluded_nodes(["bad.symbol.dev"])
///     .with_collect_timeout(Duration::from_secs(120))
///     .only_node_info()
///     .build();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CollectorBuilder<Q> {
    query: Q,
    seed: NodeAddress,
    excluded_nodes: ExcludedNodes,
    include_health: bool,
    include_server: bool,
    max_concurrent_tasks: usize,
    peer_protocol: Protocol,
    peer_port: u16,
    api_nodes_only: bool,
    collect_timeout: Option<Duration>,
}

impl<Q: NodeQuery> CollectorBuilder<Q> {
    /// Create a new collector builder.
    ///
    /// # Arguments
    ///
    /// * `query` - Backend used to look nodes up.
    /// * `seed` - The node the collection starts from.
    ///
    /// # Returns
    ///
    /// A new `CollectorBuilder` instance.
    pub fn new(query: Q, seed: NodeAddress) -> Self {
        CollectorBuilder {
            query,
            seed,
            excluded_nodes: ExcludedNodes::default(),
            include_health: true,
            include_server: true,
            max_concurrent_tasks: DEFAULT_MAX_CONCURRENT_TASKS,
            peer_protocol: Protocol::Http,
            peer_port: DEFAULT_HTTP_PORT,
            api_nodes_only: true,
            collect_timeout: None,
        }
    }

    /// Set the maximum number of concurrent node processing tasks.
    ///
    /// Public node lists are large, keep this modest to avoid hammering the
    /// network being observed.
    ///
    /// # Recommendations
    ///
    /// * **Conservative (1-4)** - For slow networks or resource-constrained environments.
    /// * **Default (8)** - Good balance for most use cases.
    /// * **Aggressive (16-32)** - For fast collection with ample resources.
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - The builder for method chaining.
    /// * `Err(CollectorBuilderError::InvalidConcurrency)` - If `max_tasks` is zero.
    pub fn with_max_concurrent_tasks(
        mut self,
        max_tasks: usize,
    ) -> Result<Self, CollectorBuilderError> {
        if max_tasks == 0 {
            return Err(CollectorBuilderError::InvalidConcurrency(max_tasks));
        }
        self.max_concurrent_tasks = max_tasks;
        Ok(self)
    }

    /// Set the nodes which must never be fetched.
    ///
    /// Entries may be a host, a `host:port` pair or a full URL.
    pub fn with_excluded_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_nodes = ExcludedNodes::new(nodes);
        self
    }

    /// Set where peers' REST gateways are assumed to be served.
    ///
    /// Peer lists only carry hosts, so scheme and port are filled in from
    /// here. Defaults to `http` on port 3000.
    pub fn with_peer_api_endpoint(mut self, protocol: Protocol, port: u16) -> Self {
        self.peer_protocol = protocol;
        self.peer_port = port;
        self
    }

    /// Whether peers without the API role are skipped (defaults to `true`).
    pub fn with_api_nodes_only(mut self, api_nodes_only: bool) -> Self {
        self.api_nodes_only = api_nodes_only;
        self
    }

    /// Set an overall time limit for a collection.
    ///
    /// When it elapses the collection stops as if cancelled.
    pub fn with_collect_timeout(mut self, timeout: Duration) -> Self {
        self.collect_timeout = Some(timeout);
        self
    }

    /// Collect node info only, skipping health and server lookups.
    pub fn only_node_info(mut self) -> Self {
        self.include_health = false;
        self.include_server = false;
        self
    }

    /// Collect node info, health and server info (the default).
    pub fn include_all_info(mut self) -> Self {
        self.include_health = true;
        self.include_server = true;
        self
    }

    /// Build the collector with the configured options.
    pub fn build(self) -> Collector<Q> {
        Collector {
            query: self.query,
            seed: self.seed,
            excluded_nodes: self.excluded_nodes,
            include_health: self.include_health,
            include_server: self.include_server,
            max_concurrent_tasks: self.max_concurrent_tasks,
            peer_protocol: self.peer_protocol,
            peer_port: self.peer_port,
            api_nodes_only: self.api_nodes_only,
            collect_timeout: self.collect_timeout,
        }
    }
}
