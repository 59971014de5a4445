//! The public collector and the report of a collection run.

use crate::builder::CollectorBuilder;
use crate::error::ErrorLog;
use crate::nodes::NodesData;
use crate::query::NodeQuery;
use crate::session::{CollectSession, SessionConfig};
use crate::visited::ExcludedNodes;
use catcollector_client::{NodeAddress, Protocol};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Outcome of a [`Collector::collect`] run.
///
/// A non-empty error log next to collected nodes is a normal outcome; callers
/// should look at both.
#[derive(Debug)]
pub struct CollectReport {
    /// Records of the collected nodes, in discovery order.
    pub nodes: NodesData,
    /// Number of nodes whose identity was collected.
    pub num_collected: usize,
    /// Failures met along the way, `None` if there were none.
    pub errors: Option<ErrorLog>,
}

impl CollectReport {
    pub(crate) fn new(nodes: NodesData, errors: ErrorLog) -> Self {
        CollectReport {
            num_collected: nodes.len(),
            nodes,
            errors: if errors.is_empty() { None } else { Some(errors) },
        }
    }

    /// `true` if the run was cut short by cancellation or timeout.
    pub fn is_interrupted(&self) -> bool {
        self.errors.as_ref().is_some_and(ErrorLog::is_interrupted)
    }
}

/// A collector of Symbol network nodes.
///
/// Starting from a seed node, the collector fetches each node's identity and
/// peer list, then walks the peers until no unvisited nodes remain.
///
/// Each [`collect`](Collector::collect) run starts from scratch; nothing but
/// configuration is kept between runs.
#[derive(Debug, Clone)]
pub struct Collector<Q> {
    pub(crate) query: Q,
    pub(crate) seed: NodeAddress,
    pub(crate) excluded_nodes: ExcludedNodes,
    pub(crate) include_health: bool,
    pub(crate) include_server: bool,
    pub(crate) max_concurrent_tasks: usize,
    pub(crate) peer_protocol: Protocol,
    pub(crate) peer_port: u16,
    pub(crate) api_nodes_only: bool,
    pub(crate) collect_timeout: Option<Duration>,
}

impl<Q: NodeQuery> Collector<Q> {
    /// Create a collector with default settings.
    ///
    /// See [`CollectorBuilder`] for the available options.
    pub fn new(query: Q, seed: NodeAddress) -> Self {
        CollectorBuilder::new(query, seed).build()
    }

    pub fn seed(&self) -> &NodeAddress {
        &self.seed
    }

    pub fn excluded_nodes(&self) -> &ExcludedNodes {
        &self.excluded_nodes
    }

    /// Replace the nodes which must never be fetched.
    pub fn set_excluded_nodes<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_nodes = ExcludedNodes::new(nodes);
    }

    /// Collect node info only, skipping health and server lookups.
    pub fn only_node_info(&mut self) {
        self.include_health = false;
        self.include_server = false;
    }

    /// Collect node info, health and server info.
    pub fn include_all_info(&mut self) {
        self.include_health = true;
        self.include_server = true;
    }

    pub fn includes_health(&self) -> bool {
        self.include_health
    }

    pub fn includes_server(&self) -> bool {
        self.include_server
    }

    pub(crate) fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_concurrent_tasks: self.max_concurrent_tasks,
            include_health: self.include_health,
            include_server: self.include_server,
            excluded_nodes: self.excluded_nodes.clone(),
            peer_protocol: self.peer_protocol,
            peer_port: self.peer_port,
            api_nodes_only: self.api_nodes_only,
            collect_timeout: self.collect_timeout,
        }
    }

    /// Collect the nodes reachable from the seed.
    ///
    /// # Termination
    ///
    /// * **Natural completion** - Every reachable node has been visited.
    /// * **Target reached** - `target` nodes have been collected. The result
    ///   never holds more than `target` nodes.
    /// * **Early termination** - `cancel` fires or the configured collection
    ///   timeout elapses. Nodes collected so far are returned and the error
    ///   log ends with a cancellation entry.
    ///
    /// A single node failing never aborts the collection, its failure is
    /// recorded in the error log instead.
    ///
    /// # Arguments
    ///
    /// * `target` - Number of nodes to stop at, 0 for no limit.
    /// * `cancel` - Token to stop the collection early.
    ///
    /// # Returns
    ///
    /// A [`CollectReport`] with the records, their count and the error log.
    pub async fn collect(&self, target: usize, cancel: CancellationToken) -> CollectReport {
        let session = CollectSession::new(self.query.clone(), self.session_config());
        session.coordinate(self.seed.clone(), target, cancel).await
    }
}
