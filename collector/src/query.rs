//! Node query abstractions for testing and mocking.
//!
//! This module provides the [`NodeQuery`] trait that abstracts the REST routes
//! a collection needs, enabling dependency injection for testing without
//! modifying the traversal logic.

use catcollector_client::{
    ClientError, NodeAddress, NodeHealth, NodeInfo, NodeServer, RestClient,
};
use std::future::Future;

/// The four per-node lookups a collection performs.
///
/// Implementations apply their own transport timeout. Any error is treated as
/// "this lookup failed" without further inspection.
pub trait NodeQuery: Clone + Send + Sync + 'static {
    /// Identity of the node, gates record creation.
    fn fetch_identity(
        &self,
        node: &NodeAddress,
    ) -> impl Future<Output = Result<NodeInfo, ClientError>> + Send;

    /// Peers the node is connected to, drives discovery.
    fn fetch_peers(
        &self,
        node: &NodeAddress,
    ) -> impl Future<Output = Result<Vec<NodeInfo>, ClientError>> + Send;

    fn fetch_health(
        &self,
        node: &NodeAddress,
    ) -> impl Future<Output = Result<NodeHealth, ClientError>> + Send;

    fn fetch_server_info(
        &self,
        node: &NodeAddress,
    ) -> impl Future<Output = Result<NodeServer, ClientError>> + Send;
}

/// Implementation of NodeQuery for the RestClient type from catcollector-client.
impl NodeQuery for RestClient {
    fn fetch_identity(
        &self,
        node: &NodeAddress,
    ) -> impl Future<Output = Result<NodeInfo, ClientError>> + Send {
        self.node_info(node)
    }

    fn fetch_peers(
        &self,
        node: &NodeAddress,
    ) -> impl Future<Output = Result<Vec<NodeInfo>, ClientError>> + Send {
        self.node_peers(node)
    }

    fn fetch_health(
        &self,
        node: &NodeAddress,
    ) -> impl Future<Output = Result<NodeHealth, ClientError>> + Send {
        self.node_health(node)
    }

    fn fetch_server_info(
        &self,
        node: &NodeAddress,
    ) -> impl Future<Output = Result<NodeServer, ClientError>> + Send {
        self.node_server(node)
    }
}

#[cfg(test)]
pub mod test_utils {
    //! Scripted network for exercising collections deterministically.

    use super::*;
    use catcollector_client::{Protocol, Roles, Status};
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Behavior of one scripted node.
    #[derive(Debug, Clone)]
    pub struct ScriptedNode {
        /// Identity served, `None` fails the identity lookup.
        pub info: Option<NodeInfo>,
        /// Peers served, `None` fails the peer lookup.
        pub peers: Option<Vec<NodeInfo>>,
        pub health: Option<NodeHealth>,
        pub server: Option<NodeServer>,
        /// Artificial latency applied to every lookup.
        pub delay: Duration,
    }

    /// Identity of a scripted API node, keyed by host.
    pub fn node_info(host: &str) -> NodeInfo {
        NodeInfo {
            version: 16777728,
            public_key: format!("PK-{host}"),
            network_generation_hash_seed: "57F7DA20".to_string(),
            roles: Roles::PEER | Roles::API,
            port: 7900,
            network_identifier: 104,
            host: host.to_string(),
            friendly_name: format!("node {host}"),
        }
    }

    /// REST address a scripted host is reachable at with default peer settings.
    pub fn address(host: &str) -> NodeAddress {
        NodeAddress::new(Protocol::Http, host, 3000)
    }

    /// Mock query backed by an in-memory network map.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedQuery {
        nodes: Arc<Mutex<HashMap<String, ScriptedNode>>>,
        identity_calls: Arc<Mutex<HashMap<String, usize>>>,
        panicking: Arc<Mutex<HashSet<String>>>,
    }

    impl ScriptedQuery {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a healthy API node at `host:3000` that reports `peers`.
        pub fn add_node(&self, host: &str, peers: &[&str]) {
            self.insert(
                address(host),
                ScriptedNode {
                    info: Some(node_info(host)),
                    peers: Some(peers.iter().map(|peer| node_info(peer)).collect()),
                    health: Some(NodeHealth::new(Status::Up, Status::Up)),
                    server: Some(NodeServer::new("2.4.4", "3.0.7")),
                    delay: Duration::ZERO,
                },
            );
        }

        /// Add or replace the script of one address.
        pub fn insert(&self, address: NodeAddress, node: ScriptedNode) {
            self.nodes.lock().unwrap().insert(address.key(), node);
        }

        /// Modify the script of an already added node.
        pub fn update(&self, host: &str, change: impl FnOnce(&mut ScriptedNode)) {
            let mut nodes = self.nodes.lock().unwrap();
            let node = nodes
                .get_mut(&address(host).key())
                .expect("node should be scripted before update");
            change(node);
        }

        /// Make identity lookups against an address panic.
        pub fn panic_on(&self, address: &NodeAddress) {
            self.panicking.lock().unwrap().insert(address.key());
        }

        /// Number of identity lookups issued against an address.
        pub fn identity_calls(&self, address: &NodeAddress) -> usize {
            self.identity_calls
                .lock()
                .unwrap()
                .get(&address.key())
                .copied()
                .unwrap_or(0)
        }

        /// Total identity lookups issued.
        pub fn total_identity_calls(&self) -> usize {
            self.identity_calls.lock().unwrap().values().sum()
        }

        fn lookup(&self, node: &NodeAddress) -> Result<ScriptedNode, ClientError> {
            self.nodes
                .lock()
                .unwrap()
                .get(&node.key())
                .cloned()
                .ok_or_else(|| failure(node, "unreachable"))
        }

        async fn respond<T>(
            &self,
            node: &NodeAddress,
            select: impl FnOnce(ScriptedNode) -> Option<T>,
        ) -> Result<T, ClientError> {
            let scripted = self.lookup(node)?;
            if !scripted.delay.is_zero() {
                tokio::time::sleep(scripted.delay).await;
            }
            select(scripted).ok_or_else(|| failure(node, "scripted failure"))
        }
    }

    fn failure(node: &NodeAddress, reason: &str) -> ClientError {
        ClientError::InvalidAddress(format!("{node} {reason}"))
    }

    impl NodeQuery for ScriptedQuery {
        fn fetch_identity(
            &self,
            node: &NodeAddress,
        ) -> impl Future<Output = Result<NodeInfo, ClientError>> + Send {
            *self
                .identity_calls
                .lock()
                .unwrap()
                .entry(node.key())
                .or_insert(0) += 1;
            let panics = self.panicking.lock().unwrap().contains(&node.key());
            let query = self.clone();
            let node = node.clone();
            async move {
                if panics {
                    panic!("scripted panic fetching {node}");
                }
                query.respond(&node, |n| n.info).await
            }
        }

        fn fetch_peers(
            &self,
            node: &NodeAddress,
        ) -> impl Future<Output = Result<Vec<NodeInfo>, ClientError>> + Send {
            let query = self.clone();
            let node = node.clone();
            async move { query.respond(&node, |n| n.peers).await }
        }

        fn fetch_health(
            &self,
            node: &NodeAddress,
        ) -> impl Future<Output = Result<NodeHealth, ClientError>> + Send {
            let query = self.clone();
            let node = node.clone();
            async move { query.respond(&node, |n| n.health).await }
        }

        fn fetch_server_info(
            &self,
            node: &NodeAddress,
        ) -> impl Future<Output = Result<NodeServer, ClientError>> + Send {
            let query = self.clone();
            let node = node.clone();
            async move { query.respond(&node, |n| n.server).await }
        }
    }
}
