//! Per-node records and the collections built from them.

use catcollector_client::{NodeAddress, NodeHealth, NodeInfo, NodeServer};
use std::fmt;
use std::time::Duration;

/// Host, protocol and port of a node's REST gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeUrl {
    pub host: String,
    pub protocol: String,
    pub port: String,
}

impl NodeUrl {
    /// Join the parts into a URL, e.g. `http://symbol.dev:3000`.
    pub fn join(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

impl fmt::Display for NodeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}

/// Raw lookup results for one node, the input of [`NodeData::assemble`].
#[derive(Debug, Clone, Default)]
pub struct FetchedNode {
    pub info: Option<NodeInfo>,
    /// `None` when health collection is disabled or the lookup failed.
    pub health: Option<NodeHealth>,
    /// `None` when server collection is disabled or the lookup failed.
    pub server: Option<NodeServer>,
    /// Latency of the slowest lookup.
    pub response_time: Duration,
}

/// Everything collected about a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// Identity, absent only for records not produced by a collection.
    pub info: Option<NodeInfo>,
    pub health: Option<NodeHealth>,
    pub server: Option<NodeServer>,
    /// Scheme the node was queried over.
    pub protocol: String,
    /// REST port the node was queried on.
    pub api_port: String,
    pub response_time: Duration,
}

impl NodeData {
    /// A record with only the endpoint known.
    pub fn new(protocol: impl Into<String>, api_port: impl Into<String>) -> Self {
        NodeData {
            info: None,
            health: None,
            server: None,
            protocol: protocol.into(),
            api_port: api_port.into(),
            response_time: Duration::ZERO,
        }
    }

    /// Build the record of a node from its lookup results.
    ///
    /// Protocol and port always come from the queried address; optional
    /// parts stay `None` when absent from `fetched`.
    pub fn assemble(address: &NodeAddress, fetched: FetchedNode) -> Self {
        NodeData {
            info: fetched.info,
            health: fetched.health,
            server: fetched.server,
            protocol: address.protocol.to_string(),
            api_port: address.port.to_string(),
            response_time: fetched.response_time,
        }
    }

    pub fn with_info(mut self, info: NodeInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn public_key(&self) -> Option<&str> {
        self.info.as_ref().map(|info| info.public_key.as_str())
    }

    pub fn host(&self) -> Option<&str> {
        self.info.as_ref().map(|info| info.host.as_str())
    }

    /// `true` if health was collected and both components are up.
    pub fn is_healthy(&self) -> bool {
        self.health.is_some_and(|health| health.is_healthy())
    }

    /// The gateway URL of this node, `None` without identity.
    pub fn url(&self) -> Option<NodeUrl> {
        self.info.as_ref().map(|info| NodeUrl {
            host: info.host.clone(),
            protocol: self.protocol.clone(),
            port: self.api_port.clone(),
        })
    }
}

/// Ordered collection of node records, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodesData {
    nodes: Vec<NodeData>,
}

impl NodesData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeData) {
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeData> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[NodeData] {
        &self.nodes
    }

    pub fn into_vec(self) -> Vec<NodeData> {
        self.nodes
    }

    /// Keep the records matching `conditions`, preserving their order.
    ///
    /// The receiver is left untouched.
    ///
    /// # Arguments
    ///
    /// * `conditions` - Predicate a record must satisfy to be kept.
    ///
    /// # Returns
    ///
    /// A new collection, possibly empty.
    pub fn selection<F>(&self, conditions: F) -> NodesData
    where
        F: Fn(&NodeData) -> bool,
    {
        self.nodes
            .iter()
            .filter(|node| conditions(node))
            .cloned()
            .collect()
    }

    /// Project every record to its gateway URL, preserving order.
    ///
    /// # Panics
    ///
    /// Panics if a record has no identity. Records produced by a collection
    /// always have one.
    pub fn take_out_urls(&self) -> Vec<NodeUrl> {
        self.nodes
            .iter()
            .map(|node| {
                node.url()
                    .expect("take_out_urls requires every record to carry node info")
            })
            .collect()
    }
}

impl FromIterator<NodeData> for NodesData {
    fn from_iter<I: IntoIterator<Item = NodeData>>(iter: I) -> Self {
        NodesData {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<NodeData>> for NodesData {
    fn from(nodes: Vec<NodeData>) -> Self {
        NodesData { nodes }
    }
}

impl IntoIterator for NodesData {
    type Item = NodeData;
    type IntoIter = std::vec::IntoIter<NodeData>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodesData {
    type Item = &'a NodeData;
    type IntoIter = std::slice::Iter<'a, NodeData>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
