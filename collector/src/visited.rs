//! Deduplication and exclusion ledgers consulted before a node is fetched.

use catcollector_client::{NodeAddress, NodeInfo};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Key under which a node is recorded as visited.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// `host:port` of the REST endpoint, known before any fetch.
    Address(String),
    /// Node public key, known once the identity lookup succeeds.
    PublicKey(String),
}

impl NodeKey {
    /// Pre-fetch key of an address.
    pub fn address(address: &NodeAddress) -> Self {
        NodeKey::Address(address.key())
    }

    /// Identity key of a fetched node.
    ///
    /// Falls back to the address key for nodes that report no public key, so
    /// that such nodes are not all folded into one.
    pub fn identity(info: &NodeInfo, address: &NodeAddress) -> Self {
        if info.public_key.is_empty() {
            NodeKey::address(address)
        } else {
            NodeKey::PublicKey(info.public_key.clone())
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Address(address) => write!(f, "address {address}"),
            NodeKey::PublicKey(key) => write!(f, "public key {key}"),
        }
    }
}

/// Shared set of node keys already scheduled or fetched.
///
/// Clones share the same underlying set. The lock is only held for the
/// duration of a single set operation, never across a network call.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    keys: Arc<Mutex<HashSet<NodeKey>>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically test and mark a key.
    ///
    /// # Returns
    ///
    /// `true` if the key was absent and is now marked, `false` if it was
    /// already present, in which case nothing changes.
    pub async fn try_mark(&self, key: NodeKey) -> bool {
        self.keys.lock().await.insert(key)
    }

    /// Checks for a key without marking it.
    ///
    /// Only useful as a hint; the answer may be stale by the time it is used.
    pub async fn contains(&self, key: &NodeKey) -> bool {
        self.keys.lock().await.contains(key)
    }

    pub async fn len(&self) -> usize {
        self.keys.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.keys.lock().await.is_empty()
    }
}

/// Caller supplied list of nodes which must never be fetched.
///
/// An entry matches a candidate by host (`symbol.dev`), by `host:port`
/// (`symbol.dev:3000`), or by full URL (`http://symbol.dev:3000`).
/// Matching is case insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedNodes {
    entries: HashSet<String>,
}

impl ExcludedNodes {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|entry| normalize(entry.as_ref()))
            .filter(|entry| !entry.is_empty())
            .collect();
        ExcludedNodes { entries }
    }

    /// Checks if a candidate address is excluded.
    pub fn matches(&self, address: &NodeAddress) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        [
            address.host.clone(),
            address.key(),
            address.to_string(),
        ]
        .iter()
        .any(|form| self.entries.contains(&form.to_ascii_lowercase()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(entry: &str) -> String {
    let entry = entry.trim();
    entry.strip_suffix('/').unwrap_or(entry).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catcollector_client::Protocol;

    #[tokio::test]
    async fn test_try_mark_once() {
        let visited = VisitedSet::new();
        let key = NodeKey::Address("symbol.dev:3000".to_string());

        assert!(visited.try_mark(key.clone()).await);
        assert!(!visited.try_mark(key.clone()).await);
        assert!(visited.contains(&key).await);
        assert_eq!(visited.len().await, 1);

        // Key kinds do not collide.
        assert!(
            visited
                .try_mark(NodeKey::PublicKey("symbol.dev:3000".to_string()))
                .await
        );
        assert_eq!(visited.len().await, 2);
    }

    #[tokio::test]
    async fn test_try_mark_concurrent_single_winner() {
        let visited = VisitedSet::new();
        let mut handles = Vec::new();
        for _ in 0..32 {
            let visited = visited.clone();
            handles.push(tokio::spawn(async move {
                visited
                    .try_mark(NodeKey::PublicKey("PK".to_string()))
                    .await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_identity_key_falls_back_to_address() {
        let address = NodeAddress::new(Protocol::Http, "symbol.dev", 3000);
        let mut info = crate::query::test_utils::node_info("symbol.dev");
        assert_eq!(
            NodeKey::identity(&info, &address),
            NodeKey::PublicKey("PK-symbol.dev".to_string())
        );

        info.public_key.clear();
        assert_eq!(
            NodeKey::identity(&info, &address),
            NodeKey::Address("symbol.dev:3000".to_string())
        );
    }

    #[test]
    fn test_excluded_forms() {
        let address = NodeAddress::new(Protocol::Http, "Symbol.dev", 3000);

        assert!(ExcludedNodes::new(["symbol.dev"]).matches(&address));
        assert!(ExcludedNodes::new(["symbol.dev:3000"]).matches(&address));
        assert!(ExcludedNodes::new(["http://symbol.dev:3000/"]).matches(&address));
        assert!(!ExcludedNodes::new(["symbol.dev:3001"]).matches(&address));
        assert!(!ExcludedNodes::new(["https://symbol.dev:3000"]).matches(&address));
        assert!(!ExcludedNodes::default().matches(&address));
        assert!(ExcludedNodes::new(["", "  "]).is_empty());
    }
}
