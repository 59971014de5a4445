//! Symbol node information structures as served by the REST gateway.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role bitmask advertised by a node.
///
/// * **1** - Peer, takes part in block propagation.
/// * **2** - Api, runs a REST gateway next to the node.
/// * **4** - Voting, participates in finalization.
///
/// Nodes may combine roles, e.g. 3 is a peer node with an attached gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roles(u32);

impl Roles {
    pub const NONE: Roles = Roles(0);
    pub const PEER: Roles = Roles(1);
    pub const API: Roles = Roles(2);
    pub const VOTING: Roles = Roles(4);

    /// Create a role mask from its raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Roles(bits)
    }

    /// Raw bits of the mask.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Checks if every role in `other` is present in this mask.
    ///
    /// # Arguments
    ///
    /// * `other` - The role (or combination of roles) to check for.
    ///
    /// # Returns
    ///
    /// `true` if all roles are advertised, `false` otherwise.
    pub fn has(self, other: Roles) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Roles {
    type Output = Roles;

    fn bitor(self, rhs: Self) -> Self::Output {
        Roles(self.0 | rhs.0)
    }
}

impl fmt::Display for Roles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Roles::PEER, "Peer"),
            (Roles::API, "Api"),
            (Roles::VOTING, "Voting"),
        ]
        .iter()
        .filter(|(role, _)| self.has(*role))
        .map(|(_, name)| *name)
        .collect();

        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

/// Identity of a node, returned by `/node/info` and as the entries of `/node/peers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    /// Catapult server version, packed into a single integer.
    #[serde(default)]
    pub version: u32,
    /// Node's public key. Stable across hosts, used as the identity key.
    pub public_key: String,
    /// Generation hash seed of the network the node belongs to.
    #[serde(default, alias = "networkGenerationHash")]
    pub network_generation_hash_seed: String,
    /// Advertised roles.
    #[serde(default)]
    pub roles: Roles,
    /// P2P port, not the REST port.
    #[serde(default)]
    pub port: u16,
    /// Network identifier byte (104 mainnet, 152 testnet).
    #[serde(default)]
    pub network_identifier: u8,
    /// Host the node advertises, may be empty for private nodes.
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub friendly_name: String,
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) [roles: {}, key: {}]",
            self.host, self.friendly_name, self.roles, self.public_key
        )
    }
}

/// Liveness of one node component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    Down,
}

impl Status {
    pub fn is_up(self) -> bool {
        matches!(self, Status::Up)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Up => write!(f, "up"),
            Status::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// REST gateway reachability of the node process.
    pub api_node: Status,
    /// Database behind the gateway.
    pub db: Status,
}

/// Health report returned by `/node/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHealth {
    pub status: HealthStatus,
}

impl NodeHealth {
    /// Create a health report from the two component states.
    pub fn new(api_node: Status, db: Status) -> Self {
        NodeHealth {
            status: HealthStatus { api_node, db },
        }
    }

    /// `true` when both the API node and the database report up.
    pub fn is_healthy(&self) -> bool {
        self.status.api_node.is_up() && self.status.db.is_up()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub rest_version: String,
    #[serde(default)]
    pub sdk_version: String,
}

/// Gateway metadata returned by `/node/server`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeServer {
    pub server_info: ServerInfo,
}

impl NodeServer {
    pub fn new(rest_version: impl Into<String>, sdk_version: impl Into<String>) -> Self {
        NodeServer {
            server_info: ServerInfo {
                rest_version: rest_version.into(),
                sdk_version: sdk_version.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_has() {
        let roles = Roles::PEER | Roles::API;
        assert!(roles.has(Roles::PEER));
        assert!(roles.has(Roles::API));
        assert!(!roles.has(Roles::VOTING));
        assert!(roles.has(Roles::NONE));
        assert_eq!(roles.to_string(), "Peer|Api");
        assert_eq!(Roles::NONE.to_string(), "none");
    }

    #[test]
    fn test_node_info_decode() {
        let body = r#"{
            "version": 16777728,
            "publicKey": "A0B1C2",
            "networkGenerationHashSeed": "57F7DA20",
            "roles": 3,
            "port": 7900,
            "networkIdentifier": 104,
            "host": "symbol.dev",
            "friendlyName": "dev node",
            "nodePublicKey": "ignored"
        }"#;
        let info: NodeInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.public_key, "A0B1C2");
        assert_eq!(info.network_generation_hash_seed, "57F7DA20");
        assert!(info.roles.has(Roles::API));
        assert_eq!(info.port, 7900);
        assert_eq!(info.network_identifier, 104);
        assert_eq!(info.host, "symbol.dev");
        assert_eq!(info.friendly_name, "dev node");
    }

    #[test]
    fn test_node_info_legacy_hash_field() {
        let body = r#"{"publicKey": "AA", "networkGenerationHash": "BB", "host": "h"}"#;
        let info: NodeInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.network_generation_hash_seed, "BB");
        assert_eq!(info.roles, Roles::NONE);
    }

    #[test]
    fn test_health_decode() {
        let body = r#"{"status": {"apiNode": "up", "db": "down"}}"#;
        let health: NodeHealth = serde_json::from_str(body).unwrap();
        assert_eq!(health, NodeHealth::new(Status::Up, Status::Down));
        assert!(!health.is_healthy());

        let bad = r#"{"status": {"apiNode": "sideways", "db": "up"}}"#;
        assert!(serde_json::from_str::<NodeHealth>(bad).is_err());
    }

    #[test]
    fn test_server_decode() {
        let body = r#"{"serverInfo": {"restVersion": "2.4.4", "sdkVersion": "3.0.7", "deployment": {}}}"#;
        let server: NodeServer = serde_json::from_str(body).unwrap();
        assert_eq!(server, NodeServer::new("2.4.4", "3.0.7"));
    }
}
