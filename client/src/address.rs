//! REST endpoint addressing for Symbol nodes.

use crate::error::ClientError;
use std::fmt;
use std::str::FromStr;

/// Default REST port served over plain HTTP.
pub const DEFAULT_HTTP_PORT: u16 = 3000;
/// Default REST port served over HTTPS.
pub const DEFAULT_HTTPS_PORT: u16 = 3001;

/// Scheme a REST gateway is served over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }

    /// Conventional REST port for this scheme.
    pub fn default_port(&self) -> u16 {
        match self {
            Protocol::Http => DEFAULT_HTTP_PORT,
            Protocol::Https => DEFAULT_HTTPS_PORT,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            _ => Err(ClientError::InvalidAddress(format!("unsupported scheme {s}"))),
        }
    }
}

/// Location of a node's REST gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAddress {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
}

impl NodeAddress {
    /// Create a new address.
    pub fn new(protocol: Protocol, host: impl Into<String>, port: u16) -> Self {
        NodeAddress {
            protocol,
            host: host.into(),
            port,
        }
    }

    /// Parse an address such as `https://symbol.dev:3001`.
    ///
    /// A missing scheme defaults to `http` and a missing port to the
    /// scheme's conventional REST port. Paths are not allowed.
    ///
    /// # Arguments
    ///
    /// * `input` - The address string.
    ///
    /// # Returns
    ///
    /// * `Ok(NodeAddress)` - The parsed address.
    /// * `Err(ClientError::InvalidAddress)` - If the host or port is malformed.
    pub fn parse(input: &str) -> Result<Self, ClientError> {
        let input = input.trim();
        let (protocol, rest) = match input.split_once("://") {
            Some((scheme, rest)) => (scheme.parse::<Protocol>()?, rest),
            None => (Protocol::Http, input),
        };
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        if rest.contains('/') {
            return Err(ClientError::InvalidAddress(format!(
                "unexpected path in {input}"
            )));
        }

        // IPv6 hosts keep their brackets so the address can be displayed as a URL.
        let (host, port) = match rest.find(']') {
            Some(end) if rest.starts_with('[') => {
                let (host, tail) = rest.split_at(end + 1);
                if tail.is_empty() {
                    (host, None)
                } else {
                    let port = tail.strip_prefix(':').ok_or_else(|| {
                        ClientError::InvalidAddress(format!("invalid host in {input}"))
                    })?;
                    (host, Some(port))
                }
            }
            Some(_) => {
                return Err(ClientError::InvalidAddress(format!(
                    "invalid host in {input}"
                )))
            }
            None => match rest.split_once(':') {
                Some((_, port)) if port.contains(':') => {
                    return Err(ClientError::InvalidAddress(format!(
                        "IPv6 host must be bracketed in {input}"
                    )))
                }
                Some((host, port)) => (host, Some(port)),
                None => (rest, None),
            },
        };
        let port = match port {
            Some(port) => port.parse::<u16>().map_err(|_| {
                ClientError::InvalidAddress(format!("invalid port in {input}"))
            })?,
            None => protocol.default_port(),
        };
        if host.is_empty() {
            return Err(ClientError::InvalidAddress(format!("missing host in {input}")));
        }

        Ok(NodeAddress::new(protocol, host, port))
    }

    /// The `host:port` pair identifying this endpoint before its identity is known.
    pub fn key(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Full URL of a REST route on this node.
    pub fn route(&self, path: &str) -> String {
        format!("{self}{path}")
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.protocol, self.host, self.port)
    }
}

impl FromStr for NodeAddress {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeAddress::parse(s)
    }
}
