//! Error types for REST requests.

use std::error::Error;
use std::fmt;

/// Errors that can occur while querying a node's REST gateway.
#[derive(Debug)]
pub enum ClientError {
    /// The request failed: connection refused, timeout, or a non-success status.
    Request(reqwest::Error),
    /// The response body did not match the expected shape.
    Decode(serde_json::Error),
    /// The node address could not be parsed.
    InvalidAddress(String),
}

impl ClientError {
    /// `true` if the request gave up waiting on the node.
    pub fn is_timeout(&self) -> bool {
        match self {
            ClientError::Request(err) => err.is_timeout(),
            _ => false,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Request(err) => write!(f, "Request failed: {err}"),
            ClientError::Decode(err) => write!(f, "Malformed response: {err}"),
            ClientError::InvalidAddress(reason) => write!(f, "Invalid node address: {reason}"),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientError::Request(err) => Some(err),
            ClientError::Decode(err) => Some(err),
            ClientError::InvalidAddress(_) => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Request(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err)
    }
}
