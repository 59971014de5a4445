//! Error types for collector configuration and collection runs.

use catcollector_client::{ClientError, NodeAddress};
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tokio::task::JoinError;

/// Errors that can occur during collector configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorBuilderError {
    /// At least one concurrent task is required to make progress.
    InvalidConcurrency(usize),
}

impl fmt::Display for CollectorBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectorBuilderError::InvalidConcurrency(tasks) => {
                write!(f, "Invalid concurrency: {tasks}, must be at least 1")
            }
        }
    }
}

impl Error for CollectorBuilderError {}

/// A failure recorded during a collection.
///
/// None of these abort a collection, they describe what is missing from the
/// results.
#[derive(Debug)]
pub enum CollectError {
    /// Identity lookup failed, the node was skipped.
    Identity {
        node: NodeAddress,
        source: ClientError,
    },
    /// Peer lookup failed, the node was recorded but not expanded.
    Peers {
        node: NodeAddress,
        source: ClientError,
    },
    /// Health lookup failed, the node was recorded without health.
    Health {
        node: NodeAddress,
        source: ClientError,
    },
    /// Server lookup failed, the node was recorded without server info.
    Server {
        node: NodeAddress,
        source: ClientError,
    },
    /// A node processing task panicked, the node it handled is lost.
    TaskFailed(JoinError),
    /// Caller cancelled the collection.
    Cancelled,
    /// Configured collection timeout elapsed.
    TimedOut(Duration),
}

impl CollectError {
    /// Address of the node the failure concerns, if any.
    pub fn node(&self) -> Option<&NodeAddress> {
        match self {
            CollectError::Identity { node, .. }
            | CollectError::Peers { node, .. }
            | CollectError::Health { node, .. }
            | CollectError::Server { node, .. } => Some(node),
            CollectError::TaskFailed(_) | CollectError::Cancelled | CollectError::TimedOut(_) => {
                None
            }
        }
    }

    /// `true` for entries which ended the collection early.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CollectError::Cancelled | CollectError::TimedOut(_))
    }
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::Identity { node, source } => {
                write!(f, "Failed to fetch node info from {node}: {source}")
            }
            CollectError::Peers { node, source } => {
                write!(f, "Failed to fetch peers from {node}: {source}")
            }
            CollectError::Health { node, source } => {
                write!(f, "Failed to fetch health from {node}: {source}")
            }
            CollectError::Server { node, source } => {
                write!(f, "Failed to fetch server info from {node}: {source}")
            }
            CollectError::TaskFailed(e) => write!(f, "Node processing task failed: {e}"),
            CollectError::Cancelled => write!(f, "Collection cancelled"),
            CollectError::TimedOut(after) => write!(f, "Collection timed out after {after:?}"),
        }
    }
}

impl Error for CollectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CollectError::Identity { source, .. }
            | CollectError::Peers { source, .. }
            | CollectError::Health { source, .. }
            | CollectError::Server { source, .. } => Some(source),
            CollectError::TaskFailed(e) => Some(e),
            CollectError::Cancelled | CollectError::TimedOut(_) => None,
        }
    }
}

/// Ordered log of failures accumulated by one collection.
#[derive(Debug, Default)]
pub struct ErrorLog {
    entries: Vec<CollectError>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: CollectError) {
        self.entries.push(error);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CollectError> {
        self.entries.iter()
    }

    /// `true` if the collection was cut short by cancellation or timeout.
    pub fn is_interrupted(&self) -> bool {
        self.entries.iter().any(CollectError::is_terminal)
    }
}

impl Extend<CollectError> for ErrorLog {
    fn extend<I: IntoIterator<Item = CollectError>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for ErrorLog {
    type Item = CollectError;
    type IntoIter = std::vec::IntoIter<CollectError>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorLog {
    type Item = &'a CollectError;
    type IntoIter = std::slice::Iter<'a, CollectError>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for ErrorLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
