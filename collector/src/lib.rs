mod builder;
mod collector;
mod error;
mod nodes;
mod query;
mod session;
mod visited;

pub use builder::{CollectorBuilder, DEFAULT_MAX_CONCURRENT_TASKS};
pub use collector::{CollectReport, Collector};
pub use error::{CollectError, CollectorBuilderError, ErrorLog};
pub use nodes::{FetchedNode, NodeData, NodeUrl, NodesData};
pub use query::NodeQuery;
pub use visited::{ExcludedNodes, NodeKey, VisitedSet};

// Re-exports.
pub use catcollector_client::{
    ClientError, NodeAddress, NodeHealth, NodeInfo, NodeServer, Protocol, RestClient,
    RestClientConfiguration, Roles, Status,
};
pub use tokio_util::sync::CancellationToken;
