mod address;
mod error;
mod node;
mod rest;

pub use address::{NodeAddress, Protocol, DEFAULT_HTTPS_PORT, DEFAULT_HTTP_PORT};
pub use error::ClientError;
pub use node::{HealthStatus, NodeHealth, NodeInfo, NodeServer, Roles, ServerInfo, Status};
pub use rest::{default_user_agent, RestClient, RestClientConfiguration, DEFAULT_REQUEST_TIMEOUT};
