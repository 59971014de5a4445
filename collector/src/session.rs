//! Internal session coordination for collection runs.
//!
//! This module contains the [`CollectSession`] which orchestrates a collection
//! by managing the frontier and coordinating concurrent node processing tasks.

use crate::error::{CollectError, ErrorLog};
use crate::nodes::{FetchedNode, NodeData, NodesData};
use crate::query::NodeQuery;
use crate::visited::{ExcludedNodes, NodeKey, VisitedSet};
use crate::CollectReport;
use catcollector_client::{NodeAddress, NodeInfo, Protocol, Roles};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Configuration for a collect session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_concurrent_tasks: usize,
    pub include_health: bool,
    pub include_server: bool,
    pub excluded_nodes: ExcludedNodes,
    /// Scheme peers' REST gateways are assumed to be served over.
    pub peer_protocol: Protocol,
    /// Port peers' REST gateways are assumed to listen on.
    pub peer_port: u16,
    /// Skip peers which do not advertise the API role.
    pub api_nodes_only: bool,
    pub collect_timeout: Option<Duration>,
}

/// Result of processing a single node.
#[derive(Debug)]
enum TaskResult {
    /// Identity fetched, record built. Peers are candidates for the frontier.
    Collected {
        record: NodeData,
        peers: Vec<NodeAddress>,
        failures: Vec<CollectError>,
    },
    /// Node already collected under another address.
    Duplicate { node: NodeAddress, key: NodeKey },
    /// Node reports a host which is excluded.
    Excluded { node: NodeAddress, host: String },
    /// Identity lookup failed.
    Failed(CollectError),
}

/// Internal coordinator for a collection run.
///
/// # Architecture
///
/// * **Coordinator** (`coordinate()`) - Owns the frontier, the results and the
///   error log, decides what gets scheduled and when the run is over.
/// * **Processors** (`process()`) - Fetch a single node and report back.
///
/// Processors never touch the results directly, every outcome flows back to the
/// coordinator through the task set.
#[derive(Clone)]
pub struct CollectSession<Q> {
    query: Q,
    config: Arc<SessionConfig>,
    /// Shared ledger of scheduled addresses and collected identities.
    visited: VisitedSet,
}

impl<Q: NodeQuery> CollectSession<Q> {
    /// Create a new collect session with a fresh visited set.
    pub fn new(query: Q, config: SessionConfig) -> Self {
        Self {
            query,
            config: Arc::new(config),
            visited: VisitedSet::new(),
        }
    }

    /// Fetches a single node and turns the lookups into a record.
    ///
    /// The lookups are issued concurrently, the response time is that of the
    /// slowest one.
    async fn process(&self, address: NodeAddress) -> TaskResult {
        debug!("Processing node {address}");

        let started = Instant::now();
        let (identity, peers, health, server) = tokio::join!(
            self.query.fetch_identity(&address),
            self.query.fetch_peers(&address),
            async {
                if self.config.include_health {
                    Some(self.query.fetch_health(&address).await)
                } else {
                    None
                }
            },
            async {
                if self.config.include_server {
                    Some(self.query.fetch_server_info(&address).await)
                } else {
                    None
                }
            },
        );
        let response_time = started.elapsed();

        let info = match identity {
            Ok(info) => info,
            Err(source) => {
                return TaskResult::Failed(CollectError::Identity {
                    node: address,
                    source,
                })
            }
        };

        let key = NodeKey::identity(&info, &address);
        if !self.visited.try_mark(key.clone()).await {
            return TaskResult::Duplicate { node: address, key };
        }

        // Records are projected from the reported host, so it is excluded too.
        let reported = NodeAddress::new(address.protocol, info.host.clone(), address.port);
        if self.config.excluded_nodes.matches(&reported) {
            return TaskResult::Excluded {
                node: address,
                host: info.host,
            };
        }

        let mut failures = Vec::new();
        let health = match health {
            Some(Ok(health)) => Some(health),
            Some(Err(source)) => {
                failures.push(CollectError::Health {
                    node: address.clone(),
                    source,
                });
                None
            }
            None => None,
        };
        let server = match server {
            Some(Ok(server)) => Some(server),
            Some(Err(source)) => {
                failures.push(CollectError::Server {
                    node: address.clone(),
                    source,
                });
                None
            }
            None => None,
        };
        let peers = match peers {
            Ok(peers) => self.candidates(peers).await,
            Err(source) => {
                failures.push(CollectError::Peers {
                    node: address.clone(),
                    source,
                });
                Vec::new()
            }
        };

        let record = NodeData::assemble(
            &address,
            FetchedNode {
                info: Some(info),
                health,
                server,
                response_time,
            },
        );

        TaskResult::Collected {
            record,
            peers,
            failures,
        }
    }

    /// Converts peer descriptors into fetchable addresses.
    ///
    /// Peers whose identity is already collected are dropped here. This is
    /// simply a performance optimization, deduplication is ensured by the
    /// coordinator and by the identity mark in `process()`.
    async fn candidates(&self, peers: Vec<NodeInfo>) -> Vec<NodeAddress> {
        let mut candidates = Vec::with_capacity(peers.len());
        for peer in peers {
            if peer.host.is_empty() {
                continue;
            }
            if self.config.api_nodes_only && !peer.roles.has(Roles::API) {
                debug!("Skipping peer {} without API role", peer.host);
                continue;
            }
            if !peer.public_key.is_empty()
                && self
                    .visited
                    .contains(&NodeKey::PublicKey(peer.public_key.clone()))
                    .await
            {
                continue;
            }
            candidates.push(NodeAddress::new(
                self.config.peer_protocol,
                peer.host,
                self.config.peer_port,
            ));
        }
        candidates
    }

    /// Moves candidates onto the frontier, marking each as visited.
    ///
    /// Excluded and already visited candidates are discarded silently.
    async fn enqueue(&self, frontier: &mut VecDeque<NodeAddress>, candidates: Vec<NodeAddress>) {
        for candidate in candidates {
            if self.config.excluded_nodes.matches(&candidate) {
                debug!("Skipping excluded node {candidate}");
                continue;
            }
            if !self.visited.try_mark(NodeKey::address(&candidate)).await {
                continue;
            }
            frontier.push_back(candidate);
        }
    }

    /// Coordinates the collection by managing the frontier and task scheduling.
    ///
    /// # Termination Conditions
    ///
    /// 1. **Natural Completion** - Frontier empty and all tasks finished.
    /// 2. **Target Reached** - `target` nodes collected (when `target > 0`).
    /// 3. **Cancellation** - `cancel` fired or the session timeout elapsed.
    ///    In-flight tasks are aborted and a terminal entry is logged.
    ///
    /// # Bounding
    ///
    /// A task is only scheduled while `collected + in_flight < target`, so the
    /// result never exceeds `target`. A failed or duplicate task frees its
    /// slot for the next frontier item.
    pub async fn coordinate(
        &self,
        seed: NodeAddress,
        target: usize,
        cancel: CancellationToken,
    ) -> CollectReport {
        let mut frontier = VecDeque::new();
        let mut nodes = NodesData::new();
        let mut errors = ErrorLog::new();
        let mut tasks: JoinSet<TaskResult> = JoinSet::new();

        info!("Collecting nodes starting from {seed}");
        self.enqueue(&mut frontier, vec![seed]).await;

        let deadline = self.config.collect_timeout.map(|after| Instant::now() + after);
        let expired = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expired);

        let mut last_log_time = Instant::now();
        let log_interval = Duration::from_secs(60);

        loop {
            if cancel.is_cancelled() {
                warn!("Collection cancelled, {} nodes collected", nodes.len());
                errors.push(CollectError::Cancelled);
                break;
            }

            while tasks.len() < self.config.max_concurrent_tasks
                && (target == 0 || nodes.len() + tasks.len() < target)
            {
                let Some(address) = frontier.pop_front() else {
                    break;
                };
                let session = self.clone();
                tasks.spawn(async move { session.process(address).await });
            }

            if tasks.is_empty() {
                if target > 0 && nodes.len() >= target {
                    info!("Target of {target} nodes reached");
                } else {
                    info!("Collector exhausted - all reachable nodes processed");
                }
                break;
            }

            // Periodic status logging.
            if last_log_time.elapsed() >= log_interval {
                info!(
                    "{} active tasks (max: {}), {} queued, {} collected, {} keys visited",
                    tasks.len(),
                    self.config.max_concurrent_tasks,
                    frontier.len(),
                    nodes.len(),
                    self.visited.len().await
                );
                last_log_time = Instant::now();
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    warn!("Collection cancelled, abandoning {} active tasks", tasks.len());
                    tasks.abort_all();
                    errors.push(CollectError::Cancelled);
                    break;
                }
                _ = &mut expired => {
                    warn!("Collection timed out, abandoning {} active tasks", tasks.len());
                    tasks.abort_all();
                    // Deadline only exists when a timeout is configured.
                    errors.push(CollectError::TimedOut(
                        self.config.collect_timeout.unwrap_or_default(),
                    ));
                    break;
                }
                Some(joined) = tasks.join_next() => {
                    match joined {
                        Ok(TaskResult::Collected { record, peers, failures }) => {
                            debug!(
                                "Collected {} with {} peer candidates",
                                record.host().unwrap_or_default(),
                                peers.len()
                            );
                            for failure in &failures {
                                debug!("{failure}");
                            }
                            errors.extend(failures);
                            nodes.push(record);
                            if target == 0 || nodes.len() < target {
                                self.enqueue(&mut frontier, peers).await;
                            }
                        }
                        Ok(TaskResult::Duplicate { node, key }) => {
                            debug!("Skipping {node}, {key} already collected");
                        }
                        Ok(TaskResult::Excluded { node, host }) => {
                            debug!("Skipping {node}, reported host {host} is excluded");
                        }
                        Ok(TaskResult::Failed(error)) => {
                            debug!("{error}");
                            errors.push(error);
                        }
                        Err(e) => {
                            warn!("Task failed to complete: {e}");
                            errors.push(CollectError::TaskFailed(e));
                        }
                    }
                }
            }
        }

        let num_collected = nodes.len();
        info!(
            "Collection finished: {num_collected} nodes collected, {} errors",
            errors.len()
        );
        CollectReport::new(nodes, errors)
    }
}
