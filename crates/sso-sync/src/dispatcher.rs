//! Fan-out of one sync query to every configured peer.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use sso_core::{DisclosedRecord, Filter, SyncQuery, SyncTopology};

use crate::error::SyncError;
use crate::transport::PeerTransport;

/// Configuration for dispatch behavior.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Per-peer limit; `None` leaves it to the transport.
    pub request_timeout: Option<Duration>,
}

impl DispatchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.request_timeout = None;
        self
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// One peer's successful answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerResponse {
    /// Name of the answering peer.
    pub peer: String,
    /// Records it disclosed; possibly empty.
    pub records: Vec<DisclosedRecord>,
}

/// Queries all peers concurrently and keeps the answers that arrived.
pub struct PeerDispatcher<T: PeerTransport> {
    topology: SyncTopology,
    transport: Arc<T>,
    config: DispatchConfig,
}

impl<T: PeerTransport + 'static> PeerDispatcher<T> {
    pub fn new(topology: SyncTopology, transport: T, config: DispatchConfig) -> Self {
        Self {
            topology,
            transport: Arc::new(transport),
            config,
        }
    }

    pub fn topology(&self) -> &SyncTopology {
        &self.topology
    }

    /// Send `query` to `path` on every peer.
    ///
    /// Each peer runs in its own task. A peer that fails, times out or
    /// panics is logged and left out; it never affects the others.
    /// Answers come back in topology order.
    pub async fn dispatch(&self, path: &str, query: &Filter) -> Vec<PeerResponse> {
        if self.topology.is_empty() {
            tracing::debug!("no sync peers configured, skipping dispatch");
            return Vec::new();
        }

        let tasks = self.topology.iter().map(|peer| {
            let transport = Arc::clone(&self.transport);
            let body = SyncQuery::new(query.clone(), peer.clone());
            let peer = peer.clone();
            let path = path.to_owned();
            let timeout = self.config.request_timeout;

            tokio::spawn(async move {
                let call = transport.post(&peer, &path, &body);
                let result = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, call).await {
                        Ok(result) => result,
                        Err(_) => Err(SyncError::Timeout(format!(
                            "peer {} did not answer within {:?}",
                            peer.name, limit
                        ))),
                    },
                    None => call.await,
                };
                (peer.name, result)
            })
        });

        let mut responses = Vec::with_capacity(self.topology.len());
        for joined in join_all(tasks).await {
            match joined {
                Ok((peer, Ok(records))) => {
                    tracing::debug!(peer = %peer, records = records.len(), "peer answered");
                    responses.push(PeerResponse { peer, records });
                }
                Ok((peer, Err(e))) => {
                    tracing::warn!(peer = %peer, error = %e, "peer sync request failed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "peer sync task failed");
                }
            }
        }
        responses
    }
}
