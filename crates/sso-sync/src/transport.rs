//! Transport abstraction for outbound sync requests.
//!
//! The transport layer delivers one request to one peer and hands back the
//! decoded response. [`HttpTransport`](crate::http::HttpTransport) is the
//! production implementation; [`memory::MemoryTransport`] connects nodes
//! in-process for tests.

use std::sync::Arc;

use async_trait::async_trait;
use sso_core::{DisclosedRecord, PeerConfig, SyncQuery};

use crate::error::Result;

/// Transport trait for sending sync queries to peers.
///
/// Implementations must be thread-safe (Send + Sync). A non-success status
/// or an undecodable body must be reported as an error, not as an empty
/// response.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// POST `body` to `path` on `peer` and decode the disclosed records.
    async fn post(
        &self,
        peer: &PeerConfig,
        path: &str,
        body: &SyncQuery,
    ) -> Result<Vec<DisclosedRecord>>;
}

#[async_trait]
impl<T: PeerTransport + ?Sized> PeerTransport for Arc<T> {
    async fn post(
        &self,
        peer: &PeerConfig,
        path: &str,
        body: &SyncQuery,
    ) -> Result<Vec<DisclosedRecord>> {
        (**self).post(peer, path, body).await
    }
}

/// A simple in-memory transport for testing.
///
/// Nodes register their inbound handler under their link; posts are
/// JSON-encoded and decoded exactly as they would be on the wire.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use tokio::sync::RwLock;

    use crate::error::SyncError;
    use crate::responder::{InboundHandler, ReplyBody};

    /// Injected failure for one link.
    #[derive(Debug, Clone)]
    pub enum Fault {
        /// Connection refused.
        Unreachable,
        /// Answer only after the given delay.
        Delay(Duration),
        /// Answer `200` with a body that is not a record array.
        Garbage,
    }

    /// Shared state for the memory transport network.
    #[derive(Default)]
    pub struct MemoryNetwork {
        /// Inbound handlers by link.
        handlers: RwLock<HashMap<String, Arc<dyn InboundHandler>>>,
        /// Active faults by link.
        faults: RwLock<HashMap<String, Fault>>,
        /// Requests delivered (or attempted) per link.
        requests: RwLock<HashMap<String, usize>>,
    }

    impl MemoryNetwork {
        /// Create a new memory network.
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Serve `handler` under `link`.
        pub async fn register(&self, link: impl Into<String>, handler: Arc<dyn InboundHandler>) {
            self.handlers.write().await.insert(link.into(), handler);
        }

        /// Make every request to `link` fail (or stall) as described.
        pub async fn set_fault(&self, link: impl Into<String>, fault: Fault) {
            self.faults.write().await.insert(link.into(), fault);
        }

        pub async fn clear_fault(&self, link: &str) {
            self.faults.write().await.remove(link);
        }

        /// Number of requests addressed to `link` so far.
        pub async fn request_count(&self, link: &str) -> usize {
            self.requests.read().await.get(link).copied().unwrap_or(0)
        }

        /// Create a transport connected to this network.
        pub fn transport(self: &Arc<Self>) -> MemoryTransport {
            MemoryTransport {
                network: Arc::clone(self),
            }
        }
    }

    /// In-memory transport implementation.
    #[derive(Clone)]
    pub struct MemoryTransport {
        network: Arc<MemoryNetwork>,
    }

    #[async_trait]
    impl PeerTransport for MemoryTransport {
        async fn post(
            &self,
            peer: &PeerConfig,
            path: &str,
            body: &SyncQuery,
        ) -> Result<Vec<DisclosedRecord>> {
            *self
                .network
                .requests
                .write()
                .await
                .entry(peer.link.clone())
                .or_default() += 1;

            let fault = self.network.faults.read().await.get(&peer.link).cloned();
            match fault {
                Some(Fault::Unreachable) => {
                    return Err(SyncError::TransportError(format!(
                        "connection refused: {}",
                        peer.endpoint(path)
                    )))
                }
                Some(Fault::Delay(delay)) => tokio::time::sleep(delay).await,
                Some(Fault::Garbage) => {
                    return Err(SyncError::InvalidResponse {
                        peer: peer.name.clone(),
                        message: "expected a JSON array".into(),
                    })
                }
                None => {}
            }

            let handler = self
                .network
                .handlers
                .read()
                .await
                .get(&peer.link)
                .cloned()
                .ok_or_else(|| {
                    SyncError::TransportError(format!("no route to {}", peer.endpoint(path)))
                })?;

            let request = serde_json::to_vec(body)
                .map_err(|e| SyncError::TransportError(e.to_string()))?;
            let reply = handler.handle(&request).await;

            if !reply.is_success() {
                return Err(SyncError::PeerStatus {
                    peer: peer.name.clone(),
                    status: reply.status,
                });
            }

            match reply.body {
                ReplyBody::Json(records) => {
                    let bytes = serde_json::to_vec(&records)
                        .map_err(|e| SyncError::TransportError(e.to_string()))?;
                    serde_json::from_slice(&bytes).map_err(|e| SyncError::InvalidResponse {
                        peer: peer.name.clone(),
                        message: e.to_string(),
                    })
                }
                ReplyBody::Text(text) => Err(SyncError::InvalidResponse {
                    peer: peer.name.clone(),
                    message: format!("unexpected text body: {}", text),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::{Fault, MemoryNetwork};
    use super::*;
    use crate::error::SyncError;
    use crate::responder::{InboundHandler, InboundReply};
    use sso_core::{FieldMap, Filter};

    struct Echo;

    #[async_trait]
    impl InboundHandler for Echo {
        async fn handle(&self, body: &[u8]) -> InboundReply {
            let query: SyncQuery = serde_json::from_slice(body).unwrap();
            let mut record = FieldMap::new();
            record.insert("asked_by".into(), query.sync.name.into());
            InboundReply::ok(vec![record])
        }
    }

    fn peer() -> PeerConfig {
        PeerConfig::new("beta", "mem://beta", "k")
    }

    #[tokio::test]
    async fn test_memory_transport_roundtrip() {
        let network = MemoryNetwork::new();
        network.register("mem://beta", Arc::new(Echo)).await;
        let transport = network.transport();

        let body = SyncQuery::new(Filter::new(), peer());
        let records = transport.post(&peer(), "/sso/sync", &body).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["asked_by"], "beta".into());
        assert_eq!(network.request_count("mem://beta").await, 1);
    }

    #[tokio::test]
    async fn test_memory_transport_faults() {
        let network = MemoryNetwork::new();
        network.register("mem://beta", Arc::new(Echo)).await;
        let transport = network.transport();
        let body = SyncQuery::new(Filter::new(), peer());

        network.set_fault("mem://beta", Fault::Unreachable).await;
        let err = transport.post(&peer(), "/sso/sync", &body).await.unwrap_err();
        assert!(matches!(err, SyncError::TransportError(_)));

        network.clear_fault("mem://beta").await;
        assert!(transport.post(&peer(), "/sso/sync", &body).await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_transport_unknown_link() {
        let network = MemoryNetwork::new();
        let transport = network.transport();
        let body = SyncQuery::new(Filter::new(), peer());

        let err = transport.post(&peer(), "/sso/sync", &body).await.unwrap_err();
        assert!(err.to_string().contains("no route"));
    }
}
