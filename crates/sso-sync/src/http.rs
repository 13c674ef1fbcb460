//! HTTP transport implementation.
//!
//! Sends `POST <peer.link><path>` with a JSON body via reqwest and decodes
//! the JSON array the peer answers with.

use std::time::Duration;

use async_trait::async_trait;
use sso_core::{DisclosedRecord, PeerConfig, SyncQuery};

use crate::error::{Result, SyncError};
use crate::transport::PeerTransport;

/// reqwest-based peer transport.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport; `timeout` bounds each whole request.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SyncError::TransportError(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn transport_error(peer: &PeerConfig, e: reqwest::Error) -> SyncError {
    if e.is_timeout() {
        SyncError::Timeout(format!("waiting for peer {}", peer.name))
    } else {
        SyncError::TransportError(format!("peer {}: {}", peer.name, e))
    }
}

#[async_trait]
impl PeerTransport for HttpTransport {
    async fn post(
        &self,
        peer: &PeerConfig,
        path: &str,
        body: &SyncQuery,
    ) -> Result<Vec<DisclosedRecord>> {
        let response = self
            .client
            .post(peer.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(peer, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::PeerStatus {
                peer: peer.name.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(peer, e))?;
        serde_json::from_slice(&bytes).map_err(|e| SyncError::InvalidResponse {
            peer: peer.name.clone(),
            message: e.to_string(),
        })
    }
}
