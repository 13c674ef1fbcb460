//! Answering peers' sync queries.
//!
//! The responder is the inbound half of the protocol. It is transport
//! agnostic: the web layer hands it the raw request body and turns the
//! returned [`InboundReply`] into an HTTP response.

use async_trait::async_trait;
use sso_core::{DisclosedRecord, SyncRequestEnvelope, SyncTopology};
use sso_store::UserStore;

use crate::auth::SyncAuthenticator;
use crate::error::{Result, SyncError};
use crate::projector::ResponseProjector;

/// Body of an inbound reply.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplyBody {
    /// `200` payload: one disclosed record per match.
    Json(Vec<DisclosedRecord>),
    /// Plaintext error message.
    Text(&'static str),
}

/// Status and body for an inbound request.
#[derive(Clone, Debug, PartialEq)]
pub struct InboundReply {
    pub status: u16,
    pub body: ReplyBody,
}

impl InboundReply {
    pub fn ok(records: Vec<DisclosedRecord>) -> Self {
        Self {
            status: 200,
            body: ReplyBody::Json(records),
        }
    }

    pub fn error(err: &SyncError) -> Self {
        Self {
            status: err.status_code(),
            body: ReplyBody::Text(err.reply_text()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can answer a raw `POST /sso/sync` body.
///
/// Object-safe so route registrars and in-memory networks can hold
/// handlers without knowing the store type.
#[async_trait]
pub trait InboundHandler: Send + Sync {
    async fn handle(&self, body: &[u8]) -> InboundReply;
}

/// Serves sync queries from the local store.
pub struct SyncResponder<S: UserStore> {
    authenticator: SyncAuthenticator,
    store: S,
}

impl<S: UserStore> SyncResponder<S> {
    pub fn new(store: S, topology: SyncTopology) -> Self {
        Self {
            authenticator: SyncAuthenticator::new(topology),
            store,
        }
    }

    pub fn authenticator(&self) -> &SyncAuthenticator {
        &self.authenticator
    }

    /// Answer a decoded request.
    ///
    /// Checks run in order: topology configured, secret accepted, paths
    /// present. The store is only queried once all three pass.
    pub async fn respond(&self, envelope: &SyncRequestEnvelope) -> Result<Vec<DisclosedRecord>> {
        if !self.authenticator.is_configured() {
            return Err(SyncError::NotConfigured);
        }

        let Some(peer) = self.authenticator.authenticate(envelope.auth()) else {
            tracing::warn!("rejected sync request with invalid auth");
            return Err(SyncError::NotAuthorized);
        };

        let projector = ResponseProjector::new(envelope.paths().unwrap_or_default())?;

        let records = self.store.find(&envelope.query).await.map_err(|e| {
            tracing::error!(peer = %peer.name, error = %e, "sync query failed");
            SyncError::from(e)
        })?;

        tracing::debug!(
            peer = %peer.name,
            matched = records.len(),
            paths = projector.paths().len(),
            "answering sync query"
        );
        Ok(projector.project(&records))
    }
}

#[async_trait]
impl<S: UserStore> InboundHandler for SyncResponder<S> {
    async fn handle(&self, body: &[u8]) -> InboundReply {
        let envelope = match SyncRequestEnvelope::from_slice(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(error = %e, "undecodable sync request");
                return InboundReply::error(&SyncError::from(e));
            }
        };

        match self.respond(&envelope).await {
            Ok(records) => InboundReply::ok(records),
            Err(e) => InboundReply::error(&e),
        }
    }
}
