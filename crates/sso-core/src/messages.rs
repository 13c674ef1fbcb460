//! Wire envelopes for `POST /sso/sync`.
//!
//! ```text
//! Node A (needs user)                    Node B (peer)
//!   |-- POST /sso/sync ------------------->|
//!   |   { query: {username: "alice"},      |
//!   |     sync:  {name, link, auth, paths}}|
//!   |<-- 200 [ {username, email, ...} ] ---|
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::Filter;
use crate::peer::PeerConfig;
use crate::value::FieldMap;

/// Route every node serves and every peer is queried on.
pub const SYNC_PATH: &str = "/sso/sync";

/// One matched user as disclosed by a peer: requested field -> value.
pub type DisclosedRecord = FieldMap;

/// Fields merged into the local store for one user.
pub type SyncedFields = FieldMap;

/// Outbound request body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncQuery {
    pub query: Filter,
    pub sync: PeerConfig,
}

impl SyncQuery {
    pub fn new(query: Filter, sync: PeerConfig) -> Self {
        Self { query, sync }
    }
}

/// Inbound request body.
///
/// Members a sender includes beyond `auth` and `paths` (its `name`, `link`)
/// are ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SyncRequestEnvelope {
    #[serde(default)]
    pub query: Filter,
    #[serde(default)]
    pub sync: Option<SyncCredentials>,
}

impl SyncRequestEnvelope {
    /// Decode a JSON request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// The presented secret, if any.
    pub fn auth(&self) -> Option<&str> {
        self.sync.as_ref().and_then(|s| s.auth.as_deref())
    }

    /// The requested paths; `None` when missing or empty.
    pub fn paths(&self) -> Option<&[String]> {
        self.sync
            .as_ref()
            .and_then(|s| s.paths.as_deref())
            .filter(|paths| !paths.is_empty())
    }
}

/// The `sync` member of an inbound request.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SyncCredentials {
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub paths: Option<Vec<String>>,
}

impl fmt::Debug for SyncCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncCredentials")
            .field("auth", &self.auth.as_ref().map(|_| "<redacted>"))
            .field("paths", &self.paths)
            .finish()
    }
}
