//! Node configuration.
//!
//! Loaded from a JSON file with camelCase keys:
//!
//! ```json
//! {
//!   "sync": [
//!     { "name": "eu", "link": "https://eu.example.com", "auth": "s3cret",
//!       "paths": ["username", "email", "password", "salt"] }
//!   ],
//!   "listen": "0.0.0.0:8080",
//!   "database": "users.db",
//!   "requestTimeoutMs": 10000
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sso_core::{PeerConfig, SyncTopology};

use crate::error::{NodeError, Result};

/// Configuration for an SSO node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeConfig {
    /// Name of the web server collaborator.
    pub webserver_module_name: String,
    /// Name of the auth collaborator.
    pub auth_module_name: String,
    /// Name of the user database collaborator.
    pub db_module_name: String,
    /// Peers, in dispatch order. Empty disables sync in both directions.
    pub sync: SyncTopology,
    /// Socket address the binary listens on.
    pub listen: String,
    /// SQLite file; `None` keeps users in memory.
    pub database: Option<PathBuf>,
    /// Per-peer timeout in milliseconds; `0` disables it.
    pub request_timeout_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            webserver_module_name: "webserver".into(),
            auth_module_name: "auth".into(),
            db_module_name: "database".into(),
            sync: SyncTopology::empty(),
            listen: "127.0.0.1:8080".into(),
            database: None,
            request_timeout_ms: 30_000,
        }
    }
}

impl NodeConfig {
    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| NodeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a config document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let mut config: NodeConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every peer and normalize links.
    ///
    /// Duplicate secrets are allowed but only the first such peer can ever
    /// authenticate, so they are reported. Peers without `paths` are
    /// reported too, since every query to them is refused.
    pub fn validate(&mut self) -> Result<()> {
        let mut peers = self.sync.peers().to_vec();
        for peer in &mut peers {
            peer.validate()?;
        }
        self.sync = SyncTopology::new(peers);

        for name in self.sync.shadowed_peers() {
            tracing::warn!(peer = %name, "peer shares its auth with an earlier peer and can never authenticate");
        }
        for name in self.sync.pathless_peers() {
            tracing::warn!(peer = %name, "peer has no paths configured; it will refuse every sync query");
        }
        Ok(())
    }

    /// Per-peer dispatch timeout.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn with_peer(mut self, peer: PeerConfig) -> Self {
        let mut peers = self.sync.peers().to_vec();
        peers.push(peer);
        self.sync = SyncTopology::new(peers);
        self
    }

    pub fn with_sync(mut self, topology: SyncTopology) -> Self {
        self.sync = topology;
        self
    }

    pub fn with_listen(mut self, listen: impl Into<String>) -> Self {
        self.listen = listen.into();
        self
    }

    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout_ms = timeout.map_or(0, |t| t.as_millis() as u64);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::from_json_str("{}").unwrap();
        assert_eq!(config.webserver_module_name, "webserver");
        assert_eq!(config.auth_module_name, "auth");
        assert_eq!(config.db_module_name, "database");
        assert!(config.sync.is_empty());
        assert_eq!(config.listen, "127.0.0.1:8080");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_parses_peers_in_order() {
        let config = NodeConfig::from_json_str(
            r#"{
                "dbModuleName": "users",
                "sync": [
                    {"name": "b", "link": "http://b.test/", "auth": "kb"},
                    {"name": "c", "link": "http://c.test", "auth": "kc", "paths": ["email"]}
                ],
                "requestTimeoutMs": 0
            }"#,
        )
        .unwrap();

        assert_eq!(config.db_module_name, "users");
        let peers = config.sync.peers();
        assert_eq!(peers[0].link, "http://b.test");
        assert_eq!(peers[1].paths, vec!["email".to_string()]);
        // Accepted, but reported: b asks for no fields.
        assert_eq!(config.sync.pathless_peers(), vec!["b"]);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_rejects_incomplete_peer() {
        let err = NodeConfig::from_json_str(r#"{"sync": [{"name": "b", "link": "http://b"}]}"#)
            .unwrap_err();
        assert!(matches!(err, NodeError::ConfigParse(_) | NodeError::Config(_)));

        let err = NodeConfig::from_json_str(r#"{"sync": [{"name": "b", "link": "", "auth": "k"}]}"#)
            .unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }

    #[test]
    fn test_builder() {
        let config = NodeConfig::default()
            .with_peer(PeerConfig::new("b", "http://b", "kb"))
            .with_listen("0.0.0.0:9000")
            .with_database("users.db")
            .with_request_timeout(Some(Duration::from_secs(5)));

        assert_eq!(config.sync.len(), 1);
        assert_eq!(config.listen, "0.0.0.0:9000");
        assert_eq!(config.database, Some(PathBuf::from("users.db")));
        assert_eq!(config.request_timeout_ms, 5_000);
    }
}
