//! Peer descriptors and the sync topology.
//!
//! The topology is static configuration: loaded once, never mutated, and
//! shared read-only by the authenticator (inbound) and the dispatcher
//! (outbound).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// One configured remote node.
///
/// The same entry serves both directions: its `auth` is the secret this node
/// presents to the peer and also accepts from it. The whole entry is sent as
/// the `sync` member of outbound requests, so `paths` tells the peer which
/// fields to disclose.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerConfig {
    /// Identifier used in logs.
    pub name: String,
    /// Base URL, without trailing slash.
    pub link: String,
    /// Shared secret.
    pub auth: String,
    /// Fields requested from this peer, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
}

impl PeerConfig {
    pub fn new(name: impl Into<String>, link: impl Into<String>, auth: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into().trim_end_matches('/').to_owned(),
            auth: auth.into(),
            paths: Vec::new(),
        }
    }

    /// Set the requested field paths.
    pub fn with_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Full URL for a route on this peer.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.link.trim_end_matches('/'), path)
    }

    /// Check required members and normalize the link.
    pub fn validate(&mut self) -> Result<()> {
        let missing = if self.name.trim().is_empty() {
            Some("name")
        } else if self.link.trim().is_empty() {
            Some("link")
        } else if self.auth.is_empty() {
            Some("auth")
        } else {
            None
        };

        if let Some(member) = missing {
            return Err(CoreError::InvalidPeer {
                name: self.name.clone(),
                reason: format!("missing {}", member),
            });
        }

        self.link = self.link.trim_end_matches('/').to_owned();
        Ok(())
    }
}

// The shared secret never reaches logs.
impl fmt::Debug for PeerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerConfig")
            .field("name", &self.name)
            .field("link", &self.link)
            .field("auth", &"<redacted>")
            .field("paths", &self.paths)
            .finish()
    }
}

/// Ordered list of peers this node queries and accepts queries from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncTopology {
    peers: Vec<PeerConfig>,
}

impl SyncTopology {
    pub fn new(peers: Vec<PeerConfig>) -> Self {
        Self { peers }
    }

    /// A topology with no peers: inbound and outbound sync are disabled.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn peers(&self) -> &[PeerConfig] {
        &self.peers
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeerConfig> {
        self.peers.iter()
    }

    /// First peer (in configured order) whose secret equals `auth` exactly.
    pub fn find_by_auth(&self, auth: &str) -> Option<&PeerConfig> {
        self.peers.iter().find(|peer| peer.auth == auth)
    }

    /// Names of peers whose secret is already used by an earlier peer.
    ///
    /// Such peers can never be identified on the inbound path.
    pub fn shadowed_peers(&self) -> Vec<&str> {
        self.peers
            .iter()
            .enumerate()
            .filter(|(i, peer)| self.peers[..*i].iter().any(|p| p.auth == peer.auth))
            .map(|(_, peer)| peer.name.as_str())
            .collect()
    }

    /// Names of peers that request no fields.
    ///
    /// Such peers answer every outbound query with 400.
    pub fn pathless_peers(&self) -> Vec<&str> {
        self.peers
            .iter()
            .filter(|peer| peer.paths.is_empty())
            .map(|peer| peer.name.as_str())
            .collect()
    }
}

impl From<Vec<PeerConfig>> for SyncTopology {
    fn from(peers: Vec<PeerConfig>) -> Self {
        Self::new(peers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology() -> SyncTopology {
        SyncTopology::new(vec![
            PeerConfig::new("alpha", "http://alpha.local/", "key-a"),
            PeerConfig::new("beta", "http://beta.local", "key-b"),
            PeerConfig::new("gamma", "http://gamma.local", "key-a"),
        ])
    }

    #[test]
    fn test_find_by_auth_first_match_wins() {
        let topo = topology();
        assert_eq!(topo.find_by_auth("key-a").unwrap().name, "alpha");
        assert_eq!(topo.find_by_auth("key-b").unwrap().name, "beta");
        assert!(topo.find_by_auth("KEY-A").is_none());
        assert!(topo.find_by_auth("").is_none());
    }

    #[test]
    fn test_shadowed_peers() {
        assert_eq!(topology().shadowed_peers(), vec!["gamma"]);
    }

    #[test]
    fn test_pathless_peers() {
        let mut peers = topology().peers().to_vec();
        peers[1] = peers[1].clone().with_paths(["username"]);
        let topo = SyncTopology::new(peers);
        assert_eq!(topo.pathless_peers(), vec!["alpha", "gamma"]);
    }

    #[test]
    fn test_endpoint_trims_link() {
        let peer = PeerConfig::new("alpha", "http://alpha.local/", "k");
        assert_eq!(peer.link, "http://alpha.local");
        assert_eq!(peer.endpoint("/sso/sync"), "http://alpha.local/sso/sync");
    }

    #[test]
    fn test_validate_rejects_missing_auth() {
        let mut peer = PeerConfig::new("alpha", "http://alpha.local", "");
        let err = peer.validate().unwrap_err();
        assert!(err.to_string().contains("missing auth"));
    }

    #[test]
    fn test_debug_redacts_auth() {
        let peer = PeerConfig::new("alpha", "http://alpha.local", "s3cret");
        let debug = format!("{:?}", peer);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("alpha"));
    }

    #[test]
    fn test_topology_json() {
        let topo: SyncTopology = serde_json::from_str(
            r#"[{"name":"alpha","link":"http://a","auth":"k","paths":["username","email"]}]"#,
        )
        .unwrap();
        assert_eq!(topo.len(), 1);
        assert_eq!(topo.peers()[0].paths, vec!["username", "email"]);
    }
}
