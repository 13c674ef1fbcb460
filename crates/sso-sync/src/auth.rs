//! Shared-secret authentication of inbound sync requests.

use sso_core::{PeerConfig, SyncTopology};

/// Validates presented secrets against the configured peers.
///
/// Secrets are compared by exact, case-sensitive equality, scanning peers in
/// configured order; the first match wins.
#[derive(Clone, Debug)]
pub struct SyncAuthenticator {
    topology: SyncTopology,
}

impl SyncAuthenticator {
    pub fn new(topology: SyncTopology) -> Self {
        Self { topology }
    }

    pub fn topology(&self) -> &SyncTopology {
        &self.topology
    }

    /// Whether this node has any peers at all.
    pub fn is_configured(&self) -> bool {
        !self.topology.is_empty()
    }

    /// The peer owning `presented`, if any.
    ///
    /// Empty or absent secrets never authenticate, even if a peer was
    /// misconfigured with an empty `auth`.
    pub fn authenticate(&self, presented: Option<&str>) -> Option<&PeerConfig> {
        let key = presented.filter(|k| !k.is_empty())?;
        let peer = self.topology.find_by_auth(key)?;
        tracing::debug!(peer = %peer.name, "found valid sync key");
        Some(peer)
    }

    pub fn is_valid_sync_auth(&self, presented: Option<&str>) -> bool {
        self.authenticate(presented).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> SyncAuthenticator {
        SyncAuthenticator::new(SyncTopology::new(vec![
            PeerConfig::new("alpha", "http://alpha", "Key-A"),
            PeerConfig::new("beta", "http://beta", "key-b"),
        ]))
    }

    #[test]
    fn test_valid_keys() {
        let auth = authenticator();
        assert!(auth.is_valid_sync_auth(Some("Key-A")));
        assert_eq!(auth.authenticate(Some("key-b")).unwrap().name, "beta");
    }

    #[test]
    fn test_rejects_empty_absent_and_case_mismatch() {
        let auth = authenticator();
        assert!(!auth.is_valid_sync_auth(None));
        assert!(!auth.is_valid_sync_auth(Some("")));
        assert!(!auth.is_valid_sync_auth(Some("key-a")));
        assert!(!auth.is_valid_sync_auth(Some("Key-A ")));
        assert!(!auth.is_valid_sync_auth(Some("unknown")));
    }

    #[test]
    fn test_empty_topology_rejects_everything() {
        let auth = SyncAuthenticator::new(SyncTopology::empty());
        assert!(!auth.is_configured());
        assert!(!auth.is_valid_sync_auth(Some("Key-A")));
    }
}
