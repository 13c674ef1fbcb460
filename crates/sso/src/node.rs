//! The SSO node: one store, one transport, one topology.

use std::sync::Arc;

use sso_core::{IdentityField, SyncTopology, SYNC_PATH};
use sso_store::{MemoryUserStore, SqliteUserStore, UserStore};
use sso_sync::{
    DispatchConfig, HttpTransport, InboundHandler, PeerTransport, SyncOrchestrator, SyncReport,
    SyncResponder,
};

use crate::config::NodeConfig;
use crate::error::Result;
use crate::routes::{AxumRegistrar, RouteMethod, RouteRegistrar};

/// Store handle shared by the responder and the orchestrator.
pub type SharedStore = Arc<dyn UserStore>;

/// Transport handle used for outbound dispatch.
pub type SharedTransport = Arc<dyn PeerTransport>;

/// A configured node.
///
/// Collaborators are injected at construction; the node looks nothing up
/// by name. The module names from [`NodeConfig`] only label log output.
pub struct SsoNode {
    config: NodeConfig,
    store: SharedStore,
    orchestrator: SyncOrchestrator<SharedStore, SharedTransport>,
    responder: Arc<SyncResponder<SharedStore>>,
}

impl SsoNode {
    /// Create a node over the given store and transport.
    pub fn new(
        config: NodeConfig,
        store: impl UserStore + 'static,
        transport: impl PeerTransport + 'static,
    ) -> Self {
        Self::from_shared(config, Arc::new(store), Arc::new(transport))
    }

    /// Create a node that reaches its peers over HTTP.
    pub fn with_http(config: NodeConfig, store: SharedStore) -> Result<Self> {
        let transport = HttpTransport::new(config.request_timeout())?;
        Ok(Self::from_shared(config, store, Arc::new(transport)))
    }

    pub fn from_shared(config: NodeConfig, store: SharedStore, transport: SharedTransport) -> Self {
        tracing::debug!(
            webserver = %config.webserver_module_name,
            auth = %config.auth_module_name,
            db = %config.db_module_name,
            peers = config.sync.len(),
            "initializing sso node"
        );

        let dispatch = match config.request_timeout() {
            Some(timeout) => DispatchConfig::default().with_timeout(timeout),
            None => DispatchConfig::default().without_timeout(),
        };
        let orchestrator = SyncOrchestrator::new(
            Arc::clone(&store),
            transport,
            config.sync.clone(),
            dispatch,
        );
        let responder = Arc::new(SyncResponder::new(Arc::clone(&store), config.sync.clone()));

        Self {
            config,
            store,
            orchestrator,
            responder,
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn topology(&self) -> &SyncTopology {
        &self.config.sync
    }

    /// Handler for inbound `POST /sso/sync` bodies.
    pub fn sync_handler(&self) -> Arc<dyn InboundHandler> {
        self.responder.clone()
    }

    /// Whether `auth` belongs to one of the configured peers.
    pub fn is_valid_sync_auth(&self, auth: Option<&str>) -> bool {
        self.responder.authenticator().is_valid_sync_auth(auth)
    }

    /// Mount the sync route on `registrar`.
    pub fn init(&self, registrar: &mut dyn RouteRegistrar) {
        tracing::debug!(
            webserver = %self.config.webserver_module_name,
            path = SYNC_PATH,
            "registering sync route"
        );
        registrar.add_route(RouteMethod::Post, SYNC_PATH, self.sync_handler());
    }

    /// Pull a user by username from every peer.
    pub async fn sync_user_by_username(&self, username: &str, password: Option<&str>) -> bool {
        tracing::debug!(username = %username, "syncing user");
        self.orchestrator
            .sync_user_by_username(username, password)
            .await
    }

    /// Pull a user by email from every peer.
    pub async fn sync_user_by_email(&self, email: &str, password: Option<&str>) -> bool {
        tracing::debug!(email = %email, "syncing user");
        self.orchestrator.sync_user_by_email(email, password).await
    }

    /// Pull a user and report the full outcome.
    pub async fn sync_user(
        &self,
        identity: IdentityField,
        value: &str,
        password: Option<&str>,
    ) -> SyncReport {
        self.orchestrator.sync_user(identity, value, password).await
    }
}

/// Open the store named by `config.database`, or an in-memory one.
pub fn open_store(config: &NodeConfig) -> Result<SharedStore> {
    match &config.database {
        Some(path) => {
            tracing::info!(db = %config.db_module_name, path = %path.display(), "opening user store");
            Ok(Arc::new(SqliteUserStore::open(path)?))
        }
        None => {
            tracing::warn!(db = %config.db_module_name, "no database configured, users are kept in memory");
            Ok(Arc::new(MemoryUserStore::new()))
        }
    }
}

/// Router serving `node`'s sync route.
pub fn build_router(node: &SsoNode) -> axum::Router {
    let mut registrar = AxumRegistrar::new();
    node.init(&mut registrar);
    registrar.into_router()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sso_core::PeerConfig;
    use sso_store::MemoryUserStore;
    use sso_sync::MemoryNetwork;

    fn node(peers: Vec<PeerConfig>) -> SsoNode {
        let config = NodeConfig::default().with_sync(SyncTopology::new(peers));
        SsoNode::new(config, MemoryUserStore::new(), MemoryNetwork::new().transport())
    }

    #[test]
    fn test_init_registers_one_post_route() {
        let node = node(vec![PeerConfig::new("b", "http://b", "kb")]);
        let mut registrar = AxumRegistrar::new();
        node.init(&mut registrar);

        assert_eq!(registrar.routes(), &[(RouteMethod::Post, SYNC_PATH.to_string())]);
    }

    #[test]
    fn test_sync_auth() {
        let node = node(vec![PeerConfig::new("b", "http://b", "kb")]);
        assert!(node.is_valid_sync_auth(Some("kb")));
        assert!(!node.is_valid_sync_auth(Some("kc")));
        assert!(!node.is_valid_sync_auth(None));
    }

    #[test]
    fn test_open_store_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = NodeConfig::default().with_database(dir.path().join("users.db"));
        assert!(open_store(&config).is_ok());
        assert!(dir.path().join("users.db").exists());
    }

    #[tokio::test]
    async fn test_unconfigured_node_never_syncs() {
        let node = node(vec![]);
        assert!(!node.sync_user_by_username("alice", Some("pw")).await);
        assert!(!node.sync_user_by_email("alice@example.com", None).await);
    }
}
