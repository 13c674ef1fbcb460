//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sso_core::{legacy_hash, FieldMap, FieldValue, Filter, PeerConfig, SyncTopology, UserRecord};
use sso_store::{MemoryUserStore, SaveOptions, SaveResult, StoreError, UserStore};
use sso_sync::{
    DispatchConfig, MemoryNetwork, MemoryTransport, SyncOrchestrator, SyncResponder,
};

/// Fields every test peer asks for.
pub const DEFAULT_PATHS: [&str; 4] = ["username", "email", "password", "salt"];

/// A field bag with `username` and `email`.
pub fn user(username: &str, email: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("username".into(), username.into());
    fields.insert("email".into(), email.into());
    fields
}

/// A field bag whose password is stored under the legacy digest.
pub fn legacy_user(username: &str, email: &str, password: &str, salt: &str) -> FieldMap {
    let mut fields = user(username, email);
    fields.insert("password".into(), legacy_hash(password, salt).into());
    fields.insert("salt".into(), salt.into());
    fields
}

/// Build a field bag from string pairs.
pub fn fields(pairs: &[(&str, &str)]) -> FieldMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), FieldValue::from(*v)))
        .collect()
}

/// Wraps a store and counts calls into it.
///
/// Saves can be made to fail on demand to exercise merge error handling.
pub struct CountingStore<S> {
    inner: S,
    finds: AtomicUsize,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl<S: UserStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            finds: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Number of `find`/`find_one` calls so far.
    pub fn finds(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    /// Number of `save` calls so far, failed ones included.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: UserStore> UserStore for CountingStore<S> {
    async fn find(&self, filter: &Filter) -> sso_store::Result<Vec<UserRecord>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find(filter).await
    }

    async fn save(
        &self,
        record: &mut UserRecord,
        options: SaveOptions,
    ) -> sso_store::Result<SaveResult> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Task("injected save failure".into()));
        }
        self.inner.save(record, options).await
    }

    async fn count(&self) -> sso_store::Result<usize> {
        self.inner.count().await
    }
}

/// Store type used by [`TestNode`].
pub type TestStore = Arc<CountingStore<MemoryUserStore>>;

/// Secret shared by the pair `a`/`b`, independent of direction.
pub fn pair_secret(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}<->{}", a, b)
    } else {
        format!("{}<->{}", b, a)
    }
}

/// Link under which a named node is served on a [`MemoryNetwork`].
pub fn link_for(name: &str) -> String {
    format!("mem://{}", name)
}

/// One node wired into a [`MemoryNetwork`].
pub struct TestNode {
    pub name: String,
    pub store: TestStore,
    pub orchestrator: SyncOrchestrator<TestStore, MemoryTransport>,
    pub responder: Arc<SyncResponder<TestStore>>,
}

impl TestNode {
    pub fn link(&self) -> String {
        link_for(&self.name)
    }

    /// Seed the local store, bypassing validation.
    pub async fn seed(&self, fields: FieldMap) {
        let mut record = UserRecord::from_fields(fields);
        if let Err(e) = self.store.save(&mut record, SaveOptions::unvalidated()).await {
            panic!("seeding {} failed: {}", self.name, e);
        }
    }

    /// Local record for `username`, if any.
    pub async fn user(&self, username: &str) -> Option<FieldMap> {
        self.store
            .inner()
            .find_one(&Filter::by("username", username))
            .await
            .ok()
            .flatten()
            .map(|r| r.fields)
    }

    pub async fn user_count(&self) -> usize {
        self.store.count().await.unwrap_or(0)
    }
}

/// A fully connected set of nodes on one in-memory network.
pub struct TestMesh {
    pub network: Arc<MemoryNetwork>,
    pub nodes: Vec<TestNode>,
}

impl TestMesh {
    /// Connect every named node to every other one, in the given order.
    pub async fn new(names: &[&str]) -> Self {
        Self::with_config(names, DispatchConfig::default()).await
    }

    pub async fn with_config(names: &[&str], config: DispatchConfig) -> Self {
        let network = MemoryNetwork::new();
        let mut nodes = Vec::with_capacity(names.len());

        for name in names {
            let peers = names
                .iter()
                .filter(|other| *other != name)
                .map(|other| {
                    PeerConfig::new(*other, link_for(other), pair_secret(name, other))
                        .with_paths(DEFAULT_PATHS)
                })
                .collect();
            let topology = SyncTopology::new(peers);

            let store: TestStore = Arc::new(CountingStore::new(MemoryUserStore::new()));
            let responder = Arc::new(SyncResponder::new(Arc::clone(&store), topology.clone()));
            network.register(link_for(name), responder.clone()).await;

            let orchestrator = SyncOrchestrator::new(
                Arc::clone(&store),
                network.transport(),
                topology,
                config.clone(),
            );

            nodes.push(TestNode {
                name: name.to_string(),
                store,
                orchestrator,
                responder,
            });
        }

        Self { network, nodes }
    }

    /// Node by name.
    pub fn node(&self, name: &str) -> &TestNode {
        match self.nodes.iter().find(|n| n.name == name) {
            Some(node) => node,
            None => panic!("no node named {}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_secret_is_symmetric() {
        assert_eq!(pair_secret("a", "b"), pair_secret("b", "a"));
        assert_ne!(pair_secret("a", "b"), pair_secret("a", "c"));
    }

    #[tokio::test]
    async fn test_mesh_topologies() {
        let mesh = TestMesh::new(&["a", "b", "c"]).await;
        let a = mesh.node("a");

        let names: Vec<_> = a.orchestrator.topology().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert!(a.responder.authenticator().is_valid_sync_auth(Some(pair_secret("a", "b").as_str())));
        assert!(!a.responder.authenticator().is_valid_sync_auth(Some(pair_secret("b", "c").as_str())));
    }

    #[tokio::test]
    async fn test_counting_store() {
        let store = CountingStore::new(MemoryUserStore::new());
        let mut record = UserRecord::from_fields(user("alice", "a@example.com"));
        store.save(&mut record, SaveOptions::default()).await.unwrap();
        store.find_one(&Filter::new()).await.unwrap();

        assert_eq!(store.saves(), 1);
        assert_eq!(store.finds(), 1);

        store.fail_saves(true);
        assert!(store.save(&mut record, SaveOptions::default()).await.is_err());
        assert_eq!(store.saves(), 2);
    }
}
