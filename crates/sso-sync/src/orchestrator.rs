//! Outbound sync: dispatch, then merge.
//!
//! Every path through [`SyncOrchestrator::sync_user`] ends in
//! [`SyncPhase::Done`]. Peer and store failures only lower the counts in the
//! returned [`SyncReport`]; nothing is propagated to the caller.

use std::fmt;

use sso_core::{FieldValue, IdentityField, SyncTopology, SYNC_PATH};
use sso_store::UserStore;

use crate::dispatcher::{DispatchConfig, PeerDispatcher};
use crate::merger::{MergeReport, RecordMerger};
use crate::transport::PeerTransport;

/// Progress of one sync call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Dispatching,
    Merging,
    Done,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Dispatching => "dispatching",
            SyncPhase::Merging => "merging",
            SyncPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome of one sync call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncReport {
    pub peers_queried: usize,
    pub peers_answered: usize,
    pub records_received: usize,
    pub merge: MergeReport,
    pub phase: SyncPhase,
}

impl SyncReport {
    fn new(peers_queried: usize) -> Self {
        Self {
            peers_queried,
            peers_answered: 0,
            records_received: 0,
            merge: MergeReport::default(),
            phase: SyncPhase::Idle,
        }
    }

    /// True iff at least one local record was created or updated.
    pub fn synced(&self) -> bool {
        self.merge.touched() > 0
    }
}

/// Drives [`PeerDispatcher`] and [`RecordMerger`] for one user at a time.
pub struct SyncOrchestrator<S: UserStore, T: PeerTransport> {
    dispatcher: PeerDispatcher<T>,
    merger: RecordMerger<S>,
}

impl<S: UserStore, T: PeerTransport + 'static> SyncOrchestrator<S, T> {
    pub fn new(store: S, transport: T, topology: SyncTopology, config: DispatchConfig) -> Self {
        Self {
            dispatcher: PeerDispatcher::new(topology, transport, config),
            merger: RecordMerger::new(store),
        }
    }

    pub fn topology(&self) -> &SyncTopology {
        self.dispatcher.topology()
    }

    pub fn store(&self) -> &S {
        self.merger.store()
    }

    /// Pull `username` from all peers. Returns whether anything was synced.
    pub async fn sync_user_by_username(&self, username: &str, password: Option<&str>) -> bool {
        self.sync_user(IdentityField::Username, username, password)
            .await
            .synced()
    }

    /// Pull `email` from all peers. Returns whether anything was synced.
    pub async fn sync_user_by_email(&self, email: &str, password: Option<&str>) -> bool {
        self.sync_user(IdentityField::Email, email, password)
            .await
            .synced()
    }

    /// Query every peer for the user whose `identity` equals `value` and
    /// merge all answers, in topology order, into the local store.
    ///
    /// `password` is the caller's plaintext, used only to recognize legacy
    /// digests in peer answers.
    pub async fn sync_user(
        &self,
        identity: IdentityField,
        value: &str,
        password: Option<&str>,
    ) -> SyncReport {
        let mut report = SyncReport::new(self.topology().len());
        let query = identity.filter(FieldValue::from(value));

        report.phase = self.advance(report.phase, SyncPhase::Dispatching, identity);
        let responses = self.dispatcher.dispatch(SYNC_PATH, &query).await;
        report.peers_answered = responses.len();
        report.records_received = responses.iter().map(|r| r.records.len()).sum();

        if report.records_received == 0 {
            tracing::debug!(identity = %identity, "no peer returned data");
            report.phase = self.advance(report.phase, SyncPhase::Done, identity);
            return report;
        }

        report.phase = self.advance(report.phase, SyncPhase::Merging, identity);
        for response in responses {
            let merged = self
                .merger
                .merge(identity, response.records, password)
                .await;
            tracing::debug!(
                peer = %response.peer,
                created = merged.created,
                updated = merged.updated,
                skipped = merged.skipped,
                failed = merged.failed,
                "merged peer response"
            );
            report.merge.absorb(merged);
        }

        report.phase = self.advance(report.phase, SyncPhase::Done, identity);
        tracing::debug!(
            identity = %identity,
            peers = report.peers_answered,
            touched = report.merge.touched(),
            synced = report.synced(),
            "sync finished"
        );
        report
    }

    fn advance(&self, from: SyncPhase, to: SyncPhase, identity: IdentityField) -> SyncPhase {
        tracing::debug!(identity = %identity, from = %from, to = %to, "sync phase");
        to
    }
}
