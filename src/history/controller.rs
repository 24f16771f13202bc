//! Revision history controller
//!
//! Holds, for one release, the ordered revision history, the highest version
//! seen ("current"), the revision being previewed, and the rollback workflow.
//!
//! Network work uses a trigger/apply split: `trigger_*` methods update local
//! state and hand back an owned request that can be awaited or spawned;
//! `apply_*`/`complete_*` fold the result back in. History responses carry a
//! generation number and only the most recently issued one is applied.

use super::rollback::{RollbackOutcome, RollbackState};
use crate::api::ApiError;
use crate::models::{
    Release, ReleaseIdentity, ReleaseStatus, Revision, StorageBackend, readable_date,
};
use crate::services::{LATEST_REVISION, ReleaseScope, ReleaseService};
use crate::store::AppStore;

/// Pending revision-history fetch
pub struct HistoryRequest {
    generation: u64,
    identity: ReleaseIdentity,
    scope: ReleaseScope,
    service: ReleaseService,
}

impl HistoryRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn identity(&self) -> &ReleaseIdentity {
        &self.identity
    }

    /// Issue the history call
    pub async fn execute(self) -> HistoryResponse {
        let result = self
            .service
            .list_revision_history(&self.scope, &self.identity.name)
            .await;
        HistoryResponse {
            generation: self.generation,
            identity: self.identity,
            result,
        }
    }
}

/// Result of a [`HistoryRequest`]
#[derive(Debug)]
pub struct HistoryResponse {
    pub generation: u64,
    pub identity: ReleaseIdentity,
    pub result: Result<Vec<Revision>, ApiError>,
}

/// Confirmed rollback, ready to be issued
pub struct RollbackRequest {
    target: u64,
    identity: ReleaseIdentity,
    scope: ReleaseScope,
    history_generation: u64,
    service: ReleaseService,
}

impl RollbackRequest {
    pub fn target(&self) -> u64 {
        self.target
    }

    /// Issue the rollback, then refresh the release and its history concurrently
    pub async fn execute(self) -> RollbackResponse {
        let name = self.identity.name.as_str();
        let result = self.service.rollback(&self.scope, name, self.target).await;

        if result.is_err() {
            return RollbackResponse {
                target: self.target,
                identity: self.identity,
                history_generation: self.history_generation,
                result,
                release: None,
                history: None,
            };
        }

        let (release, history) = futures::join!(
            self.service.get_release(&self.scope, name, LATEST_REVISION),
            self.service.list_revision_history(&self.scope, name)
        );

        RollbackResponse {
            target: self.target,
            history_generation: self.history_generation,
            result,
            release: Some(release),
            history: Some(HistoryResponse {
                generation: self.history_generation,
                identity: self.identity.clone(),
                result: history,
            }),
            identity: self.identity,
        }
    }
}

/// Result of a [`RollbackRequest`], including the post-rollback refreshes
#[derive(Debug)]
pub struct RollbackResponse {
    pub target: u64,
    pub identity: ReleaseIdentity,
    /// History generation reserved by `confirm()`
    pub history_generation: u64,
    pub result: Result<(), ApiError>,
    /// Refreshed release; `None` when the rollback itself failed
    pub release: Option<Result<Release, ApiError>>,
    /// Refreshed history; `None` when the rollback itself failed
    pub history: Option<HistoryResponse>,
}

/// One line of the revision table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRow {
    pub version: u64,
    pub last_deployed: String,
    pub status: ReleaseStatus,
    /// This is the deployed (max) version; it cannot be a rollback target
    pub is_current: bool,
    /// This revision is the one being previewed
    pub is_previewed: bool,
}

impl RevisionRow {
    /// Label of the row's rollback action
    pub fn action_label(&self) -> &'static str {
        if self.is_current { "Current" } else { "Revert" }
    }
}

/// Controller for one release's revision history and rollbacks
pub struct RevisionHistoryController {
    service: ReleaseService,
    store: AppStore,
    storage: StorageBackend,
    release: Release,
    identity: ReleaseIdentity,
    revisions: Vec<Revision>,
    max_version: u64,
    preview: Option<Revision>,
    rollback: RollbackState,
    history_generation: u64,
    history_pending: bool,
}

impl RevisionHistoryController {
    /// Controller for `release`, scoped by the store's current cluster.
    ///
    /// History is not fetched until [`load_history`](Self::load_history) or
    /// [`trigger_history_load`](Self::trigger_history_load) is called.
    pub fn new(
        service: ReleaseService,
        store: AppStore,
        storage: StorageBackend,
        release: Release,
    ) -> Self {
        let identity = release.identity(store.current_cluster().as_deref());
        Self {
            service,
            store,
            storage,
            release,
            identity,
            revisions: Vec::new(),
            max_version: 0,
            preview: None,
            rollback: RollbackState::Idle,
            history_generation: 0,
            history_pending: false,
        }
    }

    pub fn release(&self) -> &Release {
        &self.release
    }

    pub fn identity(&self) -> &ReleaseIdentity {
        &self.identity
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    /// Revisions sorted by version, newest first
    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    /// Highest version in the loaded history; 0 when nothing is loaded
    pub fn max_version(&self) -> u64 {
        self.max_version
    }

    pub fn rollback_state(&self) -> RollbackState {
        self.rollback
    }

    pub fn pending_rollback_target(&self) -> Option<u64> {
        self.rollback.pending_target()
    }

    /// A rollback and its refreshes are in progress
    pub fn is_loading(&self) -> bool {
        self.rollback.is_in_flight()
    }

    pub fn is_history_loading(&self) -> bool {
        self.history_pending
    }

    fn scope(&self) -> ReleaseScope {
        ReleaseScope::new(
            self.identity.namespace.clone(),
            self.identity.context.clone(),
            self.storage,
        )
    }

    fn next_history_generation(&mut self) -> u64 {
        self.history_generation += 1;
        self.history_pending = true;
        self.history_generation
    }

    /// Start a history fetch; any earlier fetch still in flight becomes stale
    pub fn trigger_history_load(&mut self) -> HistoryRequest {
        let generation = self.next_history_generation();
        tracing::debug!(
            "Loading revision history for {} (generation {})",
            self.identity,
            generation
        );
        HistoryRequest {
            generation,
            identity: self.identity.clone(),
            scope: self.scope(),
            service: self.service.clone(),
        }
    }

    /// Fold a history response in. Returns whether it changed the history.
    ///
    /// Stale responses are ignored. Failures are logged and leave any
    /// previously loaded history untouched.
    pub fn apply_history(&mut self, response: HistoryResponse) -> bool {
        if response.generation != self.history_generation || response.identity != self.identity {
            tracing::debug!(
                "Ignoring stale history for {} (generation {}, latest {})",
                response.identity,
                response.generation,
                self.history_generation
            );
            return false;
        }
        self.history_pending = false;

        match response.result {
            Ok(mut revisions) => {
                sort_revisions(&mut revisions);
                self.max_version = revisions.first().map(|r| r.version).unwrap_or(0);
                self.revisions = revisions;
                tracing::debug!(
                    "Loaded {} revisions for {} (current version {})",
                    self.revisions.len(),
                    self.identity,
                    self.max_version
                );
                true
            }
            Err(e) => {
                tracing::warn!("Failed to load revision history for {}: {}", self.identity, e);
                false
            }
        }
    }

    /// Fetch and apply the revision history
    pub async fn load_history(&mut self) -> bool {
        let request = self.trigger_history_load();
        let response = request.execute().await;
        self.apply_history(response)
    }

    /// Point the controller at a (possibly different) release.
    ///
    /// When the identity `(name, namespace, context)` changes, state for the
    /// old release is discarded and a history fetch is returned. Otherwise the
    /// release data is refreshed in place and nothing is fetched.
    pub fn view_release(&mut self, release: Release) -> Option<HistoryRequest> {
        let identity = release.identity(self.store.current_cluster().as_deref());
        self.release = release;

        if identity == self.identity {
            return None;
        }

        tracing::debug!("Release changed from {} to {}", self.identity, identity);
        self.identity = identity;
        self.revisions.clear();
        self.max_version = 0;
        self.preview = None;
        self.rollback = RollbackState::Idle;
        Some(self.trigger_history_load())
    }

    /// Re-check the identity against the store's current cluster
    pub fn sync_context(&mut self) -> Option<HistoryRequest> {
        self.view_release(self.release.clone())
    }

    /// Show a historical revision without deploying it
    pub fn select_preview(&mut self, revision: Revision) {
        self.preview = Some(revision);
    }

    pub fn clear_preview(&mut self) {
        self.preview = None;
    }

    /// Revision being shown: the preview if any, otherwise the release itself
    pub fn previewed(&self) -> &Release {
        self.preview.as_ref().unwrap_or(&self.release)
    }

    pub fn is_current(&self, revision: &Revision) -> bool {
        revision.version == self.max_version
    }

    /// Whether the shown revision is the deployed one (true before any load)
    pub fn is_previewing_current(&self) -> bool {
        self.max_version == 0 || self.previewed().version == self.max_version
    }

    /// Heading for the revision section
    pub fn header_label(&self) -> String {
        let prefix = if self.is_previewing_current() {
            "Current Revision"
        } else {
            "Previewing Revision (Not Deployed)"
        };
        format!("{} - No. {}", prefix, self.previewed().version)
    }

    pub fn revision_rows(&self) -> Vec<RevisionRow> {
        let previewed = self.previewed().version;
        self.revisions
            .iter()
            .map(|r| RevisionRow {
                version: r.version,
                last_deployed: readable_date(&r.info.last_deployed),
                status: r.info.status.clone(),
                is_current: self.is_current(r),
                is_previewed: r.version == previewed,
            })
            .collect()
    }

    /// Offer `version` as a rollback target.
    ///
    /// Refused (returning `false`, no error) when a rollback is already
    /// pending or running, when `version` is the current version, or when it
    /// is not in the loaded history.
    pub fn select_target(&mut self, version: u64) -> bool {
        let known = self.revisions.iter().any(|r| r.version == version);
        if !known || version > self.max_version {
            tracing::debug!("Revision {} is not a rollback target for {}", version, self.identity);
            return false;
        }
        self.rollback.select_target(version, self.max_version)
    }

    /// Drop the pending target without any network call
    pub fn cancel(&mut self) -> bool {
        self.rollback.cancel()
    }

    /// Confirm the pending target and hand back the rollback request.
    ///
    /// The pending target is cleared immediately; the controller is
    /// [`is_loading`](Self::is_loading) until the response is completed.
    pub fn confirm(&mut self) -> Option<RollbackRequest> {
        let target = self.rollback.begin()?;
        let history_generation = self.next_history_generation();
        tracing::debug!("Rolling back {} to revision {}", self.identity, target);

        Some(RollbackRequest {
            target,
            identity: self.identity.clone(),
            scope: self.scope(),
            history_generation,
            service: self.service.clone(),
        })
    }

    /// Fold a rollback response in and return to `Idle`.
    ///
    /// Failures are written to the store's error slot verbatim and are not
    /// retried.
    pub fn complete_rollback(&mut self, response: RollbackResponse) -> RollbackOutcome {
        let same_release = response.identity == self.identity;
        if same_release && self.rollback == RollbackState::InFlight(response.target) {
            self.rollback.settle();
        }

        if let Err(e) = response.result {
            let message = e.user_message();
            tracing::warn!(
                "Rollback of {} to revision {} failed: {}",
                response.identity,
                response.target,
                e
            );
            self.store.set_current_error(message.clone());
            if same_release && response.history_generation == self.history_generation {
                self.history_pending = false;
            }
            return RollbackOutcome::Failed {
                target: response.target,
                message,
            };
        }

        tracing::info!(
            "Rolled back {} to revision {}",
            response.identity,
            response.target
        );

        if same_release {
            match response.release {
                Some(Ok(release)) => {
                    self.release = release;
                    self.preview = None;
                }
                Some(Err(e)) => {
                    tracing::warn!("Failed to refresh {} after rollback: {}", response.identity, e);
                }
                None => {}
            }
        }

        if let Some(history) = response.history {
            self.apply_history(history);
        }

        RollbackOutcome::Completed {
            target: response.target,
            current_version: self.max_version,
        }
    }

    /// Confirm, issue and complete the pending rollback
    pub async fn confirm_and_wait(&mut self) -> Option<RollbackOutcome> {
        let request = self.confirm()?;
        let response = request.execute().await;
        Some(self.complete_rollback(response))
    }
}

/// Sort by version, newest first; equal versions keep their input order
pub fn sort_revisions(revisions: &mut [Revision]) {
    revisions.sort_by(|a, b| b.version.cmp(&a.version));
}
