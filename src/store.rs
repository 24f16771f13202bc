//! Application state store
//!
//! Process-wide state shared between the history controller and whatever UI
//! sits on top of it. The store is an explicit handle passed to its
//! consumers; every field is mutated only through its setter, and each setter
//! is one atomic replacement under the write lock.

use crate::models::User;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Snapshot of the store's fields
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    /// Cluster context injected into every query's `context` parameter
    pub current_cluster: Option<String>,
    /// Last surfaced failure message, cleared by whoever displays it
    pub current_error: Option<String>,
    /// Name of the open dialog, if any
    pub current_modal: Option<String>,
    pub current_modal_data: Option<serde_json::Value>,
    /// Authenticated principal, set once at sign-in
    pub user: Option<User>,
    pub dev_ops_mode: bool,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            current_cluster: None,
            current_error: None,
            current_modal: None,
            current_modal_data: None,
            user: None,
            dev_ops_mode: true,
        }
    }
}

/// Thread-safe handle to the application state
#[derive(Clone, Default)]
pub struct AppStore {
    inner: Arc<RwLock<StoreState>>,
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a cluster context
    pub fn with_cluster(cluster: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_current_cluster(Some(cluster.into()));
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of every field
    pub fn snapshot(&self) -> StoreState {
        self.read().clone()
    }

    pub fn current_cluster(&self) -> Option<String> {
        self.read().current_cluster.clone()
    }

    pub fn set_current_cluster(&self, cluster: Option<String>) {
        tracing::debug!("Current cluster set to {:?}", cluster);
        self.write().current_cluster = cluster;
    }

    pub fn current_error(&self) -> Option<String> {
        self.read().current_error.clone()
    }

    pub fn set_current_error(&self, error: impl Into<String>) {
        let error = error.into();
        tracing::debug!("Current error set: {}", error);
        self.write().current_error = Some(error);
    }

    pub fn clear_current_error(&self) {
        self.write().current_error = None;
    }

    /// Consume the current error, leaving the slot empty
    pub fn take_current_error(&self) -> Option<String> {
        self.write().current_error.take()
    }

    pub fn current_modal(&self) -> Option<String> {
        self.read().current_modal.clone()
    }

    pub fn current_modal_data(&self) -> Option<serde_json::Value> {
        self.read().current_modal_data.clone()
    }

    /// Open a dialog with its payload
    pub fn set_current_modal(&self, modal: impl Into<String>, data: Option<serde_json::Value>) {
        let mut state = self.write();
        state.current_modal = Some(modal.into());
        state.current_modal_data = data;
    }

    pub fn clear_current_modal(&self) {
        let mut state = self.write();
        state.current_modal = None;
        state.current_modal_data = None;
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn set_user(&self, id: u64, email: impl Into<String>) {
        self.write().user = Some(User {
            id,
            email: email.into(),
        });
    }

    pub fn dev_ops_mode(&self) -> bool {
        self.read().dev_ops_mode
    }

    pub fn set_dev_ops_mode(&self, enabled: bool) {
        self.write().dev_ops_mode = enabled;
    }

    /// Reset every field to its initial value (sign-out)
    pub fn reset(&self) {
        *self.write() = StoreState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_defaults() {
        let store = AppStore::new();
        let state = store.snapshot();
        assert_eq!(state.current_cluster, None);
        assert_eq!(state.current_error, None);
        assert!(state.dev_ops_mode);
    }

    #[test]
    fn test_clones_share_state() {
        let store = AppStore::new();
        let handle = store.clone();
        handle.set_current_cluster(Some("prod".to_string()));
        assert_eq!(store.current_cluster().as_deref(), Some("prod"));
    }

    #[test]
    fn test_take_current_error_clears_slot() {
        let store = AppStore::new();
        store.set_current_error("boom");
        assert_eq!(store.take_current_error().as_deref(), Some("boom"));
        assert_eq!(store.current_error(), None);
    }

    #[test]
    fn test_modal_setters() {
        let store = AppStore::new();
        store.set_current_modal("ClusterConfigModal", Some(serde_json::json!({"id": 1})));
        assert_eq!(store.current_modal().as_deref(), Some("ClusterConfigModal"));
        assert!(store.current_modal_data().is_some());
        store.clear_current_modal();
        assert_eq!(store.current_modal(), None);
        assert_eq!(store.current_modal_data(), None);
    }

    #[test]
    fn test_reset_on_sign_out() {
        let store = AppStore::with_cluster("prod");
        store.set_user(7, "ops@example.com");
        store.set_current_error("boom");
        store.set_dev_ops_mode(false);

        store.reset();
        assert_eq!(store.snapshot(), StoreState::default());
    }
}
