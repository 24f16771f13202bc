//! Service layer for release-server calls
//!
//! This module provides the typed endpoint catalogue consumed by the history
//! controller and the CLI. Calls return `Result`s; nothing here holds state.

pub mod release_service;

pub use release_service::{
    LATEST_REVISION, ListReleasesQuery, NamespacesQuery, ReleasePath, ReleaseScope, ReleaseService,
    RevisionPath, RollbackQuery, USER_CONTEXTS, UpgradeValuesQuery, UserPath,
};
