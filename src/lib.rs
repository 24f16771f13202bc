//! chartdeck library
//!
//! Core of the chartdeck release console: a typed endpoint catalogue for the
//! release server, the revision history and rollback controller, and the
//! application store they share. It can be used both as a binary and as a
//! library for testing.

pub mod api;
pub mod cli;
pub mod config;
pub mod history;
pub mod models;
pub mod services;
pub mod store;

// Re-export commonly used types for convenience
pub use api::{ApiError, ApiRequest, ApiResponse, Endpoint, HttpTransport, Method, Transport};
pub use history::{RevisionHistoryController, RollbackOutcome, RollbackState};
pub use models::{Release, ReleaseIdentity, Revision, StorageBackend};
pub use services::{ReleaseScope, ReleaseService};
pub use store::AppStore;
