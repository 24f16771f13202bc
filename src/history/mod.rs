//! Revision history and rollback workflow for a single release

pub mod controller;
pub mod rollback;

pub use controller::{
    HistoryRequest, HistoryResponse, RevisionHistoryController, RevisionRow, RollbackRequest,
    RollbackResponse, sort_revisions,
};
pub use rollback::{RollbackOutcome, RollbackState};
