//! Rollback workflow state machine
//!
//! `Idle -> ConfirmPending(v) -> InFlight(v) -> Idle`, with `cancel` leading
//! from `ConfirmPending` straight back to `Idle`. The machine only tracks
//! state; the controller owns the network side.

/// Where a rollback currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollbackState {
    #[default]
    Idle,
    /// The user picked a target and has not confirmed or cancelled yet
    ConfirmPending(u64),
    /// The rollback request for this target has been issued
    InFlight(u64),
}

impl RollbackState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RollbackState::Idle)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, RollbackState::InFlight(_))
    }

    /// Target awaiting confirmation; cleared as soon as the user confirms
    pub fn pending_target(&self) -> Option<u64> {
        match self {
            RollbackState::ConfirmPending(v) => Some(*v),
            _ => None,
        }
    }

    /// `Idle -> ConfirmPending(target)`, refused for the current version
    pub fn select_target(&mut self, target: u64, current_version: u64) -> bool {
        if !self.is_idle() || target == current_version {
            return false;
        }
        *self = RollbackState::ConfirmPending(target);
        true
    }

    /// `ConfirmPending -> Idle`
    pub fn cancel(&mut self) -> bool {
        if self.pending_target().is_none() {
            return false;
        }
        *self = RollbackState::Idle;
        true
    }

    /// `ConfirmPending(v) -> InFlight(v)`, returning the target to roll back to
    pub fn begin(&mut self) -> Option<u64> {
        let target = self.pending_target()?;
        *self = RollbackState::InFlight(target);
        Some(target)
    }

    /// `InFlight -> Idle`, whatever the result
    pub fn settle(&mut self) -> bool {
        if !self.is_in_flight() {
            return false;
        }
        *self = RollbackState::Idle;
        true
    }
}

/// How a confirmed rollback ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackOutcome {
    /// The server accepted the rollback; `current_version` is the max version
    /// observed after the post-rollback refresh
    Completed { target: u64, current_version: u64 },
    /// The rollback failed; `message` was written to the store's error slot
    Failed { target: u64, message: String },
}

impl RollbackOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RollbackOutcome::Completed { .. })
    }
}
