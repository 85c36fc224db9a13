//! Delivery state machine for the broker.

use serde::{Deserialize, Serialize};

/// State of one delivery (one published envelope).
///
/// Transitions:
/// - Queued -> Running -> Succeeded
/// - Queued -> Running -> RetryScheduled -> Queued (handler failed, attempts left)
/// - Queued -> Running -> Queued (lease expired, attempts left)
/// - Queued -> Running -> Dead (attempts exhausted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    Queued,
    Running,
    Succeeded,
    RetryScheduled,
    Dead,
}

impl DeliveryState {
    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryState::Succeeded | DeliveryState::Dead)
    }

    /// Still owed an execution (queued, in flight, or waiting for a retry).
    pub fn is_pending(self) -> bool {
        !self.is_terminal()
    }
}
