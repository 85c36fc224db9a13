//! Queue status snapshot.

use serde::{Deserialize, Serialize};

use crate::queue::DeliveryState;

/// Number of deliveries per state, as reported by `Broker::counts`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    pub queued: usize,
    pub running: usize,
    pub succeeded: usize,
    pub retry_scheduled: usize,
    pub dead: usize,
}

impl QueueCounts {
    pub fn record(&mut self, state: DeliveryState) {
        match state {
            DeliveryState::Queued => self.queued += 1,
            DeliveryState::Running => self.running += 1,
            DeliveryState::Succeeded => self.succeeded += 1,
            DeliveryState::RetryScheduled => self.retry_scheduled += 1,
            DeliveryState::Dead => self.dead += 1,
        }
    }

    /// Deliveries that still owe an execution.
    pub fn pending(&self) -> usize {
        self.queued + self.running + self.retry_scheduled
    }

    pub fn total(&self) -> usize {
        self.pending() + self.succeeded + self.dead
    }
}
