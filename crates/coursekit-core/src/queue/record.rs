//! Delivery record: one published envelope and its bookkeeping.

use std::time::Instant;

use super::DeliveryState;
use crate::tasks::TaskEnvelope;

/// Single source of truth for a delivery's state.
///
/// The ready/scheduled/in-flight structures of the broker hold delivery ids only;
/// every transition goes through this type.
#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    pub envelope: TaskEnvelope,
    pub state: DeliveryState,

    /// Executions started so far, including the one in flight.
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_error: Option<String>,

    /// Bumped on every lease; settling with an older token is ignored.
    pub lease_token: u64,
    pub lease_deadline: Option<Instant>,
    pub next_run_at: Option<Instant>,

    pub published_at: Instant,
    pub updated_at: Instant,
}

impl DeliveryRecord {
    pub fn new(envelope: TaskEnvelope, max_attempts: u32) -> Self {
        let now = Instant::now();
        Self {
            envelope,
            state: DeliveryState::Queued,
            attempts: 0,
            max_attempts,
            last_error: None,
            lease_token: 0,
            lease_deadline: None,
            next_run_at: None,
            published_at: now,
            updated_at: now,
        }
    }

    pub fn start_attempt(&mut self, deadline: Instant) -> u64 {
        self.state = DeliveryState::Running;
        self.attempts += 1;
        self.lease_token += 1;
        self.lease_deadline = Some(deadline);
        self.updated_at = Instant::now();
        self.lease_token
    }

    /// Is `token` the lease currently allowed to settle this delivery?
    pub fn holds_lease(&self, token: u64) -> bool {
        self.state == DeliveryState::Running && self.lease_token == token
    }

    pub fn attempts_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    pub fn mark_succeeded(&mut self) {
        self.state = DeliveryState::Succeeded;
        self.lease_deadline = None;
        self.updated_at = Instant::now();
    }

    pub fn mark_dead(&mut self, error: String) {
        self.state = DeliveryState::Dead;
        self.last_error = Some(error);
        self.lease_deadline = None;
        self.updated_at = Instant::now();
    }

    pub fn schedule_retry(&mut self, next_run_at: Instant, error: String) {
        self.state = DeliveryState::RetryScheduled;
        self.next_run_at = Some(next_run_at);
        self.last_error = Some(error);
        self.lease_deadline = None;
        self.updated_at = Instant::now();
    }

    /// Back to the ready queue (retry due, or lease expired).
    pub fn requeue(&mut self) {
        self.state = DeliveryState::Queued;
        self.next_run_at = None;
        self.lease_deadline = None;
        self.updated_at = Instant::now();
    }
}
