//! Queue module: the broker port, delivery state, retry logic and the in-memory broker.
//!
//! Delivery is at-least-once. A handler may see the same envelope more than once
//! (retry after a failure, redelivery after an expired lease) and tasks carry
//! no ordering guarantee between each other.

mod memory;
mod record;
mod retry;
mod state;

pub use memory::{BrokerConfig, DeadLetter, InMemoryBroker};
pub use record::DeliveryRecord;
pub use retry::RetryPolicy;
pub use state::DeliveryState;

use async_trait::async_trait;

use crate::observability::QueueCounts;
use crate::tasks::TaskEnvelope;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    #[error("broker unavailable: {0}")]
    Unavailable(String),

    #[error("broker is closed")]
    Closed,
}

/// A claimed delivery. The worker owns it and must either `ack` or `fail` it.
///
/// Dropping a lease without settling it leaves the delivery in flight until the
/// broker's visibility timeout hands it to another worker.
#[async_trait]
pub trait Lease: Send {
    fn envelope(&self) -> &TaskEnvelope;

    /// 1 for the first execution of this delivery.
    fn attempt(&self) -> u32;

    async fn ack(self: Box<Self>) -> Result<(), BrokerError>;

    /// Report a failed execution; the broker decides between retry and dead.
    async fn fail(self: Box<Self>, error: String) -> Result<(), BrokerError>;
}

/// Message broker port.
///
/// `publish` returning `Ok` is the only acknowledgement a producer gets.
#[async_trait]
pub trait Broker: Send + Sync {
    async fn publish(&self, envelope: TaskEnvelope) -> Result<(), BrokerError>;

    /// Wait for the next ready delivery. `None` once the broker is closed.
    async fn lease(&self) -> Option<Box<dyn Lease>>;

    async fn counts(&self) -> QueueCounts;
}
