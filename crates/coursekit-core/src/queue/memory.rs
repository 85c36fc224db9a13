//! In-memory broker implementation.
//!
//! # 構造
//! - `records`: delivery id -> DeliveryRecord（未完了の delivery の正本）
//! - `ready`: すぐに実行できる delivery id
//! - `scheduled`: リトライ待ち（next_run_at の min-heap）
//! - `in_flight`: リース期限（lease_deadline の min-heap）
//! - `succeeded` / `dead`: 完了済みの件数。完了した record は `records` から取り除き、
//!   dead letter だけを `dead_letter_limit` 件まで残します。
//!
//! delivery id はブローカー内部の連番です。TaskEnvelope の task_id では重複排除しないので、
//! 同じ内容を 2 回 publish すれば 2 回実行されます。

use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, warn};

use super::{Broker, BrokerError, DeliveryRecord, DeliveryState, Lease, RetryPolicy};
use crate::observability::QueueCounts;
use crate::tasks::TaskEnvelope;

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Executions allowed per delivery before it is marked dead.
    pub max_attempts: u32,
    pub retry: RetryPolicy,
    /// How long a lease may stay unsettled before the delivery is handed out again.
    pub visibility_timeout: Duration,
    /// Dead letters kept for inspection; the oldest is dropped first.
    pub dead_letter_limit: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry: RetryPolicy::default(),
            visibility_timeout: Duration::from_secs(360),
            dead_letter_limit: 1_000,
        }
    }
}

/// A delivery that ran out of attempts.
#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub envelope: TaskEnvelope,
    pub attempts: u32,
    pub last_error: Option<String>,
}

/// Heap entry; reversed so `BinaryHeap` pops the earliest time first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timer {
    at: Instant,
    delivery: u64,
    token: u64,
}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.delivery.cmp(&self.delivery))
    }
}

struct BrokerState {
    records: HashMap<u64, DeliveryRecord>,
    ready: VecDeque<u64>,
    scheduled: BinaryHeap<Timer>,
    in_flight: BinaryHeap<Timer>,
    succeeded: usize,
    dead: usize,
    dead_letters: VecDeque<DeadLetter>,
    dead_letter_limit: usize,
    next_delivery: u64,
    closed: bool,
}

impl BrokerState {
    fn new(dead_letter_limit: usize) -> Self {
        Self {
            records: HashMap::new(),
            ready: VecDeque::new(),
            scheduled: BinaryHeap::new(),
            in_flight: BinaryHeap::new(),
            succeeded: 0,
            dead: 0,
            dead_letters: VecDeque::new(),
            dead_letter_limit,
            next_delivery: 1,
            closed: false,
        }
    }

    /// Drop a settled record, keeping its tally (and its letter if it died).
    fn retire(&mut self, delivery: u64) {
        let Some(record) = self.records.remove(&delivery) else {
            return;
        };
        match record.state {
            DeliveryState::Succeeded => self.succeeded += 1,
            DeliveryState::Dead => {
                self.dead += 1;
                self.dead_letters.push_back(DeadLetter {
                    envelope: record.envelope,
                    attempts: record.attempts,
                    last_error: record.last_error,
                });
                while self.dead_letters.len() > self.dead_letter_limit {
                    self.dead_letters.pop_front();
                }
            }
            _ => {
                self.records.insert(delivery, record);
            }
        }
    }

    /// Move due retries to the ready queue.
    fn promote_scheduled(&mut self, now: Instant) {
        while let Some(timer) = self.scheduled.peek().copied() {
            if timer.at > now {
                break;
            }
            self.scheduled.pop();
            if let Some(record) = self.records.get_mut(&timer.delivery)
                && record.state == DeliveryState::RetryScheduled
            {
                record.requeue();
                self.ready.push_back(timer.delivery);
            }
        }
    }

    /// Take back leases whose visibility timeout passed (worker crashed or hung).
    fn reclaim_expired(&mut self, now: Instant) {
        while let Some(timer) = self.in_flight.peek().copied() {
            if timer.at > now {
                break;
            }
            self.in_flight.pop();
            let Some(record) = self.records.get_mut(&timer.delivery) else {
                continue;
            };
            if !record.holds_lease(timer.token) {
                // already settled
                continue;
            }
            let envelope = &record.envelope;
            if record.attempts_exhausted() {
                error!(
                    task_id = %envelope.task_id,
                    task_type = %envelope.task_type,
                    attempts = record.attempts,
                    "lease expired on last attempt; marking dead"
                );
                record.mark_dead("lease expired".to_string());
                self.retire(timer.delivery);
            } else {
                warn!(
                    task_id = %envelope.task_id,
                    task_type = %envelope.task_type,
                    attempts = record.attempts,
                    "lease expired; redelivering"
                );
                record.requeue();
                self.ready.push_back(timer.delivery);
            }
        }
    }

    fn next_wake(&self) -> Option<Instant> {
        let retry = self.scheduled.peek().map(|t| t.at);
        let expiry = self.in_flight.peek().map(|t| t.at);
        match (retry, expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Walks unsettled records only; terminal states come from the tallies.
    fn counts(&self) -> QueueCounts {
        let mut counts = QueueCounts {
            succeeded: self.succeeded,
            dead: self.dead,
            ..QueueCounts::default()
        };
        for record in self.records.values() {
            counts.record(record.state);
        }
        counts
    }
}

/// In-memory at-least-once broker.
///
/// Cloning shares the same queue (the API side publishes, workers lease).
#[derive(Clone)]
pub struct InMemoryBroker {
    state: Arc<Mutex<BrokerState>>,
    notify: Arc<Notify>,
    config: Arc<BrokerConfig>,
}

impl InMemoryBroker {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(BrokerState::new(config.dead_letter_limit))),
            notify: Arc::new(Notify::new()),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Stop handing out leases and refuse new messages. Pending deliveries stay recorded.
    pub async fn close(&self) {
        self.state.lock().await.closed = true;
        self.notify.notify_waiters();
    }

    /// Wait until nothing is queued, running or waiting for a retry.
    /// Returns `false` if `timeout` elapsed first.
    pub async fn wait_until_settled(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.counts().await.pending() == 0 {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Retained dead letters, oldest first.
    pub async fn dead_letters(&self) -> Vec<DeadLetter> {
        let state = self.state.lock().await;
        state.dead_letters.iter().cloned().collect()
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn publish(&self, envelope: TaskEnvelope) -> Result<(), BrokerError> {
        {
            let mut state = self.state.lock().await;
            if state.closed {
                return Err(BrokerError::Closed);
            }
            let delivery = state.next_delivery;
            state.next_delivery += 1;
            debug!(
                task_id = %envelope.task_id,
                task_type = %envelope.task_type,
                delivery,
                "published"
            );
            state
                .records
                .insert(delivery, DeliveryRecord::new(envelope, self.config.max_attempts));
            state.ready.push_back(delivery);
        }
        self.notify.notify_one();
        Ok(())
    }

    async fn lease(&self) -> Option<Box<dyn Lease>> {
        loop {
            // 取り逃しを防ぐため、ロック前に通知の受け口を作っておく
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let next_wake = {
                let mut state = self.state.lock().await;
                if state.closed {
                    return None;
                }
                let now = Instant::now();
                state.promote_scheduled(now);
                state.reclaim_expired(now);

                while let Some(delivery) = state.ready.pop_front() {
                    let Some(record) = state.records.get_mut(&delivery) else {
                        continue;
                    };
                    if record.state != DeliveryState::Queued {
                        continue;
                    }
                    let deadline = now + self.config.visibility_timeout;
                    let token = record.start_attempt(deadline);
                    let lease = InMemoryLease {
                        delivery,
                        token,
                        attempt: record.attempts,
                        envelope: record.envelope.clone(),
                        state: Arc::clone(&self.state),
                        notify: Arc::clone(&self.notify),
                        retry: self.config.retry.clone(),
                    };
                    state.in_flight.push(Timer {
                        at: deadline,
                        delivery,
                        token,
                    });
                    return Some(Box::new(lease));
                }

                state.next_wake()
            };

            match next_wake {
                Some(at) => {
                    tokio::select! {
                        _ = &mut notified => {}
                        _ = tokio::time::sleep_until(at.into()) => {}
                    }
                }
                None => notified.await,
            }
        }
    }

    async fn counts(&self) -> QueueCounts {
        self.state.lock().await.counts()
    }
}

struct InMemoryLease {
    delivery: u64,
    token: u64,
    attempt: u32,
    envelope: TaskEnvelope,
    state: Arc<Mutex<BrokerState>>,
    notify: Arc<Notify>,
    retry: RetryPolicy,
}

#[async_trait]
impl Lease for InMemoryLease {
    fn envelope(&self) -> &TaskEnvelope {
        &self.envelope
    }

    fn attempt(&self) -> u32 {
        self.attempt
    }

    async fn ack(self: Box<Self>) -> Result<(), BrokerError> {
        let mut state = self.state.lock().await;
        let current = state
            .records
            .get_mut(&self.delivery)
            .filter(|record| record.holds_lease(self.token))
            .map(DeliveryRecord::mark_succeeded)
            .is_some();
        if current {
            state.retire(self.delivery);
        } else {
            warn!(
                task_id = %self.envelope.task_id,
                "ack for a lease that is no longer current; ignored"
            );
        }
        Ok(())
    }

    async fn fail(self: Box<Self>, error: String) -> Result<(), BrokerError> {
        let retry_at = {
            let mut state = self.state.lock().await;
            let Some(record) = state.records.get_mut(&self.delivery) else {
                return Ok(());
            };
            if !record.holds_lease(self.token) {
                warn!(
                    task_id = %self.envelope.task_id,
                    "fail for a lease that is no longer current; ignored"
                );
                return Ok(());
            }

            if record.attempts_exhausted() {
                error!(
                    task_id = %self.envelope.task_id,
                    task_type = %self.envelope.task_type,
                    attempts = record.attempts,
                    error = %error,
                    "attempts exhausted; marking dead"
                );
                record.mark_dead(error);
                state.retire(self.delivery);
                None
            } else {
                let delay = self.retry.next_delay(record.attempts);
                let at = Instant::now() + delay;
                warn!(
                    task_id = %self.envelope.task_id,
                    task_type = %self.envelope.task_type,
                    attempts = record.attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "scheduling retry"
                );
                record.schedule_retry(at, error);
                state.scheduled.push(Timer {
                    at,
                    delivery: self.delivery,
                    token: self.token,
                });
                Some(at)
            }
        };

        // ロック解放後に通知（待機中のワーカーが次の起床時刻を計算し直す）
        if retry_at.is_some() {
            self.notify.notify_one();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use crate::tasks::TaskType;
    use chrono::Utc;
    use serde_json::json;
    use ulid::Ulid;

    fn envelope(task_type: &str) -> TaskEnvelope {
        TaskEnvelope::new(
            TaskId::from_ulid(Ulid::new()),
            TaskType::new(task_type),
            vec![json!("arg")],
            Utc::now(),
        )
    }

    fn fast_broker(max_attempts: u32) -> InMemoryBroker {
        InMemoryBroker::new(BrokerConfig {
            max_attempts,
            retry: RetryPolicy::new(Duration::from_millis(5), 1.0),
            visibility_timeout: Duration::from_secs(30),
            dead_letter_limit: 2,
        })
    }

    async fn lease_now(broker: &InMemoryBroker) -> Box<dyn Lease> {
        tokio::time::timeout(Duration::from_millis(500), broker.lease())
            .await
            .expect("lease timed out")
            .expect("broker closed")
    }

    #[tokio::test]
    async fn publish_then_lease_transitions_to_running() {
        let broker = fast_broker(3);
        broker.publish(envelope("demo.noop.v1")).await.unwrap();
        assert_eq!(broker.counts().await.queued, 1);

        let lease = lease_now(&broker).await;
        assert_eq!(lease.envelope().task_type.as_str(), "demo.noop.v1");
        assert_eq!(lease.attempt(), 1);

        let counts = broker.counts().await;
        assert_eq!((counts.queued, counts.running), (0, 1));

        lease.ack().await.unwrap();
        assert_eq!(broker.counts().await.succeeded, 1);
    }

    #[tokio::test]
    async fn same_envelope_published_twice_is_delivered_twice() {
        let broker = fast_broker(3);
        let env = envelope("demo.noop.v1");
        broker.publish(env.clone()).await.unwrap();
        broker.publish(env.clone()).await.unwrap();

        let first = lease_now(&broker).await;
        let second = lease_now(&broker).await;
        assert_eq!(first.envelope(), &env);
        assert_eq!(second.envelope(), &env);
    }

    #[tokio::test]
    async fn failed_delivery_is_retried_then_marked_dead() {
        let broker = fast_broker(2);
        broker.publish(envelope("demo.flaky.v1")).await.unwrap();

        let lease = lease_now(&broker).await;
        lease.fail("boom".to_string()).await.unwrap();
        assert_eq!(broker.counts().await.retry_scheduled, 1);

        let retry = lease_now(&broker).await;
        assert_eq!(retry.attempt(), 2);
        retry.fail("boom again".to_string()).await.unwrap();

        let counts = broker.counts().await;
        assert_eq!(counts.dead, 1);
        assert_eq!(counts.pending(), 0);

        let dead = broker.dead_letters().await;
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].attempts, 2);
        assert_eq!(dead[0].last_error.as_deref(), Some("boom again"));
    }

    #[tokio::test]
    async fn expired_lease_is_redelivered_and_stale_ack_ignored() {
        let broker = InMemoryBroker::new(BrokerConfig {
            max_attempts: 3,
            retry: RetryPolicy::new(Duration::from_millis(5), 1.0),
            visibility_timeout: Duration::from_millis(20),
            ..BrokerConfig::default()
        });
        broker.publish(envelope("demo.slow.v1")).await.unwrap();

        let abandoned = lease_now(&broker).await;
        let redelivered = lease_now(&broker).await;
        assert_eq!(redelivered.attempt(), 2);

        // the first worker comes back late
        abandoned.ack().await.unwrap();
        assert_eq!(broker.counts().await.running, 1);

        redelivered.ack().await.unwrap();
        assert_eq!(broker.counts().await.succeeded, 1);
    }

    #[tokio::test]
    async fn closed_broker_refuses_work() {
        let broker = fast_broker(3);
        broker.publish(envelope("demo.noop.v1")).await.unwrap();
        broker.close().await;

        assert!(broker.lease().await.is_none());
        assert_eq!(
            broker.publish(envelope("demo.noop.v1")).await,
            Err(BrokerError::Closed)
        );
        assert_eq!(broker.counts().await.queued, 1);
    }

    #[tokio::test]
    async fn close_wakes_idle_leasers() {
        let broker = fast_broker(3);
        let waiting = {
            let broker = broker.clone();
            tokio::spawn(async move { broker.lease().await.is_none() })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        broker.close().await;

        let closed = tokio::time::timeout(Duration::from_millis(500), waiting)
            .await
            .unwrap()
            .unwrap();
        assert!(closed);
    }

    #[tokio::test]
    async fn settled_deliveries_leave_only_tallies_behind() {
        let broker = fast_broker(1);
        for n in 0..5 {
            broker.publish(envelope(&format!("demo.task{n}.v1"))).await.unwrap();
        }
        lease_now(&broker).await.ack().await.unwrap();
        lease_now(&broker).await.ack().await.unwrap();
        for _ in 0..3 {
            lease_now(&broker).await.fail("gone".to_string()).await.unwrap();
        }

        assert!(broker.state.lock().await.records.is_empty());
        let counts = broker.counts().await;
        assert_eq!((counts.succeeded, counts.dead, counts.pending()), (2, 3, 0));

        // only the newest letters are retained
        let dead: Vec<_> = broker
            .dead_letters()
            .await
            .into_iter()
            .map(|d| d.envelope.task_type.as_str().to_string())
            .collect();
        assert_eq!(dead, ["demo.task3.v1", "demo.task4.v1"]);
    }
}
