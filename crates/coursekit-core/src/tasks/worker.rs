use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::runtime::Runtime;
use crate::queue::Broker;

/// Worker group handle.
/// - `n` 本のワーカーループが同じブローカーから lease する
/// - `shutdown_and_join()` で新しい lease を止め、全ワーカーの終了を待つ
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    pub fn spawn(n: usize, broker: Arc<dyn Broker>, runtime: Arc<Runtime>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let joins = (0..n)
            .map(|worker_id| {
                let broker = Arc::clone(&broker);
                let runtime = Arc::clone(&runtime);
                let rx = shutdown_rx.clone();
                tokio::spawn(worker_loop(worker_id, broker, runtime, rx))
            })
            .collect();

        info!(workers = n, "worker group started");
        Self { shutdown_tx, joins }
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    /// Stop taking new leases. In-flight handlers run to completion.
    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            if let Err(e) = join.await {
                error!(error = %e, "worker task panicked");
            }
        }
        info!("worker group stopped");
    }
}

async fn worker_loop(
    worker_id: usize,
    broker: Arc<dyn Broker>,
    runtime: Arc<Runtime>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // lease は待つことがあるので shutdown と競合させる
        let lease = tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            lease = broker.lease() => lease,
        };

        let Some(lease) = lease else {
            // broker closed
            break;
        };

        let envelope = lease.envelope().clone();
        let attempt = lease.attempt();

        match runtime.execute(&envelope).await {
            Ok(()) => {
                info!(
                    worker_id,
                    task_id = %envelope.task_id,
                    task_type = %envelope.task_type,
                    attempt,
                    "task succeeded"
                );
                if let Err(e) = lease.ack().await {
                    error!(worker_id, task_id = %envelope.task_id, error = %e, "ack failed");
                }
            }
            Err(err) => {
                warn!(
                    worker_id,
                    task_id = %envelope.task_id,
                    task_type = %envelope.task_type,
                    attempt,
                    error = %err,
                    "task failed"
                );
                if let Err(e) = lease.fail(err.to_string()).await {
                    error!(worker_id, task_id = %envelope.task_id, error = %e, "fail report failed");
                }
            }
        }
    }
    info!(worker_id, "worker stopped");
}
