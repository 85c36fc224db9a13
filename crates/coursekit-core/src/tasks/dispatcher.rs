//! Dispatcher - API 側から見たタスク投入口
//!
//! `enqueue` はブローカーが受理した時点で返ります（実行は待たない）。
//! 同じ内容を 2 回 enqueue すれば別々のタスクとして 2 回実行されます。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use super::codec::ArgsCodec;
use super::envelope::{TaskEnvelope, TaskType};
use super::task::Task;
use crate::domain::TaskId;
use crate::error::DispatchError;
use crate::ports::{Clock, IdGenerator};
use crate::queue::Broker;

/// What a request does when its side-effect task could not be enqueued.
///
/// The entity write has already been committed at that point either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnqueueFailurePolicy {
    /// Return the error to the caller.
    #[default]
    Fail,
    /// Log it and report success; the notification is lost.
    LogAndContinue,
}

#[derive(Clone)]
pub struct Dispatcher {
    broker: Arc<dyn Broker>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    on_failure: EnqueueFailurePolicy,
}

impl Dispatcher {
    pub fn new(broker: Arc<dyn Broker>, ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            broker,
            ids,
            clock,
            on_failure: EnqueueFailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, policy: EnqueueFailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    pub fn failure_policy(&self) -> EnqueueFailurePolicy {
        self.on_failure
    }

    pub async fn enqueue<T: Task>(&self, task: &T) -> Result<TaskId, DispatchError> {
        let args = ArgsCodec::encode(task)?;
        self.enqueue_raw(T::TYPE, args).await
    }

    /// Untyped form: task identifier plus positional arguments.
    pub async fn enqueue_raw(
        &self,
        task_type: &str,
        args: Vec<Value>,
    ) -> Result<TaskId, DispatchError> {
        let task_id: TaskId = self.ids.generate();
        let task_type = TaskType::new(task_type);
        let envelope = TaskEnvelope::new(task_id, task_type.clone(), args, self.clock.now());

        self.broker
            .publish(envelope)
            .await
            .map_err(|source| DispatchError::BrokerUnavailable {
                task_type: task_type.clone(),
                source,
            })?;

        info!(task_id = %task_id, task_type = %task_type, "task enqueued");
        Ok(task_id)
    }

    /// Enqueue the follow-up of a request whose write already committed,
    /// applying the configured `EnqueueFailurePolicy`.
    ///
    /// `Ok(None)` means the failure was logged and swallowed.
    pub async fn enqueue_side_effect<T: Task>(
        &self,
        task: &T,
    ) -> Result<Option<TaskId>, DispatchError> {
        match self.enqueue(task).await {
            Ok(task_id) => Ok(Some(task_id)),
            Err(err) if self.on_failure == EnqueueFailurePolicy::LogAndContinue => {
                error!(task_type = T::TYPE, error = %err, "enqueue failed; continuing without it");
                Ok(None)
            }
            Err(err) => {
                error!(task_type = T::TYPE, error = %err, "enqueue failed");
                Err(err)
            }
        }
    }
}
