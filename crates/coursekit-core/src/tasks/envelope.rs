//! TaskEnvelope - ブローカーに載るメッセージ
//!
//! JSON 表現: `{"task_id": "...", "task_type": "...", "args": [...], "enqueued_at": "..."}`

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::TaskId;

/// Task identifier (`accounts.email.confirmation.v1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(String);

impl TaskType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task descriptor: identifier plus positional arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub task_id: TaskId,
    pub task_type: TaskType,
    pub args: Vec<Value>,
    pub enqueued_at: DateTime<Utc>,
}

impl TaskEnvelope {
    pub fn new(
        task_id: TaskId,
        task_type: TaskType,
        args: Vec<Value>,
        enqueued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            task_type,
            args,
            enqueued_at,
        }
    }
}
