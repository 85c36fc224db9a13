//! Runtime - 受け取った TaskEnvelope を登録済み Handler に渡す

use tracing::debug;

use super::envelope::TaskEnvelope;
use super::registry::TaskRegistry;
use crate::error::TaskError;

/// Runtime executes a `TaskEnvelope` by dispatching to the registered handler.
///
/// Built once by `RuntimeBuilder` and shared (`Arc`) by every worker.
pub struct Runtime {
    registry: TaskRegistry,
}

impl Runtime {
    pub(crate) fn new(registry: TaskRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Execute one envelope. An unknown identifier is an error the broker sees
    /// like any other failure.
    pub async fn execute(&self, envelope: &TaskEnvelope) -> Result<(), TaskError> {
        let handler = self
            .registry
            .get(envelope.task_type.as_str())
            .ok_or_else(|| TaskError::HandlerNotFound(envelope.task_type.clone()))?;

        debug!(
            task_id = %envelope.task_id,
            task_type = %envelope.task_type,
            "executing"
        );
        handler.handle_dyn(&envelope.args).await
    }
}
