//! RuntimeBuilder - ワーカー側ランタイムの構築
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: API 側が enqueue する task_type が
//!   ワーカー側に全て登録されているかを起動時に確認する

use super::handler::Handler;
use super::registry::{RegistryError, TaskRegistry};
use super::runtime::Runtime;
use super::task::Task;

/// ```ignore
/// let runtime = RuntimeBuilder::new()
///     .register::<SendResetEmail, _>(handler)?
///     .expect_tasks(ACCOUNT_TASK_TYPES)
///     .build()?;
/// ```
#[derive(Default)]
pub struct RuntimeBuilder {
    registry: TaskRegistry,
    expected: Vec<&'static str>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing task types: {0:?}; these are enqueued but have no handler")]
    MissingTaskTypes(Vec<&'static str>),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Task, H: Handler<T> + 'static>(
        mut self,
        handler: H,
    ) -> Result<Self, RegistryError> {
        self.registry.register::<T, H>(handler)?;
        Ok(self)
    }

    /// Apply a registration function (`accounts::register_account_tasks` etc.).
    pub fn with<F>(mut self, register: F) -> Result<Self, RegistryError>
    where
        F: FnOnce(&mut TaskRegistry) -> Result<(), RegistryError>,
    {
        register(&mut self.registry)?;
        Ok(self)
    }

    /// Task types that must have a handler; checked by `build`. Calls accumulate.
    pub fn expect_tasks(mut self, task_types: &[&'static str]) -> Self {
        self.expected.extend_from_slice(task_types);
        self
    }

    pub fn build(self) -> Result<Runtime, BuildError> {
        let registered = self.registry.registered_types();
        let mut missing: Vec<&'static str> = self
            .expected
            .into_iter()
            .filter(|t| !registered.contains(t))
            .collect();
        if !missing.is_empty() {
            missing.sort_unstable();
            missing.dedup();
            return Err(BuildError::MissingTaskTypes(missing));
        }
        Ok(Runtime::new(self.registry))
    }
}
