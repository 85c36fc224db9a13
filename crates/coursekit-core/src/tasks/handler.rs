//! Handler trait - Task を実行する Handler の定義
//!
//! # 学習ポイント
//! - ジェネリック trait (Handler<T>)
//! - Object-safe trait (DynHandler)
//! - Type erasure パターン (TypedHandler<T, H> → DynHandler)

use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;

use super::codec::ArgsCodec;
use super::task::Task;
use crate::error::TaskError;

/// Handler は Task を実行する
///
/// at-least-once 配送なので、同じ Task が 2 回以上届くことを前提に書きます。
/// 失敗は自分でログに残し、`Err` を返すとブローカーがリトライを判断します。
#[async_trait]
pub trait Handler<T: Task>: Send + Sync {
    async fn handle(&self, task: T) -> Result<(), TaskError>;
}

/// DynHandler は object-safe な Handler
///
/// `HashMap<String, Arc<dyn DynHandler>>` に格納するための型消去層です。
#[async_trait]
pub trait DynHandler: Send + Sync {
    async fn handle_dyn(&self, args: &[Value]) -> Result<(), TaskError>;
    fn task_type(&self) -> &'static str;
}

pub struct TypedHandler<T: Task, H: Handler<T>> {
    handler: H,
    _marker: PhantomData<fn(T)>,
}

impl<T: Task, H: Handler<T>> TypedHandler<T, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Task, H: Handler<T>> DynHandler for TypedHandler<T, H> {
    async fn handle_dyn(&self, args: &[Value]) -> Result<(), TaskError> {
        let task = ArgsCodec::decode::<T>(args).map_err(TaskError::Decode)?;
        self.handler.handle(task).await
    }

    fn task_type(&self) -> &'static str {
        T::TYPE
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Handlers shared by the tasks module tests.

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Greet(pub String);

    impl Task for Greet {
        const TYPE: &'static str = "test.greet.v1";
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Notify(pub String, pub u32);

    impl Task for Notify {
        const TYPE: &'static str = "test.notify.v1";
    }

    /// Counts executions; fails the first `fail_first` calls.
    #[derive(Clone, Default)]
    pub struct Counting {
        pub calls: Arc<AtomicUsize>,
        pub fail_first: usize,
    }

    impl Counting {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<T: Task> Handler<T> for Counting {
        async fn handle(&self, _task: T) -> Result<(), TaskError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err(TaskError::Handler(format!("failure #{}", n + 1)));
            }
            Ok(())
        }
    }
}
