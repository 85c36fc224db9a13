//! Deferred task dispatch.
//!
//! # 二層構造
//! - **表層（Typed）**: `Task` trait, `Handler<T>` trait, `Dispatcher::enqueue::<T>` - 型安全
//! - **内部（Dyn）**: `DynHandler` trait, `TaskEnvelope`（識別子 + 位置引数）- object-safe
//!
//! API 側は `Dispatcher` で enqueue して即座に返り、ワーカー側は
//! `RuntimeBuilder` で組み立てた `Runtime` を `WorkerGroup` で回します。

pub mod builder;
pub mod codec;
pub mod dispatcher;
pub mod envelope;
pub mod handler;
pub mod registry;
pub mod runtime;
pub mod task;
pub mod worker;

pub use self::builder::{BuildError, RuntimeBuilder};
pub use self::codec::{ArgsCodec, CodecError};
pub use self::dispatcher::{Dispatcher, EnqueueFailurePolicy};
pub use self::envelope::{TaskEnvelope, TaskType};
pub use self::handler::{DynHandler, Handler, TypedHandler};
pub use self::registry::{RegistryError, TaskRegistry};
pub use self::runtime::Runtime;
pub use self::task::Task;
pub use self::worker::WorkerGroup;
