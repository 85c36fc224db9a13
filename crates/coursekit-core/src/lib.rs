//! coursekit-core
//!
//! Backend core of an online course platform.
//!
//! # モジュール構成
//! - **domain**: エンティティ（User, Course, Video, CourseProgress）と型付き ID
//! - **serializer**: フィールドマスク付きシリアライザ（読み取り）とフィールド単位の書き込み検証
//! - **tasks**: 遅延タスク（Task trait, Handler, Dispatcher, Runtime, WorkerGroup）
//! - **queue**: ブローカーのポートと at-least-once の in-memory 実装
//! - **ports / impls**: ストア・トークン・メール・時刻・ID の抽象化と in-memory 実装
//! - **accounts / courses / billing**: リクエスト単位のサービス操作
//! - **app / config**: ワイヤリングと設定
//!
//! # リクエストの流れ
//! サービスがエンティティを読み書きし、`FieldMask` で応答を整形し、副作用（メール送信）は
//! `Dispatcher` で enqueue して実行を待たずに返ります。ワーカーは `WorkerGroup` で
//! ブローカーから lease し、`Runtime` が登録済み Handler を呼びます。

pub mod accounts;
pub mod app;
pub mod billing;
pub mod config;
pub mod courses;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod queue;
pub mod serializer;
pub mod tasks;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::app::AppState;
pub use crate::config::AppConfig;
pub use crate::error::{CoreError, DispatchError, TaskError};
