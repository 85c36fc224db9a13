//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の in-memory 実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryRepository**: エンティティごとのストア
//! - **MemoryMailer**: 送信内容を保持する Mailer
//! - **InMemoryTokenIssuer**: メール確認・リセット用トークン
//! - **InMemoryPaymentProvider**: 決済プロバイダの代役（顧客・Checkout セッション）
//!
//! ブローカーの in-memory 実装は `queue::InMemoryBroker` です。

pub mod inmem_mailer;
pub mod inmem_payment;
pub mod inmem_store;
pub mod inmem_token;

// 主要な型を再エクスポート
pub use self::inmem_mailer::MemoryMailer;
pub use self::inmem_payment::{Customer, InMemoryPaymentProvider};
pub use self::inmem_store::InMemoryRepository;
pub use self::inmem_token::InMemoryTokenIssuer;
