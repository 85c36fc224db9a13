//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（DB, 認証プロバイダ, メール送信）への
//! インターフェースを提供し、実装の詳細を隠蔽します（決済プロバイダを含む）。
//!
//! メッセージブローカーのポートは `queue::Broker` にあります。

pub mod clock;
pub mod id_generator;
pub mod mailer;
pub mod payment;
pub mod repository;
pub mod token;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::mailer::{EmailMessage, MailError, Mailer};
pub use self::payment::{
    CheckoutMode, CheckoutRequest, CheckoutSession, PaymentError, PaymentProvider, PaymentStatus,
};
pub use self::repository::{Filter, Record, Repository, StoreError};
pub use self::token::{TokenIssuer, TokenPurpose};
