//! PaymentProvider port - 決済プロバイダ（Stripe など）の抽象化
//!
//! 顧客の作成と Checkout セッションの作成・取得だけを扱います。
//! 支払い完了後のユーザー状態の更新は `billing` サービス側の責務です。

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Checkout の種類。課金プランの購読は `Subscription`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutMode {
    Payment,
    Subscription,
}

/// Provider 側の支払い状況。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub mode: CheckoutMode,
    /// Provider price id of the recurring plan.
    pub price_id: String,
    pub customer: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page the client is redirected to.
    pub url: String,
    pub mode: CheckoutMode,
    pub payment_status: PaymentStatus,
    pub customer: Option<String>,
    /// Set once a subscription checkout is paid.
    pub subscription_id: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("payment provider error: {0}")]
    Provider(String),
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a customer record and return its provider id.
    async fn create_customer(&self, email: &str, name: &str) -> Result<String, PaymentError>;

    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// `Ok(None)` when the provider does not know the session id.
    async fn checkout_session(&self, id: &str) -> Result<Option<CheckoutSession>, PaymentError>;
}
