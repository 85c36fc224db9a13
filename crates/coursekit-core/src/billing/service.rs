//! Subscription checkout and activation.
//!
//! Flow: `create_checkout` returns the provider's hosted page; after the
//! client pays there, the success page calls `complete_checkout` with the
//! session id, which activates the plan on the user. Completing the same
//! session twice leaves the same state.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::info;

use crate::app::AppState;
use crate::domain::{Plan, Subscription, User, UserId};
use crate::error::CoreError;
use crate::ports::{CheckoutMode, CheckoutRequest, PaymentStatus, Record};
use crate::serializer::FieldMask;

pub const PRICE_REQUIRED: &str = "Price ID is required.";
pub const UNKNOWN_PRICE: &str = "Unknown price.";
pub const SESSION_REQUIRED: &str = "Missing session_id";
pub const NOT_A_SUBSCRIPTION: &str = "This checkout is not a subscription.";
pub const NOT_PAID: &str = "Payment has not been completed.";

const CHECKOUT_SESSION: &str = "checkout session";

#[derive(Clone)]
pub struct SubscriptionService {
    state: Arc<AppState>,
}

impl SubscriptionService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Provider customer id of the user, created on first use.
    pub async fn ensure_customer(&self, user_id: UserId) -> Result<String, CoreError> {
        let user = self.user(user_id).await?;
        if let Some(id) = user.stripe_customer_id {
            return Ok(id);
        }

        let customer = self
            .state
            .payments
            .create_customer(&user.email, &user.name)
            .await?;

        // re-read so a profile write made meanwhile is kept
        let mut user = self.user(user_id).await?;
        if let Some(existing) = user.stripe_customer_id {
            return Ok(existing);
        }
        user.stripe_customer_id = Some(customer.clone());
        self.state.users.save(user).await?;
        info!(user_id = %user_id, customer = %customer, "payment customer created");
        Ok(customer)
    }

    /// Start a subscription checkout. Payload: `price_id`.
    /// Returns `checkout_url` and `session_id`.
    pub async fn create_checkout(
        &self,
        user_id: UserId,
        payload: &Map<String, Value>,
    ) -> Result<Map<String, Value>, CoreError> {
        let price_id = payload
            .get("price_id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::validation("price_id", PRICE_REQUIRED))?;
        let plan = *self
            .state
            .config
            .billing
            .plans
            .get(price_id)
            .ok_or_else(|| CoreError::validation("price_id", UNKNOWN_PRICE))?;

        let customer = self.ensure_customer(user_id).await?;
        let frontend = self.state.config.frontend_base();
        let request = CheckoutRequest {
            mode: CheckoutMode::Subscription,
            price_id: price_id.to_string(),
            customer: Some(customer),
            metadata: BTreeMap::from([
                ("user_id".to_string(), user_id.as_ulid().to_string()),
                ("plan".to_string(), plan.as_str().to_string()),
            ]),
            success_url: format!("{frontend}/payment-success?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{frontend}/payment-cancel"),
        };
        let session = self.state.payments.create_checkout_session(request).await?;
        info!(user_id = %user_id, session_id = %session.id, plan = %plan, "checkout session created");

        let mut out = Map::new();
        out.insert("checkout_url".to_string(), json!(session.url));
        out.insert("session_id".to_string(), json!(session.id));
        Ok(out)
    }

    /// Activate the plan paid for in `session_id` on the calling user.
    ///
    /// A session that belongs to another user is reported as not found.
    pub async fn complete_checkout(
        &self,
        user_id: UserId,
        session_id: &str,
    ) -> Result<Map<String, Value>, CoreError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(CoreError::validation("session_id", SESSION_REQUIRED));
        }
        let mut user = self.user(user_id).await?;

        let session = self
            .state
            .payments
            .checkout_session(session_id)
            .await?
            .filter(|s| s.metadata.get("user_id") == Some(&user.id.as_ulid().to_string()))
            .ok_or_else(|| CoreError::not_found(CHECKOUT_SESSION, session_id))?;
        if session.mode != CheckoutMode::Subscription {
            return Err(CoreError::validation("session_id", NOT_A_SUBSCRIPTION));
        }
        let (PaymentStatus::Paid, Some(provider_id)) =
            (session.payment_status, session.subscription_id.clone())
        else {
            return Err(CoreError::validation("session_id", NOT_PAID));
        };
        let plan = session
            .metadata
            .get("plan")
            .and_then(|p| Plan::parse(p))
            .ok_or_else(|| CoreError::not_found(CHECKOUT_SESSION, session_id))?;

        let now = self.state.clock.now();
        let period_end = session.current_period_end.unwrap_or_else(|| {
            now + chrono::Duration::days(i64::from(self.state.config.billing.period_days))
        });

        let mut subscription = self
            .state
            .subscriptions
            .get(&user.id)
            .await?
            .unwrap_or_else(|| Subscription::inactive(user.id, now));
        let renewed = subscription.provider_subscription_id.as_deref() == Some(provider_id.as_str());
        subscription.activate(plan, provider_id, period_end);
        self.state.subscriptions.save(subscription.clone()).await?;

        let start = match user.subscription_start_date {
            Some(start) if renewed => start,
            _ => now,
        };
        user.activate_subscription(plan, start, period_end);
        if user.stripe_customer_id.is_none() {
            user.stripe_customer_id = session.customer.clone();
        }
        self.state.users.save(user.clone()).await?;
        info!(user_id = %user.id, plan = %plan, "subscription activated");

        let mut out = FieldMask::all().serialize(&subscription, &self.state.media);
        out.insert(
            "customer".to_string(),
            json!({
                "id": user.stripe_customer_id,
                "email": user.email,
                "name": user.name,
            }),
        );
        Ok(out)
    }

    /// The user's subscription; not found when they never subscribed.
    pub async fn subscription(&self, user_id: UserId) -> Result<Map<String, Value>, CoreError> {
        let subscription = self
            .state
            .subscriptions
            .get(&user_id)
            .await?
            .ok_or_else(|| CoreError::not_found(Subscription::KIND, user_id))?;
        Ok(FieldMask::all().serialize(&subscription, &self.state.media))
    }

    async fn user(&self, id: UserId) -> Result<User, CoreError> {
        self.state
            .users
            .get(&id)
            .await?
            .ok_or_else(|| CoreError::not_found(User::KIND, id))
    }
}
