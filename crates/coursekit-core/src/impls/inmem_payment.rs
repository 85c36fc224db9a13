//! InMemoryPaymentProvider - 決済プロバイダの代役
//!
//! 顧客とセッションをメモリに保持します。支払いそのものは起きないので、
//! テストやデモでは `complete_checkout` で「支払い済み」に進めます。

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::ports::{
    CheckoutMode, CheckoutRequest, CheckoutSession, PaymentError, PaymentProvider, PaymentStatus,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct InMemoryPaymentProvider {
    customers: Mutex<BTreeMap<String, Customer>>,
    sessions: Mutex<HashMap<String, CheckoutSession>>,
    failures_left: AtomicU32,
}

fn provider_id(prefix: &str) -> String {
    format!("{prefix}_{:024x}", rand::random::<u128>() >> 32)
}

impl InMemoryPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` provider calls fail.
    pub fn fail_next(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn customers(&self) -> Vec<Customer> {
        self.customers.lock().values().cloned().collect()
    }

    /// Mark a session paid, as the hosted checkout page would.
    /// Returns `false` for an unknown session.
    pub fn complete_checkout(&self, session_id: &str, period_end: DateTime<Utc>) -> bool {
        let mut sessions = self.sessions.lock();
        let Some(session) = sessions.get_mut(session_id) else {
            return false;
        };
        session.payment_status = PaymentStatus::Paid;
        if session.customer.is_none() {
            let id = provider_id("cus");
            self.customers.lock().insert(
                id.clone(),
                Customer {
                    id: id.clone(),
                    email: String::new(),
                    name: String::new(),
                },
            );
            session.customer = Some(id);
        }
        if session.mode == CheckoutMode::Subscription && session.subscription_id.is_none() {
            session.subscription_id = Some(provider_id("sub"));
            session.current_period_end = Some(period_end);
        }
        true
    }

    fn check_failure(&self) -> Result<(), PaymentError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(PaymentError::Provider("api connection error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for InMemoryPaymentProvider {
    async fn create_customer(&self, email: &str, name: &str) -> Result<String, PaymentError> {
        self.check_failure()?;
        let id = provider_id("cus");
        self.customers.lock().insert(
            id.clone(),
            Customer {
                id: id.clone(),
                email: email.to_string(),
                name: name.to_string(),
            },
        );
        Ok(id)
    }

    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.check_failure()?;
        let id = provider_id("cs");
        let session = CheckoutSession {
            url: format!("https://checkout.payments.test/pay/{id}"),
            id: id.clone(),
            mode: request.mode,
            payment_status: PaymentStatus::Unpaid,
            customer: request.customer,
            subscription_id: None,
            current_period_end: None,
            metadata: request.metadata,
        };
        self.sessions.lock().insert(id, session.clone());
        Ok(session)
    }

    async fn checkout_session(&self, id: &str) -> Result<Option<CheckoutSession>, PaymentError> {
        self.check_failure()?;
        Ok(self.sessions.lock().get(id).cloned())
    }
}
