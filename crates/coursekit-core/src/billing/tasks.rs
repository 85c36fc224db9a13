//! Billing tasks (run by workers).

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::service::SubscriptionService;
use crate::app::AppState;
use crate::domain::UserId;
use crate::error::{CoreError, TaskError};
use crate::tasks::{Handler, RegistryError, Task, TaskRegistry};

/// Create the payment-provider customer for a new account. Args: `(user_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentCustomer(pub UserId);

impl Task for CreatePaymentCustomer {
    const TYPE: &'static str = "billing.customer.create.v1";
}

pub const BILLING_TASK_TYPES: &[&str] = &[CreatePaymentCustomer::TYPE];

pub fn register_billing_tasks(
    registry: &mut TaskRegistry,
    state: &Arc<AppState>,
) -> Result<(), RegistryError> {
    registry.register::<CreatePaymentCustomer, _>(BillingHandler::new(state))
}

#[derive(Clone)]
pub struct BillingHandler {
    billing: SubscriptionService,
}

impl BillingHandler {
    pub fn new(state: &Arc<AppState>) -> Self {
        Self {
            billing: SubscriptionService::new(Arc::clone(state)),
        }
    }
}

#[async_trait]
impl Handler<CreatePaymentCustomer> for BillingHandler {
    async fn handle(&self, task: CreatePaymentCustomer) -> Result<(), TaskError> {
        let CreatePaymentCustomer(user_id) = task;
        match self.billing.ensure_customer(user_id).await {
            Ok(_) => Ok(()),
            Err(CoreError::NotFound { .. }) => {
                warn!(
                    task_type = CreatePaymentCustomer::TYPE,
                    user_id = %user_id,
                    "user not found; no customer created"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    task_type = CreatePaymentCustomer::TYPE,
                    user_id = %user_id,
                    error = %e,
                    "creating payment customer failed"
                );
                Err(TaskError::handler(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestApp;

    #[tokio::test]
    async fn handler_creates_one_customer_per_user() {
        let app = TestApp::new();
        let user = app.seed_user("jane@example.com", "Jane").await;
        let handler = BillingHandler::new(&app.state);

        handler.handle(CreatePaymentCustomer(user.id)).await.unwrap();
        // duplicate delivery
        handler.handle(CreatePaymentCustomer(user.id)).await.unwrap();

        let customers = app.payments.customers();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].email, "jane@example.com");
        assert_eq!(customers[0].name, "Jane");

        let stored = app.state.users.get(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.stripe_customer_id.as_deref(), Some(customers[0].id.as_str()));
    }

    #[tokio::test]
    async fn missing_user_completes_and_provider_errors_retry() {
        let app = TestApp::new();
        let handler = BillingHandler::new(&app.state);
        let ghost: UserId = app.state.ids.generate();
        handler.handle(CreatePaymentCustomer(ghost)).await.unwrap();

        let user = app.seed_user("jane@example.com", "Jane").await;
        app.payments.fail_next(1);
        let err = handler.handle(CreatePaymentCustomer(user.id)).await.unwrap_err();
        assert!(matches!(err, TaskError::Handler(_)));
        assert!(app.payments.customers().is_empty());
    }
}
