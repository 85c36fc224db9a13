//! Billing: payment-provider customers, subscription checkout and activation.

pub mod service;
pub mod tasks;

pub use self::service::SubscriptionService;
pub use self::tasks::{BILLING_TASK_TYPES, BillingHandler, CreatePaymentCustomer, register_billing_tasks};
