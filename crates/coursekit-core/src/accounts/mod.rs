//! Accounts: registration, confirmation, password reset and profile, plus the
//! notification tasks those requests enqueue.

pub mod service;
pub mod tasks;

pub use self::service::AccountService;
pub use self::tasks::{
    ACCOUNT_TASK_TYPES, AccountMailHandler, SendAccountChangesMessage, SendConfirmationMessage,
    SendResetEmail, register_account_tasks,
};
