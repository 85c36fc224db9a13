//! Error types.
//!
//! - `CoreError`: what a service operation (request) returns
//! - `DispatchError`: enqueue failed (broker refused or arguments did not encode)
//! - `TaskError`: what a worker reports back to the broker

use thiserror::Error;

use crate::ports::{PaymentError, StoreError};
use crate::queue::BrokerError;
use crate::serializer::ValidationErrors;
use crate::tasks::{CodecError, TaskType};

#[derive(Debug, Error)]
pub enum CoreError {
    /// Field-keyed messages; serializes as `{"field": ["message", ...]}`.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// The uid/token pair of a confirmation or reset link does not check out.
    #[error("invalid or expired link")]
    InvalidToken,

    /// Unknown email, wrong password or a deactivated account.
    #[error("Unable to log in with provided credentials.")]
    InvalidCredentials,

    #[error("E-mail is not verified.")]
    EmailNotVerified,

    #[error("enqueue failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl CoreError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("broker rejected {task_type}: {source}")]
    BrokerUnavailable {
        task_type: TaskType,
        #[source]
        source: BrokerError,
    },

    #[error(transparent)]
    Encode(#[from] CodecError),
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("handler not found for task_type={0}")]
    HandlerNotFound(TaskType),

    #[error(transparent)]
    Decode(CodecError),

    /// The handler ran and failed; the broker decides whether to retry.
    #[error("{0}")]
    Handler(String),
}

impl TaskError {
    pub fn handler(err: impl std::fmt::Display) -> Self {
        Self::Handler(err.to_string())
    }
}
