//! Error types for the payment service.

use thiserror::Error;

use crate::framework::StoreError;

/// Errors that can occur during payment operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentError {
    /// The requested transaction was not found.
    #[error("Transaction not found: {0}")]
    NotFound(String),

    /// An error occurred while communicating with the service itself
    /// (channel closed, deadline exceeded).
    #[error("Service communication error: {0}")]
    Transport(String),
}

impl From<String> for PaymentError {
    fn from(msg: String) -> Self {
        PaymentError::Transport(msg)
    }
}

impl From<StoreError> for PaymentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => PaymentError::NotFound(id),
            other => PaymentError::Transport(other.to_string()),
        }
    }
}
