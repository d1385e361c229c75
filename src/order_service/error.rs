//! Error types for the order service.

use thiserror::Error;

use crate::framework::StoreError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The nested payment call failed while creating an order. The order
    /// record stays persisted in its pre-payment state.
    #[error("Internal error: {0}")]
    Internal(String),

    /// An error occurred while communicating with the service itself
    /// (channel closed, deadline exceeded).
    #[error("Service communication error: {0}")]
    Transport(String),
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::Transport(msg)
    }
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::Transport(other.to_string()),
        }
    }
}
