//! Payment transaction records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PaymentMethod, PaymentStatus};

/// A single payment attempt record, owned by the payment service.
///
/// # Invariant
/// `amount` equals the order's total at the time the attempt was requested.
/// This is a trust assumption: the payment service does not re-verify it.
///
/// Transactions are never mutated after creation and never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub order_id: String,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        id: String,
        order_id: String,
        amount: f64,
        method: PaymentMethod,
        status: PaymentStatus,
    ) -> Self {
        Self {
            id,
            order_id,
            amount,
            method,
            status,
            created_at: Utc::now(),
        }
    }
}
