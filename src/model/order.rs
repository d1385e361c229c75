//! Order records and the order-service request DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderStatus, PaymentStatus};

/// A single line item embedded in an order. Immutable once embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, quantity: u32, price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
        }
    }

    /// Price of this line: unit price times quantity.
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// A customer's purchase request, tracked independently of its payment
/// outcome.
///
/// # Ownership
/// Orders are exclusively owned and mutated by the order service. The
/// payment service only ever references an order by id and pushes payment
/// results through the order service's own update operation.
///
/// # Invariant
/// `total` always equals the sum over items of `price * quantity`. It is
/// computed once in [`Order::new`] and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub restaurant_id: String,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new order in the `Pending`/`Pending` state.
    ///
    /// An empty item list is legal and yields a total of zero.
    pub fn new(
        id: String,
        customer_id: String,
        restaurant_id: String,
        items: Vec<OrderItem>,
    ) -> Self {
        let total = items.iter().map(OrderItem::line_total).sum();
        Self {
            id,
            customer_id,
            restaurant_id,
            items,
            total,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Per-field mutation of an order.
///
/// `status` and `payment_status` are updated independently and without
/// cross-validation; each variant touches exactly one field. Setting the
/// payment status never re-derives the order status, so the two can diverge
/// when the payment callback path (rather than the inline create path) is
/// the one that observed completion.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderUpdate {
    Status(OrderStatus),
    Payment(PaymentStatus),
}

/// Payload for creating a new order.
///
/// `idempotency_key` identifies a logical order attempt: a create carrying
/// a previously seen key returns the existing order instead of creating a
/// duplicate (and makes no second payment attempt).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub restaurant_id: String,
    pub items: Vec<OrderItem>,
    pub idempotency_key: Option<String>,
}

impl CreateOrderRequest {
    pub fn new(
        customer_id: impl Into<String>,
        restaurant_id: impl Into<String>,
        items: Vec<OrderItem>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            restaurant_id: restaurant_id.into(),
            items,
            idempotency_key: None,
        }
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}
