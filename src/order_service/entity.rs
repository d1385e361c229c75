//! [`StoreEntity`] implementation for the Order record.
//!
//! Updates are per-field: the store actor sets exactly the field named by
//! the [`OrderUpdate`] variant and leaves the other alone, with no
//! cross-validation between order status and payment status.

use crate::framework::StoreEntity;
use crate::model::{Order, OrderUpdate};

impl StoreEntity for Order {
    type Id = String;
    type Update = OrderUpdate;

    fn id(&self) -> &String {
        &self.id
    }

    fn apply(&mut self, update: OrderUpdate) {
        match update {
            OrderUpdate::Status(status) => self.status = status,
            OrderUpdate::Payment(payment_status) => self.payment_status = payment_status,
        }
    }
}
