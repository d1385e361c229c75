//! Order service: owns order records and orchestrates the payment hop.
//!
//! The service runs a bounded worker pool: a dispatch loop pulls requests
//! off the service channel and spawns one handler task per request, gated
//! by a semaphore of `workers` permits. Handlers run concurrently, but all
//! record mutations go through the single-writer order store.
//!
//! # The create/pay/notify chain
//! `CreateOrder` blocks its worker for the full duration of the nested
//! `ProcessPayment` call, which in turn blocks a payment worker for the
//! duration of the payment-status callback into this service. A worker slot
//! here is therefore held open while a payment slot and a second slot here
//! (the callback) are held open. The deadline stamped by the originating
//! client travels through all three hops, so a stalled chain fails with a
//! transport error instead of holding its slots forever.

pub mod entity;
pub mod error;

pub use error::*;

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::clients::{OrderClient, PaymentClient};
use crate::framework::{InsertOutcome, StoreClient};
use crate::lifecycle::SystemConfig;
use crate::model::{
    CreateOrderRequest, Order, OrderStatus, OrderUpdate, PaymentMethod, PaymentStatus,
};

/// One-shot response channel for order operations.
pub type Respond<T> = oneshot::Sender<Result<T, OrderError>>;

/// The order service's request surface.
///
/// `Create` carries the caller's deadline because its handler makes a
/// nested call into the payment service; the single-hop operations are
/// bounded by the client-side timeout alone.
#[derive(Debug)]
pub enum OrderRequest {
    Create {
        req: CreateOrderRequest,
        deadline: Instant,
        respond_to: Respond<Order>,
    },
    Get {
        order_id: String,
        respond_to: Respond<Order>,
    },
    UpdateStatus {
        order_id: String,
        status: OrderStatus,
        respond_to: Respond<Order>,
    },
    /// Callback used by the payment service to push a payment result.
    /// Sets `payment_status` unconditionally and never touches `status`.
    UpdatePaymentStatus {
        order_id: String,
        payment_status: PaymentStatus,
        respond_to: Respond<Order>,
    },
}

/// Creates a new order service and its client, generating UUID order ids.
pub fn new(config: &SystemConfig, store: StoreClient<Order>) -> (OrderService, OrderClient) {
    with_id_source(config, store, || Uuid::new_v4().to_string())
}

/// Creates a new order service with a caller-supplied id generator.
/// Tests use this to substitute predictable counters for UUIDs.
pub fn with_id_source(
    config: &SystemConfig,
    store: StoreClient<Order>,
    next_id: impl Fn() -> String + Send + Sync + 'static,
) -> (OrderService, OrderClient) {
    let (sender, receiver) = mpsc::channel(config.queue_depth);
    let service = OrderService {
        receiver,
        store,
        workers: Arc::new(Semaphore::new(config.workers)),
        next_id: Arc::new(next_id),
    };
    let client = OrderClient::new(sender, config.request_timeout);
    (service, client)
}

/// The order service task.
pub struct OrderService {
    receiver: mpsc::Receiver<OrderRequest>,
    store: StoreClient<Order>,
    workers: Arc<Semaphore>,
    next_id: Arc<dyn Fn() -> String + Send + Sync>,
}

impl OrderService {
    /// Runs the dispatch loop until the channel closes or shutdown is
    /// signalled, then drains in-flight handlers.
    ///
    /// # Context Injection
    /// The payment client is injected here rather than at construction
    /// time. Both services need a client for the other, so neither can be
    /// fully wired at construction; late binding breaks the cycle.
    pub async fn run(mut self, payments: PaymentClient, mut shutdown: watch::Receiver<bool>) {
        info!(workers = self.workers.available_permits(), "Order service started");
        let mut in_flight: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                maybe = self.receiver.recv() => {
                    let Some(request) = maybe else { break };
                    let Ok(permit) = self.workers.clone().acquire_owned().await else { break };
                    let store = self.store.clone();
                    let payments = payments.clone();
                    let next_id = self.next_id.clone();
                    in_flight.spawn(async move {
                        let _permit = permit;
                        handle(request, &store, &payments, &next_id).await;
                    });
                }
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                _ = shutdown.changed() => break,
            }
        }

        while in_flight.join_next().await.is_some() {}
        info!("Order service stopped");
    }
}

async fn handle(
    request: OrderRequest,
    store: &StoreClient<Order>,
    payments: &PaymentClient,
    next_id: &Arc<dyn Fn() -> String + Send + Sync>,
) {
    match request {
        OrderRequest::Create { req, deadline, respond_to } => {
            let _ = respond_to
                .send(create_order(req, deadline, store, payments, next_id.as_ref()).await);
        }
        OrderRequest::Get { order_id, respond_to } => {
            let _ = respond_to.send(get_order(order_id, store).await);
        }
        OrderRequest::UpdateStatus { order_id, status, respond_to } => {
            let _ = respond_to.send(update_status(order_id, status, store).await);
        }
        OrderRequest::UpdatePaymentStatus { order_id, payment_status, respond_to } => {
            let _ = respond_to.send(update_payment_status(order_id, payment_status, store).await);
        }
    }
}

async fn create_order(
    req: CreateOrderRequest,
    deadline: Instant,
    store: &StoreClient<Order>,
    payments: &PaymentClient,
    next_id: &(dyn Fn() -> String + Send + Sync),
) -> Result<Order, OrderError> {
    info!(
        customer_id = %req.customer_id,
        restaurant_id = %req.restaurant_id,
        "Creating new order"
    );

    let order = Order::new(next_id(), req.customer_id, req.restaurant_id, req.items);
    let order_id = order.id.clone();
    let total = order.total;

    // Atomic insert-with-alias: a replayed idempotency key returns the
    // order from the first attempt and makes no second payment attempt.
    match store.insert(order, req.idempotency_key).await? {
        InsertOutcome::Existing(existing) => {
            info!(order_id = %existing.id, "Idempotency key already seen, returning existing order");
            return Ok(existing);
        }
        InsertOutcome::Inserted => {}
    }
    info!(%order_id, total, "Created order");

    // Still within this request: the payment hop reuses the caller's
    // deadline so the whole create/pay/notify chain runs under one budget.
    // On a transport failure the order stays persisted in Pending/Pending
    // with no payment record behind it, and the caller sees Internal.
    let payment = payments
        .process_payment_at(deadline, order_id.clone(), total, PaymentMethod::CreditCard)
        .await
        .map_err(|e| {
            error!(%order_id, error = %e, "Payment service error");
            OrderError::Internal(format!("Payment service error: {e}"))
        })?;

    // The payment service pushes the same status through the callback path;
    // applying it here as well keeps the inline response authoritative.
    let mut updated = store
        .apply(order_id.clone(), OrderUpdate::Payment(payment.status))
        .await?;
    if payment.status == PaymentStatus::Completed {
        updated = store
            .apply(order_id.clone(), OrderUpdate::Status(OrderStatus::Confirmed))
            .await?;
    }
    info!(%order_id, payment_status = %payment.status, "Payment processed");

    Ok(updated)
}

async fn get_order(order_id: String, store: &StoreClient<Order>) -> Result<Order, OrderError> {
    info!(%order_id, "Fetching order");
    store
        .get(order_id.clone())
        .await?
        .ok_or(OrderError::NotFound(order_id))
}

async fn update_status(
    order_id: String,
    status: OrderStatus,
    store: &StoreClient<Order>,
) -> Result<Order, OrderError> {
    // No transition graph: any status may replace any other, including
    // backward transitions.
    info!(%order_id, %status, "Updating order status");
    let updated = store.apply(order_id, OrderUpdate::Status(status)).await?;
    Ok(updated)
}

async fn update_payment_status(
    order_id: String,
    payment_status: PaymentStatus,
    store: &StoreClient<Order>,
) -> Result<Order, OrderError> {
    info!(%order_id, %payment_status, "Updating payment status");
    let updated = store
        .apply(order_id, OrderUpdate::Payment(payment_status))
        .await?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockStore;
    use crate::framework::StoreError;

    #[tokio::test]
    async fn get_order_maps_missing_record_to_not_found() {
        let mut mock = MockStore::<Order>::new();
        mock.expect_get("nope".to_string()).return_ok(None);
        let store = mock.client();

        let result = get_order("nope".to_string(), &store).await;
        assert_eq!(result, Err(OrderError::NotFound("nope".to_string())));
        mock.verify();
    }

    #[tokio::test]
    async fn update_status_surfaces_store_not_found() {
        let mut mock = MockStore::<Order>::new();
        mock.expect_apply("nope".to_string())
            .return_err(StoreError::NotFound("nope".to_string()));
        let store = mock.client();

        let result = update_status("nope".to_string(), OrderStatus::Delivered, &store).await;
        assert_eq!(result, Err(OrderError::NotFound("nope".to_string())));
        mock.verify();
    }
}
