//! Payment service: owns transaction records and pushes payment results
//! back into the order service.
//!
//! Mirrors the order service's shape: a bounded worker pool in front of a
//! single-writer transaction store. The one twist is the callback: after a
//! payment attempt is persisted, the handler synchronously notifies the
//! order service, and a failed notification is recorded for diagnostics
//! only. The transaction stands exactly as computed even when the order's
//! view of it now disagrees.

pub mod entity;
pub mod error;
pub mod processor;

pub use error::*;
pub use processor::*;

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::clients::{OrderClient, PaymentClient};
use crate::framework::StoreClient;
use crate::lifecycle::SystemConfig;
use crate::model::{PaymentMethod, PaymentStatus, Transaction};

/// One-shot response channel for payment operations.
pub type Respond<T> = oneshot::Sender<Result<T, PaymentError>>;

/// The payment service's request surface.
#[derive(Debug)]
pub enum PaymentRequest {
    /// Process a payment attempt for an order. Carries the upstream
    /// deadline so the callback into the order service stays under the
    /// originating caller's budget.
    Process {
        order_id: String,
        amount: f64,
        method: PaymentMethod,
        deadline: Instant,
        respond_to: Respond<Transaction>,
    },
    Get {
        transaction_id: String,
        respond_to: Respond<Transaction>,
    },
}

/// Creates a new payment service and its client, generating UUID
/// transaction ids.
pub fn new(
    config: &SystemConfig,
    store: StoreClient<Transaction>,
    processor: impl PaymentProcessor,
) -> (PaymentService, PaymentClient) {
    with_id_source(config, store, processor, || Uuid::new_v4().to_string())
}

/// Creates a new payment service with a caller-supplied id generator.
pub fn with_id_source(
    config: &SystemConfig,
    store: StoreClient<Transaction>,
    processor: impl PaymentProcessor,
    next_id: impl Fn() -> String + Send + Sync + 'static,
) -> (PaymentService, PaymentClient) {
    let (sender, receiver) = mpsc::channel(config.queue_depth);
    let service = PaymentService {
        receiver,
        store,
        workers: Arc::new(Semaphore::new(config.workers)),
        processor: Arc::new(processor),
        next_id: Arc::new(next_id),
    };
    let client = PaymentClient::new(sender, config.request_timeout);
    (service, client)
}

/// The payment service task.
pub struct PaymentService {
    receiver: mpsc::Receiver<PaymentRequest>,
    store: StoreClient<Transaction>,
    workers: Arc<Semaphore>,
    processor: Arc<dyn PaymentProcessor>,
    next_id: Arc<dyn Fn() -> String + Send + Sync>,
}

impl PaymentService {
    /// Runs the dispatch loop until the channel closes or shutdown is
    /// signalled, then drains in-flight handlers.
    ///
    /// The order client is late-bound here for the same reason the order
    /// service late-binds its payment client: each service needs a client
    /// for the other.
    pub async fn run(mut self, orders: OrderClient, mut shutdown: watch::Receiver<bool>) {
        info!(workers = self.workers.available_permits(), "Payment service started");
        let mut in_flight: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                maybe = self.receiver.recv() => {
                    let Some(request) = maybe else { break };
                    let Ok(permit) = self.workers.clone().acquire_owned().await else { break };
                    let store = self.store.clone();
                    let orders = orders.clone();
                    let processor = self.processor.clone();
                    let next_id = self.next_id.clone();
                    in_flight.spawn(async move {
                        let _permit = permit;
                        handle(request, &store, &orders, &processor, &next_id).await;
                    });
                }
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                _ = shutdown.changed() => break,
            }
        }

        while in_flight.join_next().await.is_some() {}
        info!("Payment service stopped");
    }
}

async fn handle(
    request: PaymentRequest,
    store: &StoreClient<Transaction>,
    orders: &OrderClient,
    processor: &Arc<dyn PaymentProcessor>,
    next_id: &Arc<dyn Fn() -> String + Send + Sync>,
) {
    match request {
        PaymentRequest::Process { order_id, amount, method, deadline, respond_to } => {
            let result = process_payment(
                order_id,
                amount,
                method,
                deadline,
                store,
                orders,
                processor.as_ref(),
                next_id.as_ref(),
            )
            .await;
            let _ = respond_to.send(result);
        }
        PaymentRequest::Get { transaction_id, respond_to } => {
            let _ = respond_to.send(get_transaction(transaction_id, store).await);
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn process_payment(
    order_id: String,
    amount: f64,
    method: PaymentMethod,
    deadline: Instant,
    store: &StoreClient<Transaction>,
    orders: &OrderClient,
    processor: &dyn PaymentProcessor,
    next_id: &(dyn Fn() -> String + Send + Sync),
) -> Result<Transaction, PaymentError> {
    info!(%order_id, amount, %method, "Processing payment");

    let approved = processor.authorize(&order_id, amount).await;
    let status = if approved {
        info!(%order_id, "Payment completed successfully");
        PaymentStatus::Completed
    } else {
        info!(%order_id, "Payment failed");
        PaymentStatus::Failed
    };

    let transaction = Transaction::new(next_id(), order_id.clone(), amount, method, status);
    store.insert(transaction.clone(), None).await?;

    // Notify the order service only after the transaction is persisted. A
    // failed callback is logged and otherwise swallowed: the caller still
    // gets the transaction, and the divergence is only observable through
    // a later GetOrder/GetTransaction pair.
    match orders
        .update_payment_status_at(deadline, order_id.clone(), status)
        .await
    {
        Ok(_) => info!(%order_id, "Order service notified of payment result"),
        Err(e) => error!(%order_id, error = %e, "Failed to notify order service"),
    }

    Ok(transaction)
}

async fn get_transaction(
    transaction_id: String,
    store: &StoreClient<Transaction>,
) -> Result<Transaction, PaymentError> {
    info!(%transaction_id, "Fetching transaction");
    store
        .get(transaction_id.clone())
        .await?
        .ok_or(PaymentError::NotFound(transaction_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockStore;

    #[tokio::test]
    async fn get_transaction_maps_missing_record_to_not_found() {
        let mut mock = MockStore::<Transaction>::new();
        mock.expect_get("nonexistent".to_string()).return_ok(None);
        let store = mock.client();

        let result = get_transaction("nonexistent".to_string(), &store).await;
        assert_eq!(result, Err(PaymentError::NotFound("nonexistent".to_string())));
        mock.verify();
    }
}
