use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, instrument};

use crate::model::{CreateOrderRequest, Order, OrderStatus, PaymentStatus};
use crate::order_service::{OrderError, OrderRequest};

/// Client for calling into the order service.
///
/// Every public method stamps a deadline (`now + request_timeout`) into
/// the outgoing envelope and enforces it locally with `timeout_at`. Nested
/// hops reuse the stamped deadline through the `_at` variants, so the
/// create/pay/notify chain runs under one end-to-end budget rather than
/// accumulating a fresh timeout per hop.
#[derive(Clone)]
pub struct OrderClient {
    sender: mpsc::Sender<OrderRequest>,
    request_timeout: Duration,
}

impl OrderClient {
    pub fn new(sender: mpsc::Sender<OrderRequest>, request_timeout: Duration) -> Self {
        Self {
            sender,
            request_timeout,
        }
    }

    #[instrument(skip(self, req))]
    pub async fn create_order(&self, req: CreateOrderRequest) -> Result<Order, OrderError> {
        debug!(?req, "create_order called");
        let deadline = Instant::now() + self.request_timeout;
        self.call(deadline, |respond_to| OrderRequest::Create {
            req,
            deadline,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: String) -> Result<Order, OrderError> {
        debug!("Sending request");
        let deadline = Instant::now() + self.request_timeout;
        self.call(deadline, |respond_to| OrderRequest::Get {
            order_id,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: String,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        debug!("Sending request");
        let deadline = Instant::now() + self.request_timeout;
        self.call(deadline, |respond_to| OrderRequest::UpdateStatus {
            order_id,
            status,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn update_payment_status(
        &self,
        order_id: String,
        payment_status: PaymentStatus,
    ) -> Result<Order, OrderError> {
        debug!("Sending request");
        let deadline = Instant::now() + self.request_timeout;
        self.update_payment_status_at(deadline, order_id, payment_status)
            .await
    }

    /// Callback variant reusing an upstream deadline instead of stamping a
    /// fresh one. Used by the payment service's notification path.
    pub(crate) async fn update_payment_status_at(
        &self,
        deadline: Instant,
        order_id: String,
        payment_status: PaymentStatus,
    ) -> Result<Order, OrderError> {
        self.call(deadline, |respond_to| OrderRequest::UpdatePaymentStatus {
            order_id,
            payment_status,
            respond_to,
        })
        .await
    }

    async fn call<T>(
        &self,
        deadline: Instant,
        make: impl FnOnce(oneshot::Sender<Result<T, OrderError>>) -> OrderRequest,
    ) -> Result<T, OrderError> {
        let (respond_to, response) = oneshot::channel();
        let request = make(respond_to);
        let exchange = async {
            self.sender
                .send(request)
                .await
                .map_err(|_| OrderError::Transport("order service unavailable".to_string()))?;
            response
                .await
                .map_err(|_| OrderError::Transport("order service dropped the request".to_string()))?
        };
        match timeout_at(deadline, exchange).await {
            Ok(result) => result,
            Err(_) => Err(OrderError::Transport("deadline exceeded".to_string())),
        }
    }
}
