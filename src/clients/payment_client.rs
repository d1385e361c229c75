use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, instrument};

use crate::model::{PaymentMethod, Transaction};
use crate::payment_service::{PaymentError, PaymentRequest};

/// Client for calling into the payment service.
///
/// Same deadline discipline as [`OrderClient`](crate::clients::OrderClient):
/// public methods stamp a fresh deadline, the `_at` variant reuses an
/// upstream one.
#[derive(Clone)]
pub struct PaymentClient {
    sender: mpsc::Sender<PaymentRequest>,
    request_timeout: Duration,
}

impl PaymentClient {
    pub fn new(sender: mpsc::Sender<PaymentRequest>, request_timeout: Duration) -> Self {
        Self {
            sender,
            request_timeout,
        }
    }

    #[instrument(skip(self))]
    pub async fn process_payment(
        &self,
        order_id: String,
        amount: f64,
        method: PaymentMethod,
    ) -> Result<Transaction, PaymentError> {
        debug!("Sending request");
        let deadline = Instant::now() + self.request_timeout;
        self.process_payment_at(deadline, order_id, amount, method)
            .await
    }

    /// Nested-hop variant used by the order service's create path; the
    /// caller's deadline travels with the request.
    pub(crate) async fn process_payment_at(
        &self,
        deadline: Instant,
        order_id: String,
        amount: f64,
        method: PaymentMethod,
    ) -> Result<Transaction, PaymentError> {
        self.call(deadline, |respond_to| PaymentRequest::Process {
            order_id,
            amount,
            method,
            deadline,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_transaction(&self, transaction_id: String) -> Result<Transaction, PaymentError> {
        debug!("Sending request");
        let deadline = Instant::now() + self.request_timeout;
        self.call(deadline, |respond_to| PaymentRequest::Get {
            transaction_id,
            respond_to,
        })
        .await
    }

    async fn call<T>(
        &self,
        deadline: Instant,
        make: impl FnOnce(oneshot::Sender<Result<T, PaymentError>>) -> PaymentRequest,
    ) -> Result<T, PaymentError> {
        let (respond_to, response) = oneshot::channel();
        let request = make(respond_to);
        let exchange = async {
            self.sender
                .send(request)
                .await
                .map_err(|_| PaymentError::Transport("payment service unavailable".to_string()))?;
            response
                .await
                .map_err(|_| {
                    PaymentError::Transport("payment service dropped the request".to_string())
                })?
        };
        match timeout_at(deadline, exchange).await {
            Ok(result) => result,
            Err(_) => Err(PaymentError::Transport("deadline exceeded".to_string())),
        }
    }
}
