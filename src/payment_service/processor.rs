//! Payment outcome decision, standing in for an external payment processor.

use async_trait::async_trait;
use rand::Rng;

/// Decides whether a payment attempt is approved.
///
/// The decision is injected into the payment service so tests can force
/// either outcome deterministically; production wiring uses
/// [`BernoulliProcessor`] with its default rate.
#[async_trait]
pub trait PaymentProcessor: Send + Sync + 'static {
    /// Returns whether the charge is approved.
    async fn authorize(&self, order_id: &str, amount: f64) -> bool;
}

/// Approves with a fixed probability, independent of order, amount, or
/// method. Defaults to the simulated processor's 90% success rate.
#[derive(Debug, Clone, Copy)]
pub struct BernoulliProcessor {
    pub success_rate: f64,
}

impl BernoulliProcessor {
    pub fn new(success_rate: f64) -> Self {
        Self { success_rate }
    }
}

impl Default for BernoulliProcessor {
    fn default() -> Self {
        Self { success_rate: 0.9 }
    }
}

#[async_trait]
impl PaymentProcessor for BernoulliProcessor {
    async fn authorize(&self, _order_id: &str, _amount: f64) -> bool {
        rand::thread_rng().gen::<f64>() < self.success_rate
    }
}

/// Always approves or always declines. For tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedProcessor(pub bool);

#[async_trait]
impl PaymentProcessor for FixedProcessor {
    async fn authorize(&self, _order_id: &str, _amount: f64) -> bool {
        self.0
    }
}
