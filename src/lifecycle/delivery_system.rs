use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

use crate::clients::{OrderClient, PaymentClient};
use crate::framework::StoreActor;
use crate::model::{Order, Transaction};
use crate::payment_service::{BernoulliProcessor, PaymentProcessor};
use crate::{order_service, payment_service};

/// Shared configuration for both services.
///
/// `workers` bounds each service's handler pool. Note the amplification on
/// the create path: one CreateOrder in flight holds an order worker, a
/// payment worker, and a second order worker (the callback) at once, so
/// the effective concurrency available for new requests is lower than
/// `workers` suggests. `request_timeout` is the end-to-end budget a client
/// stamps on each call; it is what unwinds a chain that has stalled on
/// exhausted pools.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    /// Concurrent handler tasks per service.
    pub workers: usize,
    /// Capacity of each service's inbound request channel.
    pub queue_depth: usize,
    /// End-to-end deadline stamped on each client call.
    pub request_timeout: Duration,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            queue_depth: 32,
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// The runtime orchestrator for the order/payment pair.
///
/// `DeliverySystem` is responsible for:
/// - **Lifecycle Management**: Starting and stopping both stores and both services
/// - **Dependency Wiring**: Closing the order/payment client cycle via late binding
/// - **Resource Coordination**: Sharing one config and one shutdown signal
///
/// # Example
///
/// ```ignore
/// let system = DeliverySystem::new();
///
/// let order = system.order_client.create_order(req).await?;
/// let fetched = system.order_client.get_order(order.id.clone()).await?;
///
/// // Gracefully shut down when done
/// system.shutdown().await?;
/// ```
pub struct DeliverySystem {
    /// Client for calling the order service.
    pub order_client: OrderClient,

    /// Client for calling the payment service.
    pub payment_client: PaymentClient,

    /// Shutdown signal watched by both service loops.
    shutdown: watch::Sender<bool>,

    /// Task handles for stores and services (used for graceful shutdown).
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl DeliverySystem {
    /// Starts the full system with default config and the default 90%
    /// payment success rate.
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        Self::with_processor(config, BernoulliProcessor::default())
    }

    /// Starts the system with an injected payment decision, letting tests
    /// force either payment outcome deterministically.
    pub fn with_processor(config: SystemConfig, processor: impl PaymentProcessor) -> Self {
        // 1. Store actors (single writer per service's records)
        let (order_store, order_store_client) = StoreActor::<Order>::new(config.queue_depth);
        let (txn_store, txn_store_client) = StoreActor::<Transaction>::new(config.queue_depth);

        // 2. Services and their clients
        let (order_service, order_client) = order_service::new(&config, order_store_client);
        let (payment_service, payment_client) =
            payment_service::new(&config, txn_store_client, processor);

        // 3. Wire the cycle: each service runs with a client for the other.
        // Because the two clients cross-reference each other's channels,
        // shutdown goes through an explicit signal rather than the usual
        // drop-all-clients channel close.
        let (shutdown, shutdown_rx) = watch::channel(false);
        let handles = vec![
            tokio::spawn(order_store.run()),
            tokio::spawn(txn_store.run()),
            tokio::spawn(order_service.run(payment_client.clone(), shutdown_rx.clone())),
            tokio::spawn(payment_service.run(order_client.clone(), shutdown_rx)),
        ];

        Self {
            order_client,
            payment_client,
            shutdown,
            handles,
        }
    }

    /// Gracefully shuts down the entire system.
    ///
    /// Drops the external clients, signals both service loops, and waits
    /// for every task to finish. The store actors exit on their own once
    /// the stopped services drop the last store clients.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if all tasks shut down cleanly
    /// - `Err(String)` if any task failed or panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.order_client);
        drop(self.payment_client);
        let _ = self.shutdown.send(true);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Service task failed: {:?}", e);
                return Err(format!("Service task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

impl Default for DeliverySystem {
    fn default() -> Self {
        Self::new()
    }
}
