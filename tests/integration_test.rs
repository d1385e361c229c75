use std::collections::HashSet;

use delivery_core::lifecycle::{DeliverySystem, SystemConfig};
use delivery_core::model::{
    CreateOrderRequest, OrderItem, OrderStatus, PaymentStatus,
};
use delivery_core::order_service::OrderError;
use delivery_core::payment_service::{FixedProcessor, PaymentError};

fn pizza_and_soda() -> Vec<OrderItem> {
    vec![
        OrderItem::new("Pizza", 2, 12.99),
        OrderItem::new("Soda", 1, 2.99),
    ]
}

/// Full end-to-end flow with the payment outcome forced to success.
#[tokio::test]
async fn test_create_order_with_successful_payment() {
    let system = DeliverySystem::with_processor(SystemConfig::default(), FixedProcessor(true));

    let order = system
        .order_client
        .create_order(CreateOrderRequest::new("cust_1", "rest_1", pizza_and_soda()))
        .await
        .expect("Failed to create order");

    // total = 2 * 12.99 + 1 * 2.99
    assert!((order.total - 28.97).abs() < 1e-9);
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.payment_status, PaymentStatus::Completed);

    // The persisted record agrees with the response.
    let fetched = system
        .order_client
        .get_order(order.id.clone())
        .await
        .expect("Failed to get order");
    assert_eq!(fetched.status, OrderStatus::Confirmed);
    assert_eq!(fetched.payment_status, PaymentStatus::Completed);
    assert_eq!(fetched.customer_id, "cust_1");
    assert_eq!(fetched.restaurant_id, "rest_1");
    assert_eq!(fetched.items.len(), 2);

    system.shutdown().await.expect("Failed to shutdown system");
}

/// With the payment outcome forced to failure, the order is created but
/// never confirmed: the response is Pending with a Failed payment.
#[tokio::test]
async fn test_create_order_with_declined_payment() {
    let system = DeliverySystem::with_processor(SystemConfig::default(), FixedProcessor(false));

    let order = system
        .order_client
        .create_order(CreateOrderRequest::new("cust_1", "rest_1", pizza_and_soda()))
        .await
        .expect("Failed to create order");

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Failed);

    system.shutdown().await.expect("Failed to shutdown system");
}

/// An order with no items is legal and totals zero.
#[tokio::test]
async fn test_empty_order_is_legal() {
    let system = DeliverySystem::with_processor(SystemConfig::default(), FixedProcessor(true));

    let order = system
        .order_client
        .create_order(CreateOrderRequest::new("cust_1", "rest_1", vec![]))
        .await
        .expect("Failed to create order");
    assert_eq!(order.total, 0.0);
    assert_eq!(order.status, OrderStatus::Confirmed);

    system.shutdown().await.expect("Failed to shutdown system");
}

/// Lookups against identifiers the services never issued fail with
/// NotFound on both sides of the boundary.
#[tokio::test]
async fn test_unknown_identifiers_are_not_found() {
    let system = DeliverySystem::new();

    let err = system
        .order_client
        .get_order("nonexistent".to_string())
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::NotFound("nonexistent".to_string()));

    let err = system
        .order_client
        .update_order_status("nonexistent".to_string(), OrderStatus::Delivered)
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::NotFound("nonexistent".to_string()));

    let err = system
        .order_client
        .update_payment_status("nonexistent".to_string(), PaymentStatus::Completed)
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::NotFound("nonexistent".to_string()));

    let err = system
        .payment_client
        .get_transaction("nonexistent".to_string())
        .await
        .unwrap_err();
    assert_eq!(err, PaymentError::NotFound("nonexistent".to_string()));

    system.shutdown().await.expect("Failed to shutdown system");
}

/// Current behavior, documented deliberately: status updates accept any
/// transition, including backward ones and Delivered before Confirmed.
#[tokio::test]
async fn test_status_updates_accept_every_transition() {
    let system = DeliverySystem::with_processor(SystemConfig::default(), FixedProcessor(false));

    let order = system
        .order_client
        .create_order(CreateOrderRequest::new("cust_1", "rest_1", pizza_and_soda()))
        .await
        .unwrap();

    // Walk the full value space from a Pending order, then walk it again
    // backwards. Every set must stick.
    let forward = OrderStatus::ALL;
    let backward = {
        let mut statuses = OrderStatus::ALL;
        statuses.reverse();
        statuses
    };
    for status in forward.into_iter().chain(backward) {
        let updated = system
            .order_client
            .update_order_status(order.id.clone(), status)
            .await
            .expect("Failed to update status");
        assert_eq!(updated.status, status);

        let fetched = system.order_client.get_order(order.id.clone()).await.unwrap();
        assert_eq!(fetched.status, status);
    }

    system.shutdown().await.expect("Failed to shutdown system");
}

/// The payment callback path sets payment_status unconditionally and never
/// re-derives the order status, so the two fields can diverge.
#[tokio::test]
async fn test_payment_status_update_leaves_order_status_alone() {
    let system = DeliverySystem::with_processor(SystemConfig::default(), FixedProcessor(false));

    let order = system
        .order_client
        .create_order(CreateOrderRequest::new("cust_1", "rest_1", pizza_and_soda()))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let updated = system
        .order_client
        .update_payment_status(order.id.clone(), PaymentStatus::Completed)
        .await
        .unwrap();
    assert_eq!(updated.payment_status, PaymentStatus::Completed);
    // Still Pending: completion arrived via the callback path, not the
    // inline create path.
    assert_eq!(updated.status, OrderStatus::Pending);

    system.shutdown().await.expect("Failed to shutdown system");
}

/// Order identifiers never collide across repeated creations.
#[tokio::test]
async fn test_order_ids_are_unique_across_many_creations() {
    let system = DeliverySystem::with_processor(SystemConfig::default(), FixedProcessor(true));

    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        let order = system
            .order_client
            .create_order(CreateOrderRequest::new("cust_1", "rest_1", vec![]))
            .await
            .expect("Failed to create order");
        assert!(seen.insert(order.id), "duplicate order id issued");
    }

    system.shutdown().await.expect("Failed to shutdown system");
}

/// Replaying a create with the same idempotency key returns the original
/// order instead of creating (and charging) a second one.
#[tokio::test]
async fn test_idempotency_key_replay_returns_existing_order() {
    let system = DeliverySystem::with_processor(SystemConfig::default(), FixedProcessor(true));

    let req = CreateOrderRequest::new("cust_1", "rest_1", pizza_and_soda())
        .with_idempotency_key("attempt-1");

    let first = system.order_client.create_order(req.clone()).await.unwrap();
    assert_eq!(first.status, OrderStatus::Confirmed);

    let replay = system.order_client.create_order(req).await.unwrap();
    assert_eq!(replay.id, first.id);
    assert_eq!(replay.status, OrderStatus::Confirmed);
    assert_eq!(replay.payment_status, PaymentStatus::Completed);

    // A different key is a different logical attempt.
    let other = system
        .order_client
        .create_order(
            CreateOrderRequest::new("cust_1", "rest_1", pizza_and_soda())
                .with_idempotency_key("attempt-2"),
        )
        .await
        .unwrap();
    assert_ne!(other.id, first.id);

    system.shutdown().await.expect("Failed to shutdown system");
}

/// Concurrent updates against the same order must not lose writes whose
/// effects target disjoint fields: the final state reflects the last call
/// to each field.
#[tokio::test]
async fn test_concurrent_field_updates_are_not_lost() {
    let system = DeliverySystem::with_processor(SystemConfig::default(), FixedProcessor(true));

    let order = system
        .order_client
        .create_order(CreateOrderRequest::new("cust_1", "rest_1", pizza_and_soda()))
        .await
        .unwrap();

    // Hammer both fields concurrently.
    let mut handles = vec![];
    for i in 0..20u32 {
        let client = system.order_client.clone();
        let id = order.id.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                client
                    .update_order_status(id, OrderStatus::Preparing)
                    .await
                    .map(|_| ())
            } else {
                client
                    .update_payment_status(id, PaymentStatus::Processing)
                    .await
                    .map(|_| ())
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("concurrent update failed");
    }

    // Last submission per field wins, and neither field's final write is
    // lost to the other's.
    system
        .order_client
        .update_order_status(order.id.clone(), OrderStatus::Cancelled)
        .await
        .unwrap();
    system
        .order_client
        .update_payment_status(order.id.clone(), PaymentStatus::Refunded)
        .await
        .unwrap();

    let final_state = system.order_client.get_order(order.id.clone()).await.unwrap();
    assert_eq!(final_state.status, OrderStatus::Cancelled);
    assert_eq!(final_state.payment_status, PaymentStatus::Refunded);

    system.shutdown().await.expect("Failed to shutdown system");
}

/// Concurrent creates across separate orders all succeed within the pool
/// limits.
#[tokio::test]
async fn test_concurrent_order_creation() {
    let config = SystemConfig {
        workers: 32,
        ..SystemConfig::default()
    };
    let system = DeliverySystem::with_processor(config, FixedProcessor(true));

    let mut handles = vec![];
    for i in 0..16 {
        let client = system.order_client.clone();
        handles.push(tokio::spawn(async move {
            client
                .create_order(CreateOrderRequest::new(
                    format!("cust_{i}"),
                    "rest_1",
                    vec![OrderItem::new("Pizza", 1, 12.99)],
                ))
                .await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let order = handle.await.unwrap().expect("concurrent create failed");
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert!(ids.insert(order.id));
    }
    assert_eq!(ids.len(), 16);

    system.shutdown().await.expect("Failed to shutdown system");
}
