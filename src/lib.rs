//! # Delivery Core
//!
//! > **Order/payment orchestration for a food-delivery platform.**
//!
//! This crate implements the core of a two-service delivery backend: an
//! **order service** that owns order records and a **payment service** that
//! owns payment transactions. The two hold no shared storage and talk only
//! through typed request/response calls, exactly as they would across a
//! network boundary.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Single-writer stores + bounded worker pools
//!
//! Each service combines two concurrency tools:
//! - **A bounded worker pool**: a dispatch loop spawns one handler task per
//!   inbound request, gated by a semaphore, so the service handles calls in
//!   parallel up to a fixed limit.
//! - **A single-writer store actor**: all of a service's records live behind
//!   one [`framework::StoreActor`] that applies mutations sequentially in
//!   its own task. Handlers race freely; writes cannot.
//!
//! The split matters because of the call cycle: creating an order calls the
//! payment service, which calls *back* into the order service to push the
//! payment result. If order state lived inside the handler loop itself, the
//! callback would deadlock behind the create that triggered it. With state
//! in its own actor, the callback just needs a free worker slot.
//!
//! ### Deadlines instead of dangling calls
//!
//! Every client call is stamped with one end-to-end deadline that travels
//! through the whole create → pay → notify chain. Under pool exhaustion
//! (which the chained calls amplify), the deadline is what breaks the
//! stall: the hop fails with a transport error, workers unwind, and the
//! caller sees an `Internal` failure rather than a hang.
//!
//! ### Known divergence, by contract
//!
//! Two consistency gaps are part of the service contract and are covered by
//! tests rather than papered over:
//! - A payment-hop failure during create leaves the order persisted in
//!   `Pending`/`Pending` with no payment record behind it.
//! - A failed payment→order callback is logged and swallowed; the
//!   transaction stands as computed while the order's view disagrees.
//!
//! What *is* closed off: duplicate orders (idempotency keys on create) and
//! lost per-field updates (the single-writer store).
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! The generic single-writer store: [`framework::StoreEntity`],
//! [`framework::StoreActor`], [`framework::StoreClient`], plus the
//! [`framework::mock`] utilities for testing handlers in isolation.
//!
//! ### 2. The Vocabulary ([`model`])
//! Pure data: [`model::Order`], [`model::Transaction`], the line items,
//! the request DTOs, and the two strictly separate status enums.
//!
//! ### 3. The Services ([`order_service`], [`payment_service`])
//! The request surfaces, worker pools, and handler logic, including the
//! payment hop, the callback, and the injectable
//! [`payment_service::PaymentProcessor`] decision.
//!
//! ### 4. The Interface ([`clients`])
//! [`clients::OrderClient`] and [`clients::PaymentClient`], the typed
//! stand-ins for RPC stubs, with the deadline-stamping logic.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! [`lifecycle::DeliverySystem`] wires the stores, services, and the
//! order↔payment client cycle, and owns startup/shutdown.
//!
//! ## 🚀 Quick Start
//!
//! ```ignore
//! use delivery_core::lifecycle::DeliverySystem;
//! use delivery_core::model::{CreateOrderRequest, OrderItem};
//!
//! let system = DeliverySystem::new();
//!
//! let order = system.order_client.create_order(CreateOrderRequest::new(
//!     "cust-42",
//!     "rest-123",
//!     vec![OrderItem::new("Margherita Pizza", 2, 12.99)],
//! )).await?;
//!
//! system.shutdown().await?;
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! RUST_LOG=info cargo test
//! ```

pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod order_service;
pub mod payment_service;
