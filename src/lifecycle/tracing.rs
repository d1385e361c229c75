//! # Observability & Tracing
//!
//! Structured logging setup for the whole system.
//!
//! Both services log every operation with structured fields (`order_id`,
//! `payment_status`, worker counts), and the store actors log each insert
//! and apply with the record type and map size. Client methods carry
//! `#[instrument]` spans, so a create shows up as the full hierarchy:
//!
//! ```text
//! INFO create_order: Creating new order customer_id="cust_1"
//! INFO create_order: Inserted entity_type="Order" id="..." size=1
//! INFO create_order:process_payment: Processing payment order_id="..." amount=28.97
//! INFO create_order:process_payment: Payment completed successfully
//! INFO create_order:process_payment: Order service notified of payment result
//! ```
//!
//! Levels follow the usual split: `info` for the workflow, `debug` for
//! full payloads at function entry, `warn`/`error` for missing records and
//! failed hops. Filter with `RUST_LOG` as usual:
//!
//! ```bash
//! RUST_LOG=info cargo test
//! RUST_LOG=delivery_core=debug cargo test
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Don't show module paths - we use entity_type instead
        .compact() // Compact format shows spans inline (e.g., "create_order:process_payment")
        .init();
}
