//! Generic store-actor framework shared by both services.
//!
//! This module provides the building blocks for single-writer state
//! ownership: each service keeps its records behind a [`StoreActor`] that
//! applies every mutation sequentially in its own task.
//!
//! # Main Components
//!
//! - [`StoreEntity`] - Trait that record types implement to be managed by a store
//! - [`StoreActor`] - Generic single-writer actor owning the record map
//! - [`StoreClient`] - Typed handle for talking to a store actor
//! - [`StoreError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test handlers without spawning full
//! store actors.

pub mod core;
pub mod mock;

// Re-export core types for convenience
pub use self::core::*;
