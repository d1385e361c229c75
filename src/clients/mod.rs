//! Typed clients wrapping each service's request channel.
//!
//! These are the in-process stand-ins for RPC stubs: the rest of the
//! system (and the gateway, were one attached) talks to the services only
//! through these.

pub mod order_client;
pub mod payment_client;

pub use order_client::*;
pub use payment_client::*;
