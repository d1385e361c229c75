//! System orchestration: wiring, startup, shutdown, and tracing setup.

pub mod delivery_system;
pub mod tracing;

pub use delivery_system::*;
pub use self::tracing::setup_tracing;
