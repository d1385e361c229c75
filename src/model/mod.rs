//! Pure data structures shared across the service boundary: records,
//! request DTOs, and the status vocabulary.

pub mod order;
pub mod status;
pub mod transaction;

pub use order::*;
pub use status::*;
pub use transaction::*;
