//! External-facing APIs of the delivery middleware.
//!
//! - **Goal API**: submit, cancel and observe deliveries.
//! - **Operator API**: button presses, notification feeds and semantic map
//!   administration.

pub mod goal;
pub mod operator;
pub mod types;

// Re-export all types for convenience
pub use types::*;
