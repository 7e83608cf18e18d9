//! Shared types for the Verda client core
//!
//! Data model and error types used by the service layer: addresses, cart
//! lines, orders with their fulfillment state machine, and booking slot
//! shapes.

pub mod error;
pub mod models;

// Re-exports
pub use error::{AppError, AppResult};
pub use serde::{Deserialize, Serialize};
