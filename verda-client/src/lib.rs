//! Verda client core — local commerce ledger and appointment scheduling
//!
//! The client's system boundary is a local key → JSON-document store, not a
//! remote API. Three aggregates live under three keys: the cart, the order
//! list and the address list. Each mutation rewrites the whole document for
//! its aggregate; single-key writes are atomic but there are no cross-key
//! transactions and no versioning, so two overlapping mutations of the same
//! aggregate are last-writer-wins. Callers serialize related operations
//! themselves (the UI is single-threaded event-driven).
//!
//! # Modules
//!
//! - [`store`]: the `DocumentStore` contract and its redb implementation
//! - [`money`]: decimal arithmetic and input validation for amounts
//! - [`services::cart`]: cart accumulation with merge-on-add
//! - [`services::orders`]: order creation and the fulfillment state machine
//! - [`services::address_book`]: shipping addresses with a single default
//! - [`services::booking`]: calendar grid and half-hour slot availability

pub mod config;
pub mod money;
pub mod services;
pub mod store;

pub use config::Config;
pub use services::{AddressBook, BookingCalendar, CartService, OrderService};
pub use store::{DocumentStore, RedbStore};
