//! Data model for the client core
//!
//! All aggregates are stored as single JSON documents in the key-value
//! store: one cart document, one order-list document and one address-list
//! document per user. Timestamps are unix milliseconds (`i64`).

pub mod address;
pub mod booking;
pub mod cart;
pub mod order;

pub use address::{Address, AddressInput, AddressesDocument};
pub use booking::{BookingConfirmation, OccupiedSlot, TimeSlot};
pub use cart::{Cart, CartItem, CartItemInput, CartItemPatch, ItemType, RecurringCycle};
pub use order::{
    Order, OrderItem, OrderStatus, OrdersDocument, PaymentMethod, StatusHistoryEntry,
};

/// Current time as unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
