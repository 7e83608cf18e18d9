//! Service layer
//!
//! Each service is a cheap `Clone` handle over the shared document store,
//! scoped to one user's keys. Mutations are async read-modify-write cycles
//! against a single document; overlapping mutations of the same aggregate
//! are last-writer-wins (see crate docs).

pub mod address_book;
pub mod booking;
pub mod cart;
pub mod orders;

pub use address_book::AddressBook;
pub use booking::BookingCalendar;
pub use cart::CartService;
pub use orders::OrderService;
