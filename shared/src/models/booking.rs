//! Booking slot shapes
//!
//! Dates are zero-padded `YYYY-MM-DD` strings, time labels are half-hour
//! `HH:MM` strings — the same representation the occupied-slot feed uses.

use serde::{Deserialize, Serialize};

/// A bookable half-hour slot with its computed availability
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    /// "HH:MM" label
    pub time: String,
    /// Not in the past and not occupied
    pub available: bool,
}

/// A `(date, time)` pair already claimed for a provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct OccupiedSlot {
    /// "YYYY-MM-DD"
    pub date: String,
    /// "HH:MM"
    pub time: String,
}

impl OccupiedSlot {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }
}

/// Confirmed selection returned to the checkout flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingConfirmation {
    /// "YYYY-MM-DD", zero-padded
    pub date: String,
    /// "HH:MM"
    pub time: String,
}
