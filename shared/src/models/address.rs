//! Shipping address model
//!
//! Invariant: whenever the address list is non-empty, exactly one address
//! carries `is_default = true`, and `default_address_id` in the document
//! mirrors it. The address book service maintains this on every mutation.

use serde::{Deserialize, Serialize};

/// A shipping address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Address {
    /// Address ID (uuid)
    pub id: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub province: String,
    pub city: String,
    pub district: String,
    /// Street-level detail
    pub detail: String,
    #[serde(default)]
    pub is_default: bool,
    /// Optional label ("home", "office", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating or updating an address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressInput {
    pub receiver_name: String,
    pub receiver_phone: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub detail: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Address {
    /// Create a new address from input with a fresh ID
    pub fn from_input(input: AddressInput) -> Self {
        let now = super::now_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            receiver_name: input.receiver_name,
            receiver_phone: input.receiver_phone,
            province: input.province,
            city: input.city,
            district: input.district,
            detail: input.detail,
            is_default: input.is_default,
            label: input.label,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update in place, bumping `updated_at`
    pub fn apply_input(&mut self, input: AddressInput) {
        self.receiver_name = input.receiver_name;
        self.receiver_phone = input.receiver_phone;
        self.province = input.province;
        self.city = input.city;
        self.district = input.district;
        self.detail = input.detail;
        self.is_default = input.is_default;
        self.label = input.label;
        self.updated_at = super::now_millis();
    }
}

/// Persisted address-list document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressesDocument {
    pub addresses: Vec<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_address_id: Option<String>,
    pub last_modified: i64,
}

impl AddressesDocument {
    /// Create an empty document
    pub fn empty() -> Self {
        Self {
            addresses: Vec::new(),
            default_address_id: None,
            last_modified: super::now_millis(),
        }
    }
}

impl Default for AddressesDocument {
    fn default() -> Self {
        Self::empty()
    }
}
