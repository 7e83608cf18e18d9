//! Cart line items and the cart aggregate
//!
//! Cart lines are keyed by `(item_id, item_type)`: adding an item that is
//! already in the cart increments the existing line instead of appending a
//! duplicate. Totals are always recomputed from the full line list, never
//! adjusted incrementally.

use serde::{Deserialize, Serialize};

/// Purchasable item category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Product,
    Service,
    MealPlan,
    Consultation,
    Course,
}

impl ItemType {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::Service => "Service",
            Self::MealPlan => "Meal plan",
            Self::Consultation => "Consultation",
            Self::Course => "Course",
        }
    }
}

/// Recurrence descriptor for subscription-style lines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurringCycle {
    Weekly,
    Monthly,
    Quarterly,
}

/// A single cart line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Line ID (uuid, assigned when the line is created)
    pub id: String,
    pub item_type: ItemType,
    /// ID of the referenced product/service
    pub item_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Unit price in currency unit
    pub price: f64,
    /// Quantity, always >= 1 for a line that exists
    pub quantity: i32,
    /// Recurrence descriptor for subscription lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<RecurringCycle>,
    /// Multiplier in (0, 1] applied to the line total
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_discount: Option<f64>,
    /// When the line was added (unix millis)
    pub added_at: i64,
}

/// Input for adding an item to the cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemInput {
    pub item_type: ItemType,
    pub item_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub price: f64,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<RecurringCycle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_discount: Option<f64>,
}

/// Metadata patch for an existing cart line (None = no change)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CartItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<RecurringCycle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_discount: Option<f64>,
}

/// Cart aggregate — also the persisted cart document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub items: Vec<CartItem>,
    /// Sum of discounted line totals
    pub total_amount: f64,
    /// Sum of per-line cycle discounts
    pub total_discount: f64,
    /// Last mutation timestamp (unix millis)
    pub last_modified: i64,
}

impl Cart {
    /// Create an empty cart
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_amount: 0.0,
            total_discount: 0.0,
            last_modified: super::now_millis(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line by `(item_id, item_type)` merge key
    pub fn find_line(&self, item_id: &str, item_type: ItemType) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|line| line.item_id == item_id && line.item_type == item_type)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::empty()
    }
}

impl CartItem {
    /// Create a new line from input with a fresh line ID
    pub fn from_input(input: CartItemInput) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            item_type: input.item_type,
            item_id: input.item_id,
            name: input.name,
            image: input.image,
            price: input.price,
            quantity: input.quantity,
            cycle: input.cycle,
            cycle_discount: input.cycle_discount,
            added_at: super::now_millis(),
        }
    }
}
