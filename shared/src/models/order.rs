//! Order model and fulfillment state machine types
//!
//! An [`Order`] is created once from a cart snapshot and then mutated only
//! through status transitions. Every transition appends one
//! [`StatusHistoryEntry`], so `status_history` is append-only and its last
//! entry always matches `status`. Orders are never hard-deleted.

use super::address::Address;
use super::cart::{CartItem, ItemType, RecurringCycle};
use serde::{Deserialize, Serialize};

/// Order fulfillment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Processing,
    Shipping,
    Delivered,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Refunded)
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Awaiting payment",
            Self::Paid => "Paid",
            Self::Processing => "Processing",
            Self::Shipping => "Shipping",
            Self::Delivered => "Delivered",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Refunded => "Refunded",
        }
    }
}

/// Payment method (payment itself is simulated)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Wallet,
    Balance,
}

/// One entry in an order's append-only status history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Immutable snapshot of a cart line at checkout time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
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
    /// Discounted line total, computed once at checkout
    pub subtotal: f64,
}

impl OrderItem {
    /// Snapshot a cart line with a precomputed subtotal
    pub fn from_cart_item(line: &CartItem, subtotal: f64) -> Self {
        Self {
            item_type: line.item_type,
            item_id: line.item_id.clone(),
            name: line.name.clone(),
            image: line.image.clone(),
            price: line.price,
            quantity: line.quantity,
            cycle: line.cycle,
            cycle_discount: line.cycle_discount,
            subtotal,
        }
    }
}

/// An order with its fulfillment state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Human-readable ID: "WO" + yyyymmdd + sequence
    pub id: String,
    pub user_id: String,
    /// Item type of the first order item (list display)
    pub item_type: ItemType,
    /// Name of the first order item (list display)
    pub item_name: String,
    pub items: Vec<OrderItem>,
    /// Sum of item subtotals
    pub subtotal: f64,
    /// Sum of per-line cycle discounts
    pub discount_amount: f64,
    pub coupon_amount: f64,
    pub delivery_fee: f64,
    /// subtotal - coupon_amount + delivery_fee
    pub total_amount: f64,
    /// Delivery address snapshot taken at checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub status: OrderStatus,
    /// Append-only, ordered by occurrence
    pub status_history: Vec<StatusHistoryEntry>,
    /// Cached guard: cancellation currently allowed
    pub can_cancel: bool,
    /// Cached guard: refund currently allowed
    pub can_refund: bool,
    #[serde(default)]
    pub is_reviewed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_id: Option<String>,

    // === Payment ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    // === Delivery ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_time: Option<i64>,

    // === Refund / cancellation ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Last recorded history entry
    pub fn last_history(&self) -> Option<&StatusHistoryEntry> {
        self.status_history.last()
    }

    /// Delivered but not yet reviewed
    pub fn is_pending_review(&self) -> bool {
        self.status == OrderStatus::Delivered && !self.is_reviewed
    }
}

/// Persisted order-list document
///
/// `order_seq` is the monotonic counter used for ID assignment; it rides in
/// the same document so a single key write covers both the counter bump and
/// the order insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersDocument {
    pub orders: Vec<Order>,
    #[serde(default)]
    pub order_seq: u64,
    pub last_modified: i64,
}

impl OrdersDocument {
    /// Create an empty document
    pub fn empty() -> Self {
        Self {
            orders: Vec::new(),
            order_seq: 0,
            last_modified: super::now_millis(),
        }
    }
}

impl Default for OrdersDocument {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_tag() {
        let json = serde_json::to_string(&OrderStatus::Shipping).unwrap();
        assert_eq!(json, "\"SHIPPING\"");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Refunded.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Delivered.is_terminal());
    }

    #[test]
    fn test_pending_review() {
        let line = CartItem {
            id: "line-1".to_string(),
            item_type: ItemType::Product,
            item_id: "p-1".to_string(),
            name: "Tea".to_string(),
            image: None,
            price: 10.0,
            quantity: 1,
            cycle: None,
            cycle_discount: None,
            added_at: 0,
        };
        let mut order = Order {
            id: "WO2024011510001".to_string(),
            user_id: "local".to_string(),
            item_type: ItemType::Product,
            item_name: "Tea".to_string(),
            items: vec![OrderItem::from_cart_item(&line, 10.0)],
            subtotal: 10.0,
            discount_amount: 0.0,
            coupon_amount: 0.0,
            delivery_fee: 0.0,
            total_amount: 10.0,
            address: None,
            notes: None,
            status: OrderStatus::Delivered,
            status_history: vec![],
            can_cancel: false,
            can_refund: true,
            is_reviewed: false,
            review_id: None,
            payment_method: None,
            payment_time: None,
            transaction_id: None,
            tracking_number: None,
            estimated_delivery: None,
            delivered_time: None,
            refund_amount: None,
            refund_reason: None,
            refund_time: None,
            cancel_reason: None,
            created_at: 0,
            updated_at: 0,
        };
        assert!(order.is_pending_review());
        order.is_reviewed = true;
        assert!(!order.is_pending_review());
    }
}
