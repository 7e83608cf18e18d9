//! Order ledger — order creation and the fulfillment state machine
//!
//! # State machine
//!
//! ```text
//! Pending ──pay──────────▶ Paid ──start_processing──▶ Processing
//!    │                      │                             │
//!    │cancel                └────────ship────────┬────────┘
//!    ▼                                           ▼
//! Cancelled                                  Shipping ──deliver──▶ Delivered ──review──▶ Completed
//!
//! Paid / Processing / Shipping / Delivered ──refund──▶ Refunded
//! ```
//!
//! Every transition funnels through [`apply_transition`], which appends one
//! status-history entry and updates `status`/`updated_at` together, so the
//! history is append-only and its last entry always matches the current
//! status. Guard checks use the cached `can_cancel`/`can_refund` flags or
//! the current status; violations surface as `AppError::InvalidState`.
//! Orders are never hard-deleted.

use crate::money;
use crate::services::address_book::validate_address;
use crate::store::{self, DocumentStore};
use chrono::Local;
use serde::Deserialize;
use shared::models::{
    Address, CartItem, Order, OrderItem, OrderStatus, OrdersDocument, PaymentMethod,
    StatusHistoryEntry, now_millis,
};
use shared::{AppError, AppResult};
use std::sync::Arc;

/// Append one history entry and update status + timestamp together.
///
/// This is the single choke point all transitions go through.
fn apply_transition(order: &mut Order, status: OrderStatus, note: Option<String>) {
    let now = now_millis();
    order.status = status;
    order.status_history.push(StatusHistoryEntry {
        status,
        timestamp: now,
        note,
    });
    order.updated_at = now;
}

/// Raw document shape used for tolerant decoding: order entries that fail
/// to decode (legacy/malformed records) are skipped instead of poisoning
/// the whole list.
#[derive(Debug, Deserialize)]
struct RawOrdersDocument {
    #[serde(default)]
    orders: Vec<serde_json::Value>,
    #[serde(default)]
    order_seq: u64,
    #[serde(default)]
    last_modified: i64,
}

/// Order ledger service
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn DocumentStore>,
    user_id: String,
    key: String,
}

impl OrderService {
    pub fn new(store: Arc<dyn DocumentStore>, user_id: &str) -> Self {
        Self {
            key: store::orders_key(user_id),
            user_id: user_id.to_string(),
            store,
        }
    }

    async fn load(&self) -> AppResult<OrdersDocument> {
        let Some(value) = self.store.get(&self.key).await? else {
            return Ok(OrdersDocument::empty());
        };
        let raw: RawOrdersDocument = serde_json::from_value(value)?;

        let mut orders = Vec::with_capacity(raw.orders.len());
        for entry in raw.orders {
            match serde_json::from_value::<Order>(entry) {
                Ok(order) => orders.push(order),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed order record");
                }
            }
        }
        Ok(OrdersDocument {
            orders,
            order_seq: raw.order_seq,
            last_modified: raw.last_modified,
        })
    }

    async fn persist(&self, doc: &mut OrdersDocument) -> AppResult<()> {
        doc.last_modified = now_millis();
        store::write_document(self.store.as_ref(), &self.key, doc).await
    }

    /// Load, mutate one order, persist, return the mutated order
    async fn with_order<F>(&self, order_id: &str, mutate: F) -> AppResult<Order>
    where
        F: FnOnce(&mut Order) -> AppResult<()>,
    {
        let mut doc = self.load().await?;
        let order = doc
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| AppError::not_found("order", order_id))?;

        mutate(order)?;

        let updated = order.clone();
        self.persist(&mut doc).await?;
        tracing::info!(order_id = %order_id, status = ?updated.status, "order updated");
        Ok(updated)
    }

    // ========== Creation ==========

    /// Convert a cart snapshot into a new pending order.
    ///
    /// `total_amount = subtotal - coupon_amount + delivery_fee` where
    /// `subtotal` is the sum of discounted line subtotals. The ID combines
    /// the creation date with the document's monotonic sequence, so rapid
    /// successive creations cannot collide.
    pub async fn create_order(
        &self,
        cart_items: Vec<CartItem>,
        delivery_address: Address,
        notes: Option<String>,
        coupon_amount: f64,
        delivery_fee: f64,
    ) -> AppResult<Order> {
        if cart_items.is_empty() {
            return Err(AppError::validation("cannot create an order from an empty cart"));
        }
        for line in &cart_items {
            money::validate_cart_line(line)?;
        }
        validate_address(&delivery_address)?;
        money::validate_charge(coupon_amount, "coupon_amount")?;
        money::validate_charge(delivery_fee, "delivery_fee")?;

        let items: Vec<OrderItem> = cart_items
            .iter()
            .map(|line| {
                let subtotal = money::line_total(line.price, line.quantity, line.cycle_discount);
                OrderItem::from_cart_item(line, subtotal)
            })
            .collect();

        let subtotal = money::round2(items.iter().map(|i| i.subtotal).sum());
        let discount_amount = money::round2(
            cart_items
                .iter()
                .map(|l| money::line_discount(l.price, l.quantity, l.cycle_discount))
                .sum(),
        );
        if coupon_amount > subtotal {
            return Err(AppError::validation(format!(
                "coupon_amount ({coupon_amount}) exceeds subtotal ({subtotal})"
            )));
        }
        let total_amount = money::round2(subtotal - coupon_amount + delivery_fee);

        let mut doc = self.load().await?;
        doc.order_seq += 1;
        let id = format!(
            "WO{}{}",
            Local::now().format("%Y%m%d"),
            10_000 + doc.order_seq
        );

        let now = now_millis();
        let first_item_type = items[0].item_type;
        let first_item_name = items[0].name.clone();
        let order = Order {
            id: id.clone(),
            user_id: self.user_id.clone(),
            item_type: first_item_type,
            item_name: first_item_name,
            items,
            subtotal,
            discount_amount,
            coupon_amount,
            delivery_fee,
            total_amount,
            address: Some(delivery_address),
            notes,
            status: OrderStatus::Pending,
            status_history: vec![StatusHistoryEntry {
                status: OrderStatus::Pending,
                timestamp: now,
                note: Some("order created, awaiting payment".to_string()),
            }],
            can_cancel: true,
            can_refund: false,
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
            created_at: now,
            updated_at: now,
        };

        // Newest first
        doc.orders.insert(0, order.clone());
        self.persist(&mut doc).await?;
        tracing::info!(order_id = %id, total = total_amount, "order created");
        Ok(order)
    }

    // ========== Transitions ==========

    /// Pending → Paid. Records the payment method and (simulated)
    /// transaction; cancellation closes, refund opens.
    pub async fn pay_order(
        &self,
        order_id: &str,
        method: PaymentMethod,
        transaction_id: Option<String>,
    ) -> AppResult<Order> {
        self.with_order(order_id, |order| {
            if order.status != OrderStatus::Pending {
                return Err(AppError::invalid_state(format!(
                    "cannot pay an order in status {}",
                    order.status.label()
                )));
            }
            order.payment_method = Some(method);
            order.payment_time = Some(now_millis());
            order.transaction_id = transaction_id;
            order.can_cancel = false;
            order.can_refund = true;
            apply_transition(order, OrderStatus::Paid, Some("payment received".to_string()));
            Ok(())
        })
        .await
    }

    /// Pending → Cancelled, guarded by `can_cancel`
    pub async fn cancel_order(&self, order_id: &str, reason: Option<String>) -> AppResult<Order> {
        self.with_order(order_id, |order| {
            if !order.can_cancel {
                return Err(AppError::invalid_state(format!(
                    "order in status {} can no longer be cancelled",
                    order.status.label()
                )));
            }
            order.cancel_reason = reason.clone();
            order.can_cancel = false;
            order.can_refund = false;
            apply_transition(
                order,
                OrderStatus::Cancelled,
                reason.or_else(|| Some("order cancelled".to_string())),
            );
            Ok(())
        })
        .await
    }

    /// Paid → Processing
    pub async fn start_processing(&self, order_id: &str) -> AppResult<Order> {
        self.with_order(order_id, |order| {
            if order.status != OrderStatus::Paid {
                return Err(AppError::invalid_state(format!(
                    "cannot start processing an order in status {}",
                    order.status.label()
                )));
            }
            apply_transition(
                order,
                OrderStatus::Processing,
                Some("order is being prepared".to_string()),
            );
            Ok(())
        })
        .await
    }

    /// Paid/Processing → Shipping. Sets the tracking number and optional
    /// delivery estimate.
    pub async fn update_delivery_info(
        &self,
        order_id: &str,
        tracking_number: String,
        estimated_delivery: Option<String>,
    ) -> AppResult<Order> {
        self.with_order(order_id, |order| {
            if !matches!(order.status, OrderStatus::Paid | OrderStatus::Processing) {
                return Err(AppError::invalid_state(format!(
                    "cannot ship an order in status {}",
                    order.status.label()
                )));
            }
            order.tracking_number = Some(tracking_number.clone());
            order.estimated_delivery = estimated_delivery;
            apply_transition(
                order,
                OrderStatus::Shipping,
                Some(format!("shipped, tracking {tracking_number}")),
            );
            Ok(())
        })
        .await
    }

    /// Shipping → Delivered
    pub async fn confirm_delivery(&self, order_id: &str) -> AppResult<Order> {
        self.with_order(order_id, |order| {
            if order.status != OrderStatus::Shipping {
                return Err(AppError::invalid_state(format!(
                    "cannot confirm delivery for an order in status {}",
                    order.status.label()
                )));
            }
            order.delivered_time = Some(now_millis());
            apply_transition(
                order,
                OrderStatus::Delivered,
                Some("package delivered".to_string()),
            );
            Ok(())
        })
        .await
    }

    /// Paid/Processing/Shipping/Delivered → Refunded, guarded by
    /// `can_refund`. The refund amount may not exceed the order total.
    pub async fn request_refund(
        &self,
        order_id: &str,
        amount: f64,
        reason: String,
    ) -> AppResult<Order> {
        self.with_order(order_id, |order| {
            if !order.can_refund {
                return Err(AppError::invalid_state(format!(
                    "order in status {} is not refundable",
                    order.status.label()
                )));
            }
            money::validate_charge(amount, "refund amount")?;
            if amount <= 0.0 {
                return Err(AppError::validation("refund amount must be positive"));
            }
            if amount > order.total_amount {
                return Err(AppError::validation(format!(
                    "refund amount ({amount}) exceeds order total ({})",
                    order.total_amount
                )));
            }
            order.refund_amount = Some(amount);
            order.refund_reason = Some(reason.clone());
            order.refund_time = Some(now_millis());
            order.can_refund = false;
            order.can_cancel = false;
            apply_transition(order, OrderStatus::Refunded, Some(reason));
            Ok(())
        })
        .await
    }

    /// Delivered → Completed, triggered by review submission
    pub async fn mark_order_reviewed(&self, order_id: &str, review_id: String) -> AppResult<Order> {
        self.with_order(order_id, |order| {
            if order.status != OrderStatus::Delivered {
                return Err(AppError::invalid_state(format!(
                    "cannot review an order in status {}",
                    order.status.label()
                )));
            }
            order.is_reviewed = true;
            order.review_id = Some(review_id);
            order.can_refund = false;
            apply_transition(
                order,
                OrderStatus::Completed,
                Some("review submitted".to_string()),
            );
            Ok(())
        })
        .await
    }

    // ========== Queries ==========

    /// All orders, newest first. Malformed stored records are skipped.
    pub async fn get_orders(&self) -> AppResult<Vec<Order>> {
        Ok(self.load().await?.orders)
    }

    /// One order by ID
    pub async fn get_order_by_id(&self, order_id: &str) -> AppResult<Order> {
        self.load()
            .await?
            .orders
            .into_iter()
            .find(|o| o.id == order_id)
            .ok_or_else(|| AppError::not_found("order", order_id))
    }

    /// All orders currently in `status`, newest first
    pub async fn get_orders_by_status(&self, status: OrderStatus) -> AppResult<Vec<Order>> {
        Ok(self
            .load()
            .await?
            .orders
            .into_iter()
            .filter(|o| o.status == status)
            .collect())
    }

    /// Number of orders awaiting payment
    pub async fn pending_order_count(&self) -> AppResult<usize> {
        Ok(self
            .load()
            .await?
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count())
    }

    /// Number of delivered-but-unreviewed orders
    pub async fn pending_review_count(&self) -> AppResult<usize> {
        Ok(self
            .load()
            .await?
            .orders
            .iter()
            .filter(|o| o.is_pending_review())
            .count())
    }
}
