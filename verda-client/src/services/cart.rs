//! Cart aggregator
//!
//! Accumulates line items keyed by `(item_id, item_type)`. After every
//! mutation the totals are recomputed from the full line list and the whole
//! cart document is persisted in one write. If that write fails the error
//! propagates, but the cart value already returned to earlier callers may
//! disagree with the stored copy — there is no rollback across calls.

use crate::money;
use crate::store::{self, DocumentStore};
use shared::models::{Cart, CartItem, CartItemInput, CartItemPatch, ItemType, now_millis};
use shared::{AppError, AppResult};
use std::sync::Arc;

/// Cart service
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn DocumentStore>,
    key: String,
}

impl CartService {
    pub fn new(store: Arc<dyn DocumentStore>, user_id: &str) -> Self {
        Self {
            key: store::cart_key(user_id),
            store,
        }
    }

    /// Current cart (an absent document reads as an empty cart)
    pub async fn get_cart(&self) -> AppResult<Cart> {
        Ok(store::read_document(self.store.as_ref(), &self.key)
            .await?
            .unwrap_or_default())
    }

    async fn persist(&self, cart: &mut Cart) -> AppResult<()> {
        money::recalculate_cart(cart);
        cart.last_modified = now_millis();
        store::write_document(self.store.as_ref(), &self.key, cart).await
    }

    /// Add an item. A line with the same `(item_id, item_type)` is merged
    /// by incrementing its quantity; otherwise a new line is appended.
    pub async fn add_item(&self, input: CartItemInput) -> AppResult<Cart> {
        money::validate_cart_item(&input)?;
        let mut cart = self.get_cart().await?;

        match cart
            .items
            .iter_mut()
            .find(|line| line.item_id == input.item_id && line.item_type == input.item_type)
        {
            Some(line) => {
                line.quantity += input.quantity;
                money::validate_quantity(line.quantity)?;
            }
            None => cart.items.push(CartItem::from_input(input)),
        }

        self.persist(&mut cart).await?;
        tracing::debug!(lines = cart.items.len(), total = cart.total_amount, "cart item added");
        Ok(cart)
    }

    /// Replace a line's quantity. A quantity of zero or less removes the
    /// line entirely.
    pub async fn update_quantity(&self, cart_item_id: &str, quantity: i32) -> AppResult<Cart> {
        let mut cart = self.get_cart().await?;
        let idx = cart
            .items
            .iter()
            .position(|line| line.id == cart_item_id)
            .ok_or_else(|| AppError::not_found("cart item", cart_item_id))?;

        if quantity <= 0 {
            cart.items.remove(idx);
        } else {
            money::validate_quantity(quantity)?;
            cart.items[idx].quantity = quantity;
        }

        self.persist(&mut cart).await?;
        Ok(cart)
    }

    /// Remove a line
    pub async fn remove_item(&self, cart_item_id: &str) -> AppResult<Cart> {
        let mut cart = self.get_cart().await?;
        let idx = cart
            .items
            .iter()
            .position(|line| line.id == cart_item_id)
            .ok_or_else(|| AppError::not_found("cart item", cart_item_id))?;

        cart.items.remove(idx);
        self.persist(&mut cart).await?;
        Ok(cart)
    }

    /// Empty the cart
    pub async fn clear(&self) -> AppResult<Cart> {
        let mut cart = Cart::empty();
        self.persist(&mut cart).await?;
        Ok(cart)
    }

    /// Total units across all lines (badge count)
    pub async fn item_count(&self) -> AppResult<i32> {
        let cart = self.get_cart().await?;
        Ok(cart.items.iter().map(|line| line.quantity).sum())
    }

    /// Whether `(item_id, item_type)` already has a line
    pub async fn is_in_cart(&self, item_id: &str, item_type: ItemType) -> AppResult<bool> {
        let cart = self.get_cart().await?;
        Ok(cart.find_line(item_id, item_type).is_some())
    }

    /// All lines of one item type
    pub async fn items_by_type(&self, item_type: ItemType) -> AppResult<Vec<CartItem>> {
        let cart = self.get_cart().await?;
        Ok(cart
            .items
            .into_iter()
            .filter(|line| line.item_type == item_type)
            .collect())
    }

    /// Patch a line's metadata (name, image, price, cycle fields)
    pub async fn update_item_metadata(
        &self,
        cart_item_id: &str,
        patch: CartItemPatch,
    ) -> AppResult<Cart> {
        money::validate_patch(&patch)?;
        let mut cart = self.get_cart().await?;
        let line = cart
            .items
            .iter_mut()
            .find(|line| line.id == cart_item_id)
            .ok_or_else(|| AppError::not_found("cart item", cart_item_id))?;

        if let Some(name) = patch.name {
            line.name = name;
        }
        if let Some(image) = patch.image {
            line.image = Some(image);
        }
        if let Some(price) = patch.price {
            line.price = price;
        }
        if let Some(cycle) = patch.cycle {
            line.cycle = Some(cycle);
        }
        if let Some(cycle_discount) = patch.cycle_discount {
            line.cycle_discount = Some(cycle_discount);
        }

        self.persist(&mut cart).await?;
        Ok(cart)
    }
}
