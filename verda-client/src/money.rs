//! Money calculation utilities using rust_decimal for precision
//!
//! All monetary arithmetic goes through `Decimal` internally and is
//! converted back to `f64` rounded to 2 places for storage/serialization.
//! Cart totals are always recomputed from the full line list rather than
//! adjusted incrementally, so a missed update cannot let totals drift.

use rust_decimal::RoundingStrategy;
use rust_decimal::prelude::*;
use shared::models::{Cart, CartItem, CartItemInput, CartItemPatch};
use shared::{AppError, AppResult};

/// Rounding for monetary values (2 decimal places)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
const MAX_QUANTITY: i32 = 9999;

/// Convert an f64 to Decimal (non-finite values become zero)
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Convert a Decimal back to f64, rounded to 2 places (half away from zero)
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Round an f64 amount to 2 places via Decimal
pub fn round2(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Discounted line total: `price * qty * cycle_discount` (or `price * qty`
/// when no cycle discount exists)
pub fn line_total(price: f64, quantity: i32, cycle_discount: Option<f64>) -> f64 {
    let gross = to_decimal(price) * Decimal::from(quantity);
    match cycle_discount {
        Some(cd) => to_f64(gross * to_decimal(cd)),
        None => to_f64(gross),
    }
}

/// Per-line discount: `price * qty * (1 - cycle_discount)`, zero when the
/// line declares no cycle discount
pub fn line_discount(price: f64, quantity: i32, cycle_discount: Option<f64>) -> f64 {
    match cycle_discount {
        Some(cd) => {
            let gross = to_decimal(price) * Decimal::from(quantity);
            to_f64(gross * (Decimal::ONE - to_decimal(cd)))
        }
        None => 0.0,
    }
}

/// Recompute cart totals from the full line list
pub fn recalculate_cart(cart: &mut Cart) {
    let mut total = Decimal::ZERO;
    let mut discount = Decimal::ZERO;
    for line in &cart.items {
        total += to_decimal(line_total(line.price, line.quantity, line.cycle_discount));
        discount += to_decimal(line_discount(line.price, line.quantity, line.cycle_discount));
    }
    cart.total_amount = to_f64(total);
    cart.total_discount = to_f64(discount);
}

/// Validate that an f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a unit price
pub fn validate_price(price: f64) -> AppResult<()> {
    require_finite(price, "price")?;
    if price < 0.0 {
        return Err(AppError::validation(format!(
            "price must be non-negative, got {}",
            price
        )));
    }
    if price > MAX_PRICE {
        return Err(AppError::validation(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, price
        )));
    }
    Ok(())
}

/// Validate a line quantity
pub fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::validation(format!(
            "quantity must be positive, got {}",
            quantity
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

/// Validate a cycle-discount multiplier: must lie in (0, 1]
pub fn validate_cycle_discount(cycle_discount: f64) -> AppResult<()> {
    require_finite(cycle_discount, "cycle_discount")?;
    if !(cycle_discount > 0.0 && cycle_discount <= 1.0) {
        return Err(AppError::validation(format!(
            "cycle_discount must be in (0, 1], got {}",
            cycle_discount
        )));
    }
    Ok(())
}

/// Validate a non-negative charge (coupon amount, delivery fee)
pub fn validate_charge(value: f64, field_name: &str) -> AppResult<()> {
    require_finite(value, field_name)?;
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{} must be non-negative, got {}",
            field_name, value
        )));
    }
    if value > MAX_PRICE {
        return Err(AppError::validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_PRICE, value
        )));
    }
    Ok(())
}

/// Validate a CartItemInput before adding it to the cart
pub fn validate_cart_item(input: &CartItemInput) -> AppResult<()> {
    if input.item_id.trim().is_empty() {
        return Err(AppError::validation("item_id must not be empty"));
    }
    if input.name.trim().is_empty() {
        return Err(AppError::validation("item name must not be empty"));
    }
    validate_price(input.price)?;
    validate_quantity(input.quantity)?;
    if let Some(cd) = input.cycle_discount {
        validate_cycle_discount(cd)?;
    }
    Ok(())
}

/// Validate an existing cart line before it is snapshotted into an order
pub fn validate_cart_line(line: &CartItem) -> AppResult<()> {
    validate_price(line.price)?;
    validate_quantity(line.quantity)?;
    if let Some(cd) = line.cycle_discount {
        validate_cycle_discount(cd)?;
    }
    Ok(())
}

/// Validate a metadata patch for a cart line
pub fn validate_patch(patch: &CartItemPatch) -> AppResult<()> {
    if let Some(name) = &patch.name
        && name.trim().is_empty()
    {
        return Err(AppError::validation("item name must not be empty"));
    }
    if let Some(price) = patch.price {
        validate_price(price)?;
    }
    if let Some(cd) = patch.cycle_discount {
        validate_cycle_discount(cd)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ItemType;

    fn input(price: f64, quantity: i32, cycle_discount: Option<f64>) -> CartItemInput {
        CartItemInput {
            item_type: ItemType::Product,
            item_id: "prod-1".to_string(),
            name: "Herbal tea".to_string(),
            image: None,
            price,
            quantity,
            cycle: None,
            cycle_discount,
        }
    }

    #[test]
    fn test_line_total_without_discount() {
        assert_eq!(line_total(19.9, 3, None), 59.7);
        assert_eq!(line_discount(19.9, 3, None), 0.0);
    }

    #[test]
    fn test_line_total_with_cycle_discount() {
        // 100 x 2 at a 0.9 multiplier
        assert_eq!(line_total(100.0, 2, Some(0.9)), 180.0);
        assert_eq!(line_discount(100.0, 2, Some(0.9)), 20.0);
    }

    #[test]
    fn test_recalculate_cart_sums_all_lines() {
        let mut cart = Cart::empty();
        cart.items.push(CartItem::from_input(input(100.0, 2, Some(0.9))));
        cart.items.push(CartItem::from_input(input(19.9, 3, None)));

        recalculate_cart(&mut cart);

        assert_eq!(cart.total_amount, 180.0 + 59.7);
        assert_eq!(cart.total_discount, 20.0);
    }

    #[test]
    fn test_recalculate_empty_cart_zeroes_totals() {
        let mut cart = Cart::empty();
        cart.total_amount = 42.0;
        cart.total_discount = 7.0;
        recalculate_cart(&mut cart);
        assert_eq!(cart.total_amount, 0.0);
        assert_eq!(cart.total_discount, 0.0);
    }

    #[test]
    fn test_validate_rejects_non_finite_price() {
        assert!(validate_cart_item(&input(f64::NAN, 1, None)).is_err());
        assert!(validate_cart_item(&input(f64::INFINITY, 1, None)).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_quantity() {
        assert!(validate_cart_item(&input(10.0, 0, None)).is_err());
        assert!(validate_cart_item(&input(10.0, -2, None)).is_err());
        assert!(validate_cart_item(&input(10.0, 10_000, None)).is_err());
    }

    #[test]
    fn test_validate_cycle_discount_bounds() {
        assert!(validate_cart_item(&input(10.0, 1, Some(0.5))).is_ok());
        assert!(validate_cart_item(&input(10.0, 1, Some(1.0))).is_ok());
        assert!(validate_cart_item(&input(10.0, 1, Some(0.0))).is_err());
        assert!(validate_cart_item(&input(10.0, 1, Some(1.2))).is_err());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.006), 1.01);
        assert_eq!(round2(2.344), 2.34);
        assert_eq!(round2(-1.006), -1.01);
    }
}
