//! Pricing calculator - Pure price composition, no I/O and no shared state.
//!
//! Composes the tour rate, product line items, and promo discount into a final total.
//! Fully determined by its inputs, which makes it the easiest component to unit-test
//! exhaustively. Monetary values are rounded to cents at the end of the computation.

use crate::entities::promo_code;

/// A product line item snapshot priced into a booking or amendment.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductLine {
    /// Product name at the time of booking
    pub name: String,
    /// Unit price at the time of booking
    pub unit_price: f64,
    /// Number of units
    pub quantity: i32,
}

/// Result of pricing one booking or amendment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    /// Rate x slots plus product lines, before discount
    pub subtotal: f64,
    /// Discount applied from a promo code, zero when none
    pub discount: f64,
    /// Final amount, floored at zero
    pub total: f64,
}

/// Rounds a dollar amount to cents.
fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Prices a booking: `rate * slots + sum(unit_price * quantity) - discount`,
/// floored at zero.
///
/// The promo discount is computed over the full subtotal. A fixed-amount discount
/// larger than the subtotal clamps the total to zero rather than going negative.
#[must_use]
pub fn quote(
    rate: f64,
    slots: i32,
    products: &[ProductLine],
    promo: Option<&promo_code::Model>,
) -> Quote {
    let product_total: f64 = products
        .iter()
        .map(|line| line.unit_price * f64::from(line.quantity))
        .sum();

    let subtotal = rate * f64::from(slots) + product_total;
    let discount = promo.map_or(0.0, |p| crate::core::promo::discount_amount(p, subtotal));
    let total = (subtotal - discount).max(0.0);

    Quote {
        subtotal: round_cents(subtotal),
        discount: round_cents(discount),
        total: round_cents(total),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::promo_code::DiscountType;

    fn percentage_promo(value: f64) -> promo_code::Model {
        promo_code::Model {
            id: 1,
            code: "TEST".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: value,
            expires_at: None,
            max_uses: None,
            times_used: 0,
            is_active: true,
        }
    }

    fn fixed_promo(value: f64) -> promo_code::Model {
        promo_code::Model {
            discount_type: DiscountType::FixedAmount,
            discount_value: value,
            ..percentage_promo(0.0)
        }
    }

    #[test]
    fn test_quote_without_products_or_promo() {
        let q = quote(50.0, 3, &[], None);
        assert_eq!(q.subtotal, 150.0);
        assert_eq!(q.discount, 0.0);
        assert_eq!(q.total, 150.0);
    }

    #[test]
    fn test_quote_matches_worked_example() {
        // rate=50, slots=3, products=[{price:10, qty:2}], promo=10% =>
        // subtotal 170, discount 17, total 153.00
        let products = vec![ProductLine {
            name: "Photo Package".to_string(),
            unit_price: 10.0,
            quantity: 2,
        }];
        let promo = percentage_promo(10.0);

        let q = quote(50.0, 3, &products, Some(&promo));
        assert_eq!(q.subtotal, 170.0);
        assert_eq!(q.discount, 17.0);
        assert_eq!(q.total, 153.0);
    }

    #[test]
    fn test_quote_is_deterministic() {
        let products = vec![ProductLine {
            name: "Lunch".to_string(),
            unit_price: 12.5,
            quantity: 3,
        }];
        let promo = fixed_promo(20.0);

        let first = quote(42.0, 2, &products, Some(&promo));
        let second = quote(42.0, 2, &products, Some(&promo));
        assert_eq!(first, second);
    }

    #[test]
    fn test_fixed_discount_never_drives_total_negative() {
        let promo = fixed_promo(500.0);
        let q = quote(50.0, 1, &[], Some(&promo));
        assert_eq!(q.subtotal, 50.0);
        assert_eq!(q.discount, 50.0);
        assert_eq!(q.total, 0.0);
    }

    #[test]
    fn test_quote_rounds_to_cents() {
        // 3 slots at 33.333 => 99.999, which must settle on a cent boundary
        let q = quote(33.333, 3, &[], None);
        assert_eq!(q.total, 100.0);
    }
}
