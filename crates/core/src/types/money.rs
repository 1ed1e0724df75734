//! Checkout arithmetic using decimal amounts.
//!
//! All amounts are in the store currency's standard unit (dollars, not
//! cents) and rounded to two decimal places.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Largest amount a stored price or total may hold (`NUMERIC(12, 2)`).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Why an amount cannot be stored.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    #[error("must have at most 2 decimal places")]
    TooPrecise,
    #[error("must be at most {MAX_AMOUNT}")]
    TooLarge,
}

/// Check `amount` survives a `NUMERIC(12, 2)` column unchanged.
///
/// # Errors
///
/// `AmountError::TooPrecise` for sub-cent digits, `AmountError::TooLarge`
/// beyond [`MAX_AMOUNT`] in either direction.
pub fn check_storable(amount: Decimal) -> Result<(), AmountError> {
    if amount.normalize().scale() > 2 {
        return Err(AmountError::TooPrecise);
    }
    if amount.abs() > MAX_AMOUNT {
        return Err(AmountError::TooLarge);
    }
    Ok(())
}

/// Shipping fee and tax rate applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutRates {
    /// Flat shipping fee charged on every non-empty order.
    pub shipping_fee: Decimal,
    /// Tax rate applied to the subtotal (0.10 = 10%).
    pub tax_rate: Decimal,
}

impl Default for CheckoutRates {
    fn default() -> Self {
        Self {
            shipping_fee: Decimal::new(499, 2),
            tax_rate: Decimal::new(10, 2),
        }
    }
}

/// Order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Compute totals for a subtotal.
    ///
    /// An empty order (zero subtotal) is not charged shipping.
    ///
    /// ```
    /// use bazaar_core::{CheckoutRates, OrderTotals};
    /// use rust_decimal::Decimal;
    ///
    /// let totals = OrderTotals::compute(Decimal::new(2000, 2), &CheckoutRates::default());
    /// assert_eq!(totals.total, Decimal::new(2699, 2));
    /// ```
    #[must_use]
    pub fn compute(subtotal: Decimal, rates: &CheckoutRates) -> Self {
        let subtotal = round2(subtotal);
        let shipping = if subtotal.is_zero() {
            Decimal::ZERO
        } else {
            round2(rates.shipping_fee)
        };
        let tax = round2(subtotal * rates.tax_rate);

        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    /// Whether every component fits the order columns.
    ///
    /// Shipping and tax are non-negative, so the total bounds the rest.
    #[must_use]
    pub fn is_storable(&self) -> bool {
        check_storable(self.total).is_ok()
    }

    /// Sum line totals and compute the order totals.
    #[must_use]
    pub fn from_lines<I>(lines: I, rates: &CheckoutRates) -> Self
    where
        I: IntoIterator<Item = (Decimal, i32)>,
    {
        let subtotal = lines
            .into_iter()
            .map(|(unit_price, quantity)| line_total(unit_price, quantity))
            .sum();
        Self::compute(subtotal, rates)
    }
}

/// Price charged per unit: the sale price when it undercuts the list price.
#[must_use]
pub fn effective_unit_price(price: Decimal, sale_price: Option<Decimal>) -> Decimal {
    match sale_price {
        Some(sale) if sale > Decimal::ZERO && sale < price => sale,
        _ => price,
    }
}

/// Price of `quantity` units.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    round2(unit_price * Decimal::from(quantity))
}

/// Convert an amount to minor units (cents) for payment providers.
///
/// Returns `None` if the amount does not fit in an `i64`.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (round2(amount) * Decimal::ONE_HUNDRED).to_i64()
}

fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dollars(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_two_units_at_ten_dollars() {
        // 2 x $10 = $20; + $4.99 shipping; + 10% tax ($2.00) = $26.99
        let totals = OrderTotals::from_lines([(dollars(1000), 2)], &CheckoutRates::default());
        assert_eq!(totals.subtotal, dollars(2000));
        assert_eq!(totals.shipping, dollars(499));
        assert_eq!(totals.tax, dollars(200));
        assert_eq!(totals.total, dollars(2699));
    }

    #[test]
    fn test_empty_order_has_no_shipping() {
        let totals = OrderTotals::from_lines(Vec::<(Decimal, i32)>::new(), &CheckoutRates::default());
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        // 10% of $0.05 is $0.005, which rounds to $0.01
        let totals = OrderTotals::compute(dollars(5), &CheckoutRates::default());
        assert_eq!(totals.tax, dollars(1));
    }

    #[test]
    fn test_custom_rates() {
        let rates = CheckoutRates {
            shipping_fee: Decimal::ZERO,
            tax_rate: Decimal::new(825, 4),
        };
        let totals = OrderTotals::compute(dollars(10_000), &rates);
        assert_eq!(totals.tax, dollars(825));
        assert_eq!(totals.total, dollars(10_825));
    }

    #[test]
    fn test_effective_unit_price_prefers_lower_sale_price() {
        assert_eq!(effective_unit_price(dollars(1000), Some(dollars(800))), dollars(800));
        assert_eq!(effective_unit_price(dollars(1000), None), dollars(1000));
    }

    #[test]
    fn test_effective_unit_price_ignores_higher_or_zero_sale_price() {
        assert_eq!(effective_unit_price(dollars(1000), Some(dollars(1200))), dollars(1000));
        assert_eq!(effective_unit_price(dollars(1000), Some(Decimal::ZERO)), dollars(1000));
    }

    #[test]
    fn test_max_amount_is_largest_numeric_12_2() {
        assert_eq!(MAX_AMOUNT, dollars(999_999_999_999));
        assert_eq!(MAX_AMOUNT.to_string(), "9999999999.99");
    }

    #[test]
    fn test_check_storable_precision() {
        assert_eq!(check_storable(Decimal::new(1, 3)), Err(AmountError::TooPrecise));
        assert_eq!(check_storable(Decimal::new(12_345, 3)), Err(AmountError::TooPrecise));
        // Trailing zeros are not extra precision
        assert_eq!(check_storable(Decimal::new(1_500, 3)), Ok(()));
        assert_eq!(check_storable(dollars(1)), Ok(()));
    }

    #[test]
    fn test_check_storable_magnitude() {
        assert_eq!(check_storable(MAX_AMOUNT), Ok(()));
        assert_eq!(
            check_storable(MAX_AMOUNT + dollars(1)),
            Err(AmountError::TooLarge)
        );
        assert_eq!(
            check_storable(Decimal::new(99_999_999_999, 0)),
            Err(AmountError::TooLarge)
        );
    }

    #[test]
    fn test_totals_storable_bound_includes_quantity() {
        let rates = CheckoutRates::default();
        let near_max = dollars(500_000_000_000);
        assert!(OrderTotals::from_lines([(near_max, 1)], &rates).is_storable());
        // 2 x $5bn plus tax no longer fits
        assert!(!OrderTotals::from_lines([(near_max, 2)], &rates).is_storable());
        assert!(!OrderTotals::from_lines([(MAX_AMOUNT, i32::MAX)], &rates).is_storable());
    }

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(dollars(2699)), Some(2699));
        assert_eq!(to_minor_units(Decimal::new(10_005, 3)), Some(1001));
    }
}
