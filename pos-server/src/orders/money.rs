//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use rust_decimal::prelude::*;
use shared::models::ChangeDenomination;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed payment amount
pub const MAX_PAYMENT_AMOUNT: f64 = 10_000_000.0;

/// Cash denominations, largest first (birr notes down to santim)
const CHANGE_DENOMINATIONS: [Decimal; 10] = [
    Decimal::from_parts(100, 0, 0, false, 0),
    Decimal::from_parts(50, 0, 0, false, 0),
    Decimal::from_parts(20, 0, 0, false, 0),
    Decimal::from_parts(10, 0, 0, false, 0),
    Decimal::from_parts(5, 0, 0, false, 0),
    Decimal::from_parts(1, 0, 0, false, 0),
    Decimal::from_parts(25, 0, 0, false, 2),
    Decimal::from_parts(10, 0, 0, false, 2),
    Decimal::from_parts(5, 0, 0, false, 2),
    Decimal::from_parts(1, 0, 0, false, 2),
];

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Validate that an amount is finite and non-negative
pub fn require_amount(value: f64, field_name: &str) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{} must be a finite number, got {}", field_name, value));
    }
    if value < 0.0 {
        return Err(format!("{} must be non-negative, got {}", field_name, value));
    }
    if value > MAX_PAYMENT_AMOUNT {
        return Err(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_PAYMENT_AMOUNT, value
        ));
    }
    Ok(())
}

/// `unit * qty + qty * Σ add-on prices`
pub fn line_subtotal(price_per_unit: f64, quantity: u32, add_on_prices: &[f64]) -> f64 {
    let qty = Decimal::from(quantity);
    let add_ons: Decimal = add_on_prices.iter().map(|p| to_decimal(*p)).sum();
    to_f64(to_decimal(price_per_unit) * qty + qty * add_ons)
}

/// Sum of line subtotals
pub fn sum(values: impl IntoIterator<Item = f64>) -> f64 {
    to_f64(values.into_iter().map(to_decimal).sum())
}

/// `amount × percent / 100`
pub fn percent_of(amount: f64, percent: u32) -> f64 {
    to_f64(to_decimal(amount) * Decimal::from(percent) / Decimal::ONE_HUNDRED)
}

/// `price × (1 − pct/100)`, rounded to cents
pub fn apply_discount(price: f64, discount_percentage: f64) -> f64 {
    let factor = Decimal::ONE - to_decimal(discount_percentage) / Decimal::ONE_HUNDRED;
    to_f64(to_decimal(price) * factor)
}

/// Check two amounts differ by less than [`MONEY_TOLERANCE`]
///
/// 差额正好一分视为不相等。
pub fn money_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() < MONEY_TOLERANCE
}

/// Check if `paid` covers `required` (no tolerance, short by a cent is short)
pub fn is_payment_sufficient(paid: f64, required: f64) -> bool {
    to_decimal(paid) >= to_decimal(required)
}

/// Greedy change over the fixed denominations, largest first
///
/// Exact for this denomination set; amounts finer than 0.01 are rounded first.
pub fn change_breakdown(amount: f64) -> Vec<ChangeDenomination> {
    let mut remaining = to_decimal(amount)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let mut breakdown = Vec::new();
    if remaining <= Decimal::ZERO {
        return breakdown;
    }
    for denomination in CHANGE_DENOMINATIONS {
        let count = (remaining / denomination).trunc();
        if count > Decimal::ZERO {
            remaining -= denomination * count;
            breakdown.push(ChangeDenomination {
                denomination: denomination.to_f64().unwrap_or_default(),
                count: count.to_u32().unwrap_or_default(),
            });
        }
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_subtotal_with_add_ons() {
        assert_eq!(line_subtotal(2.0, 3, &[]), 6.0);
        // 2 × 45 + 2 × (10 + 5.5)
        assert_eq!(line_subtotal(45.0, 2, &[10.0, 5.5]), 121.0);
        assert_eq!(line_subtotal(0.1, 3, &[0.2]), 0.9);
    }

    #[test]
    fn test_sum_avoids_float_drift() {
        assert_eq!(sum([0.1, 0.2]), 0.3);
        assert_eq!(sum([6.0, 5.0]), 11.0);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(20.0, 50), 10.0);
        assert_eq!(percent_of(33.33, 80), 26.66);
        assert_eq!(percent_of(11.0, 100), 11.0);
        assert_eq!(percent_of(11.0, 0), 0.0);
    }

    #[test]
    fn test_apply_discount() {
        assert_eq!(apply_discount(100.0, 10.0), 90.0);
        assert_eq!(apply_discount(45.0, 15.0), 38.25);
        assert_eq!(apply_discount(19.99, 0.0), 19.99);
    }

    #[test]
    fn test_money_tolerance() {
        assert!(money_eq(11.0, 11.0));
        assert!(money_eq(11.0, 10.995));
        assert!(!money_eq(11.0, 10.99));
        assert!(!money_eq(11.0, 11.01));
        assert!(!money_eq(11.0, 10.98));
        assert!(is_payment_sufficient(11.0, 11.0));
        assert!(is_payment_sufficient(15.0, 11.0));
        assert!(!is_payment_sufficient(10.99, 11.0));
        assert!(!is_payment_sufficient(10.999, 11.0));
    }

    #[test]
    fn test_change_four_units() {
        let breakdown = change_breakdown(4.0);
        assert_eq!(
            breakdown,
            vec![ChangeDenomination {
                denomination: 1.0,
                count: 4
            }]
        );
    }

    #[test]
    fn test_change_mixed() {
        // 186.41 = 100 + 50 + 20 + 10 + 5 + 1 + 0.25 + 0.10 + 0.05 + 0.01
        let breakdown = change_breakdown(186.41);
        let counts: Vec<(f64, u32)> = breakdown
            .iter()
            .map(|d| (d.denomination, d.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                (100.0, 1),
                (50.0, 1),
                (20.0, 1),
                (10.0, 1),
                (5.0, 1),
                (1.0, 1),
                (0.25, 1),
                (0.1, 1),
                (0.05, 1),
                (0.01, 1),
            ]
        );
    }

    #[test]
    fn test_change_sums_back() {
        for amount in [0.99, 3.3, 47.85, 250.07] {
            let total: Decimal = change_breakdown(amount)
                .iter()
                .map(|d| to_decimal(d.denomination) * Decimal::from(d.count))
                .sum();
            assert_eq!(to_f64(total), amount);
        }
    }

    #[test]
    fn test_no_change() {
        assert!(change_breakdown(0.0).is_empty());
        assert!(change_breakdown(-1.0).is_empty());
    }

    #[test]
    fn test_require_amount() {
        assert!(require_amount(10.0, "amount").is_ok());
        assert!(require_amount(f64::NAN, "amount").is_err());
        assert!(require_amount(-0.01, "amount").is_err());
    }
}
