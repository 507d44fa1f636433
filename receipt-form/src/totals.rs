//! Receipt totals.
//!
//! `grand_total = max(0, subtotal + tax_amount - discount)` where
//! `subtotal = Σ quantity × unit_price` and
//! `tax_amount = subtotal × tax_rate / 100`. Results are rounded to cents.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::models::LineItem;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount: Decimal,
    pub grand_total: Decimal,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TotalsError {
    #[error("amounts are too large to total")]
    Overflow,
}

pub fn compute_totals(
    items: &[LineItem],
    tax_rate: Decimal,
    discount: Decimal,
) -> Result<Totals, TotalsError> {
    totals_from_lines(items.iter().map(LineItem::line_total), tax_rate, discount)
}

/// `None` line totals are lines whose own product overflowed.
pub(crate) fn totals_from_lines(
    line_totals: impl IntoIterator<Item = Option<Decimal>>,
    tax_rate: Decimal,
    discount: Decimal,
) -> Result<Totals, TotalsError> {
    let subtotal = line_totals
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line?))
        .ok_or(TotalsError::Overflow)?;
    let tax_amount = subtotal
        .checked_mul(tax_rate)
        .and_then(|taxed| taxed.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(TotalsError::Overflow)?;
    // A discount larger than subtotal + tax shows as zero rather than a credit.
    let grand_total = subtotal
        .checked_add(tax_amount)
        .and_then(|gross| gross.checked_sub(discount))
        .ok_or(TotalsError::Overflow)?
        .max(Decimal::ZERO);

    Ok(Totals {
        subtotal: to_cents(subtotal),
        tax_amount: to_cents(tax_amount),
        discount: to_cents(discount),
        grand_total: to_cents(grand_total),
    })
}

pub fn to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Lenient numeric parse for form inputs: empty or non-numeric text is zero.
pub fn parse_amount(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

/// Two-decimal display form, e.g. `17.00`.
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", to_cents(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: Decimal, unit_price: Decimal) -> LineItem {
        LineItem {
            name: "item".to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn tax_and_discount_apply_to_subtotal() {
        let totals = compute_totals(&[item(dec!(2), dec!(10))], dec!(10), dec!(5)).unwrap();
        assert_eq!(totals.subtotal, dec!(20.00));
        assert_eq!(totals.tax_amount, dec!(2.00));
        assert_eq!(totals.grand_total, dec!(17.00));
        assert_eq!(format_amount(totals.grand_total), "17.00");
    }

    #[test]
    fn discount_above_total_clamps_to_zero() {
        let totals = compute_totals(&[item(dec!(1), dec!(3))], Decimal::ZERO, dec!(10)).unwrap();
        assert_eq!(totals.grand_total, Decimal::ZERO);
        assert_eq!(format_amount(totals.grand_total), "0.00");
    }

    #[test]
    fn subtotal_is_sum_of_line_totals() {
        let items = vec![
            item(dec!(3), dec!(1.25)),
            item(dec!(1), dec!(99.99)),
            item(dec!(0.5), dec!(8)),
        ];
        let expected: Decimal = items.iter().map(|i| i.quantity * i.unit_price).sum();
        let totals = compute_totals(&items, Decimal::ZERO, Decimal::ZERO).unwrap();
        assert_eq!(totals.subtotal, to_cents(expected));
        assert_eq!(totals.grand_total, totals.subtotal);
    }

    #[test]
    fn grand_total_never_negative() {
        for discount in [dec!(0), dec!(1), dec!(50), dec!(1000)] {
            for price in [dec!(0), dec!(0.01), dec!(7.5), dec!(100)] {
                let totals = compute_totals(&[item(dec!(2), price)], dec!(8.25), discount).unwrap();
                assert!(totals.grand_total >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn empty_item_list_totals_zero() {
        let totals = compute_totals(&[], dec!(10), Decimal::ZERO).unwrap();
        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn oversized_line_is_an_error_not_a_panic() {
        let result = compute_totals(&[item(Decimal::MAX, dec!(2))], Decimal::ZERO, Decimal::ZERO);
        assert_eq!(result, Err(TotalsError::Overflow));
    }

    #[test]
    fn oversized_sum_or_tax_is_an_error() {
        let half = item(Decimal::MAX, Decimal::ONE);
        assert_eq!(
            compute_totals(&[half.clone(), half], Decimal::ZERO, Decimal::ZERO),
            Err(TotalsError::Overflow)
        );
        assert_eq!(
            compute_totals(&[item(dec!(1), Decimal::from(u64::MAX))], Decimal::MAX, Decimal::ZERO),
            Err(TotalsError::Overflow)
        );
        assert_eq!(
            compute_totals(&[item(dec!(1), Decimal::MAX)], Decimal::ZERO, Decimal::MIN),
            Err(TotalsError::Overflow)
        );
    }

    #[test]
    fn tax_rounds_half_away_from_zero() {
        // 0.05 * 10% = 0.005 -> 0.01
        let totals = compute_totals(&[item(dec!(1), dec!(0.05))], dec!(10), Decimal::ZERO).unwrap();
        assert_eq!(totals.tax_amount, dec!(0.01));
    }

    #[test]
    fn parse_amount_treats_garbage_as_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("   "), Decimal::ZERO);
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount(" 12.50 "), dec!(12.50));
        assert_eq!(parse_amount("1e2"), dec!(100));
    }
}
