//! Transfer consistency validation over exact decimals.
//!
//! The reconciliation invariant is `gross - deduction + other = transfer`,
//! compared exactly with no tolerance. Conversion here is deliberately
//! strict, in contrast with the lenient [`crate::analyze::normalize`] path:
//! the normalizer degrades unreadable text to zero during extraction, while
//! this module reports a dedicated invalid-number result when an amount
//! cannot be re-parsed. A mismatch is a normal business outcome, never an
//! error.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::fields::CanonicalFields;

/// An amount as presented to the validator. Canonical fields arrive as
/// integers; the `Text` form exists for callers holding raw, unnormalized
/// values and is the only fallible conversion path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountValue {
    Int(i64),
    Text(String),
}

impl From<i64> for AmountValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for AmountValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// The four amounts entering the reconciliation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAmounts {
    pub total_gross: AmountValue,
    pub total_deduction: AmountValue,
    pub other_payment: AmountValue,
    pub transfer_amount: AmountValue,
}

impl From<&CanonicalFields> for RawAmounts {
    fn from(fields: &CanonicalFields) -> Self {
        Self {
            total_gross: fields.total_gross.into(),
            total_deduction: fields.total_deduction.into(),
            other_payment: fields.other_payment.into(),
            transfer_amount: fields.transfer_amount.into(),
        }
    }
}

/// Outcome of the reconciliation check. Exactly one shape applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConsistencyResult {
    /// The numeric path: all four amounts converted, the invariant was
    /// evaluated. `diff` is zero iff `ok`.
    Checked {
        ok: bool,
        expected: Decimal,
        transfer: Decimal,
        diff: Decimal,
    },
    /// The failure path: an amount could not be converted to a number.
    InvalidNumber { ok: bool, error: String, detail: String },
}

impl ConsistencyResult {
    fn invalid_number(detail: String) -> Self {
        Self::InvalidNumber {
            ok: false,
            error: "invalid_number_format".to_string(),
            detail,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Checked { ok: true, .. })
    }
}

/// Check the canonical fields against the reconciliation invariant.
pub fn check_transfer_consistency(fields: &CanonicalFields) -> ConsistencyResult {
    check_raw_amounts(&RawAmounts::from(fields))
}

/// Check raw amounts, converting each to an exact zero-scale decimal first.
/// The first conversion failure short-circuits into the invalid-number
/// shape; nothing is partially evaluated.
pub fn check_raw_amounts(amounts: &RawAmounts) -> ConsistencyResult {
    let (gross, deduction, other, transfer) = match (
        exact_amount(&amounts.total_gross),
        exact_amount(&amounts.total_deduction),
        exact_amount(&amounts.other_payment),
        exact_amount(&amounts.transfer_amount),
    ) {
        (Ok(g), Ok(d), Ok(o), Ok(t)) => (g, d, o, t),
        (Err(detail), ..)
        | (_, Err(detail), ..)
        | (_, _, Err(detail), _)
        | (_, _, _, Err(detail)) => return ConsistencyResult::invalid_number(detail),
    };

    let expected = gross - deduction + other;
    ConsistencyResult::Checked {
        ok: expected == transfer,
        expected,
        transfer,
        diff: expected - transfer,
    }
}

/// Strict conversion to a whole-valued decimal, half-up rounding. Integral
/// inputs cannot fail; the rounding only matters for future non-integer
/// callers of the `Text` path.
fn exact_amount(value: &AmountValue) -> Result<Decimal, String> {
    let decimal = match value {
        AmountValue::Int(n) => Decimal::from(*n),
        AmountValue::Text(s) => Decimal::from_str(s.trim())
            .map_err(|e| format!("cannot convert {s:?} to a number: {e}"))?,
    };
    Ok(decimal.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(gross: i64, deduction: i64, other: i64, transfer: i64) -> CanonicalFields {
        CanonicalFields {
            total_gross: gross,
            total_deduction: deduction,
            other_payment: other,
            transfer_amount: transfer,
        }
    }

    #[test]
    fn test_consistent_fields_pass() {
        let result = check_transfer_consistency(&fields(300_000, 50_000, 0, 250_000));
        assert_eq!(
            result,
            ConsistencyResult::Checked {
                ok: true,
                expected: Decimal::from(250_000),
                transfer: Decimal::from(250_000),
                diff: Decimal::ZERO,
            }
        );
    }

    #[test]
    fn test_mismatch_reports_diff() {
        let result = check_transfer_consistency(&fields(300_000, 50_000, 0, 240_000));
        assert_eq!(
            result,
            ConsistencyResult::Checked {
                ok: false,
                expected: Decimal::from(250_000),
                transfer: Decimal::from(240_000),
                diff: Decimal::from(10_000),
            }
        );
    }

    #[test]
    fn test_other_payment_enters_the_sum() {
        let result = check_transfer_consistency(&fields(300_000, 50_000, 5_000, 255_000));
        assert!(result.is_ok());
    }

    #[test]
    fn test_unconvertible_text_yields_invalid_number_shape() {
        let amounts = RawAmounts {
            total_gross: "1,2a".into(),
            total_deduction: 0.into(),
            other_payment: 0.into(),
            transfer_amount: 0.into(),
        };
        match check_raw_amounts(&amounts) {
            ConsistencyResult::InvalidNumber { ok, error, detail } => {
                assert!(!ok);
                assert_eq!(error, "invalid_number_format");
                assert!(detail.contains("1,2a"));
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn test_text_amounts_round_half_up() {
        let amounts = RawAmounts {
            total_gross: "100.5".into(),
            total_deduction: 0.into(),
            other_payment: 0.into(),
            transfer_amount: 101.into(),
        };
        assert!(check_raw_amounts(&amounts).is_ok());
    }

    #[test]
    fn test_check_is_pure() {
        let input = fields(300_000, 50_000, 0, 250_000);
        assert_eq!(
            check_transfer_consistency(&input),
            check_transfer_consistency(&input)
        );
    }
}
