//! Lenient amount normalization for extracted document fields.
//!
//! Structured representations are trusted over text reconstruction: the
//! service marks `valueNumber` and `valueCurrency` authoritative when it can
//! produce them, so `content` is only a fallback. This normalizer never
//! fails; anything unreadable becomes zero. The strict counterpart lives in
//! [`crate::validate`].

use crate::models::fields::DocumentField;

/// Convert an extracted field into a whole amount (e.g. JPY).
///
/// Priority cascade:
/// 1. `valueNumber`, truncated toward zero;
/// 2. `valueCurrency.amount`, truncated toward zero;
/// 3. sanitized `content` (grouping separators removed, full-width digits
///    folded to ASCII) parsed as a real number and truncated.
///
/// An absent field or a parse failure yields `0`.
pub fn normalize_amount(field: Option<&DocumentField>) -> i64 {
    let Some(field) = field else {
        return 0;
    };

    if let Some(n) = field.value_number {
        return truncate(n);
    }

    if let Some(amount) = field.value_currency.as_ref().and_then(|c| c.amount) {
        return truncate(amount);
    }

    if let Some(content) = field.content.as_deref() {
        let sanitized = sanitize_numeric_text(content);
        if let Ok(n) = sanitized.parse::<f64>() {
            return truncate(n);
        }
    }

    0
}

fn truncate(n: f64) -> i64 {
    n.trunc() as i64
}

/// Strip whitespace and grouping separators, fold full-width digits and the
/// full-width minus sign to their ASCII equivalents.
fn sanitize_numeric_text(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| *c != ',' && *c != '，')
        .map(|c| match c {
            '０'..='９' => {
                // Full-width digits are a contiguous block offset from ASCII.
                char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c)
            }
            '－' => '-',
            other => other,
        })
        .collect()
}
