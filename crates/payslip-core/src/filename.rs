//! Payroll slip filename parsing.
//!
//! Expected shape: `YYYYMMDD_<title>_<uid>.pdf` where the title is
//! 支給明細書 (salary slip) or 賞与明細書 (bonus slip), e.g.
//! `20251010_支給明細書_0121.pdf`. Anything else falls back to an
//! `unknown` user in the current UTC period; parsing never fails, so an
//! oddly named blob still produces a traceable record.

use chrono::{Datelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::record::PayType;

lazy_static! {
    static ref PAYSLIP_FILENAME: Regex = Regex::new(
        r"^(?P<date>\d{8})_(?P<title>支給明細書|賞与明細書)_(?P<uid>\d+)\.pdf$"
    )
    .unwrap();
}

/// Identity and period carried by a slip filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    /// User identifier with leading zeros preserved.
    pub user_id: String,
    pub year: u16,
    pub month: u8,
    pub pay_type: PayType,
}

/// Parse a slip filename or path into its identity, period, and pay type.
pub fn parse_payslip_filename(name: &str) -> ParsedFilename {
    let base = name.rsplit('/').next().unwrap_or(name);

    if let Some(caps) = PAYSLIP_FILENAME.captures(base) {
        let date = &caps["date"];
        // The regex guarantees eight ASCII digits.
        let year: u16 = date[0..4].parse().unwrap_or(0);
        let month: u8 = date[4..6].parse().unwrap_or(0);
        let pay_type = if caps["title"].contains("賞与") {
            PayType::Bonus
        } else {
            PayType::Salary
        };
        return ParsedFilename {
            user_id: caps["uid"].to_string(),
            year,
            month,
            pay_type,
        };
    }

    let now = Utc::now();
    ParsedFilename {
        user_id: "unknown".to_string(),
        year: now.year() as u16,
        month: now.month() as u8,
        pay_type: PayType::Salary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_salary_slip_filename() {
        let parsed = parse_payslip_filename("20251010_支給明細書_0121.pdf");
        assert_eq!(
            parsed,
            ParsedFilename {
                user_id: "0121".to_string(),
                year: 2025,
                month: 10,
                pay_type: PayType::Salary,
            }
        );
    }

    #[test]
    fn test_bonus_slip_filename() {
        let parsed = parse_payslip_filename("20250331_賞与明細書_0121.pdf");
        assert_eq!(parsed.pay_type, PayType::Bonus);
        assert_eq!(parsed.year, 2025);
        assert_eq!(parsed.month, 3);
    }

    #[test]
    fn test_leading_zeros_preserved() {
        let parsed = parse_payslip_filename("20250101_支給明細書_0007.pdf");
        assert_eq!(parsed.user_id, "0007");
    }

    #[test]
    fn test_path_prefix_is_stripped() {
        let parsed = parse_payslip_filename("payslips/incoming/20251010_支給明細書_0121.pdf");
        assert_eq!(parsed.user_id, "0121");
    }

    #[test]
    fn test_unexpected_name_falls_back() {
        let parsed = parse_payslip_filename("notes.txt");
        let now = Utc::now();
        assert_eq!(parsed.user_id, "unknown");
        assert_eq!(parsed.pay_type, PayType::Salary);
        assert_eq!(parsed.year, now.year() as u16);
    }
}
