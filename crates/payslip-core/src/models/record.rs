//! Persisted payroll record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fields::CanonicalFields;

/// Kind of payment a slip documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayType {
    /// Monthly salary slip (支給明細書).
    Salary,
    /// Bonus slip (賞与明細書).
    Bonus,
}

impl Default for PayType {
    fn default() -> Self {
        Self::Salary
    }
}

impl PayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Bonus => "bonus",
        }
    }
}

/// Processing status written with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Extraction ran and the reconciliation passed (or was disabled).
    Parsed,
    /// Extraction ran but the reconciliation found a difference.
    Mismatch,
    /// The strict re-parse inside the validator failed.
    InvalidNumber,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::Mismatch => "mismatch",
            Self::InvalidNumber => "invalid_number",
        }
    }
}

/// One flat payroll record, merge-upserted per (user, period, pay type).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRecord {
    /// Logical user identifier. Partition key; leading zeros preserved.
    pub user_id: String,

    /// Payroll year.
    pub year: u16,

    /// Payroll month (1-12).
    pub month: u8,

    /// Kind of payment.
    pub pay_type: PayType,

    /// Source blob path for traceability.
    pub source_blob_path: String,

    /// Original filename.
    pub filename: String,

    /// Ingestion timestamp, UTC.
    pub ingested_at_utc: DateTime<Utc>,

    /// Processing status.
    pub status: RecordStatus,

    pub total_gross: i64,
    pub total_deduction: i64,
    pub other_payment: i64,
    pub transfer_amount: i64,
}

impl PayrollRecord {
    /// Row key within a user's partition: `"{year:04}-{month:02}:{pay_type}"`.
    pub fn row_key(&self) -> String {
        format!(
            "{:04}-{:02}:{}",
            self.year,
            self.month,
            self.pay_type.as_str()
        )
    }

    /// Copy the four canonical amounts into the record.
    pub fn with_amounts(mut self, fields: &CanonicalFields) -> Self {
        self.total_gross = fields.total_gross;
        self.total_deduction = fields.total_deduction;
        self.other_payment = fields.other_payment;
        self.transfer_amount = fields.transfer_amount;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: u16, month: u8, pay_type: PayType) -> PayrollRecord {
        PayrollRecord {
            user_id: "0121".to_string(),
            year,
            month,
            pay_type,
            source_blob_path: "payslips/in.pdf".to_string(),
            filename: "in.pdf".to_string(),
            ingested_at_utc: Utc::now(),
            status: RecordStatus::Parsed,
            total_gross: 0,
            total_deduction: 0,
            other_payment: 0,
            transfer_amount: 0,
        }
    }

    #[test]
    fn test_row_key_zero_pads_period() {
        assert_eq!(record(2025, 3, PayType::Salary).row_key(), "2025-03:salary");
        assert_eq!(record(2025, 12, PayType::Bonus).row_key(), "2025-12:bonus");
    }
}
