//! Wire types for the Document Intelligence analyze operation and the
//! canonical field set this library guarantees to produce.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Body of a poll response: operation status plus the embedded result once
/// the operation has succeeded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOperation {
    /// Operation status string (`running`, `succeeded`, `failed`, ...).
    pub status: String,

    /// Present only on terminal success.
    #[serde(default)]
    pub analyze_result: Option<AnalyzeResult>,
}

/// The `analyzeResult` payload of a completed operation. Only the document
/// list is consumed; everything else the service returns is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default)]
    pub documents: Vec<AnalyzedDocument>,
}

/// One recognized document with its named fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedDocument {
    #[serde(default)]
    pub fields: HashMap<String, DocumentField>,
}

/// A single extracted field. At most one representation is populated; the
/// whole field may also be absent from the document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentField {
    /// Structured numeric value, authoritative when present.
    #[serde(default)]
    pub value_number: Option<f64>,

    /// Structured currency value.
    #[serde(default)]
    pub value_currency: Option<CurrencyValue>,

    /// Free-text content as read from the page.
    #[serde(default)]
    pub content: Option<String>,
}

/// Currency representation inside a field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyValue {
    #[serde(default)]
    pub amount: Option<f64>,
}

/// The four normalized payroll amounts. All keys are always present;
/// an absent or unparsable source field normalizes to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalFields {
    /// Gross amount before deductions.
    pub total_gross: i64,

    /// Total deductions.
    pub total_deduction: i64,

    /// Other additions.
    pub other_payment: i64,

    /// Net transfer amount.
    pub transfer_amount: i64,
}

impl CanonicalFields {
    /// True when every amount is zero, the shape an empty document list
    /// produces.
    pub fn is_zero(&self) -> bool {
        self.total_gross == 0
            && self.total_deduction == 0
            && self.other_payment == 0
            && self.transfer_amount == 0
    }
}
