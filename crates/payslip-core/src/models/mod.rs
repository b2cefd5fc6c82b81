//! Data models: analyze wire types, canonical fields, configuration, and the
//! persisted record.

pub mod config;
pub mod fields;
pub mod record;

pub use config::{AnalyzeConfig, IngestConfig, PayslipConfig, PollPolicy};
pub use fields::{AnalyzeOperation, AnalyzeResult, AnalyzedDocument, CanonicalFields, CurrencyValue, DocumentField};
pub use record::{PayType, PayrollRecord, RecordStatus};
