//! Core library for payroll slip ingestion.
//!
//! This crate provides:
//! - Document Intelligence analyze client (submission, bounded polling,
//!   field normalization)
//! - Transfer consistency validation over exact decimals
//! - Payroll slip filename parsing
//! - Record storage with merge-upsert semantics
//! - The end-to-end ingest pipeline

pub mod analyze;
pub mod error;
pub mod filename;
pub mod ingest;
pub mod models;
pub mod store;
pub mod validate;

pub use analyze::{AnalyzeSource, AnalyzeTransport, HttpTransport, OperationPoller, PayslipAnalyzer};
pub use error::{AnalyzeError, PayslipError, Result, StoreError};
pub use filename::{parse_payslip_filename, ParsedFilename};
pub use ingest::{IngestOutcome, Ingestor};
pub use models::{AnalyzeConfig, CanonicalFields, PayType, PayrollRecord, PayslipConfig, PollPolicy, RecordStatus};
pub use store::{JsonFileStore, MemoryStore, PayrollStore};
pub use validate::{check_transfer_consistency, AmountValue, ConsistencyResult, RawAmounts};
