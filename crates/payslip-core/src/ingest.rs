//! End-to-end ingestion of one payroll slip.
//!
//! One call processes one document: parse the blob name, analyze the bytes
//! remotely, reconcile the amounts, persist the record. Analyze failures
//! abort before anything is persisted; numeric and consistency findings are
//! recorded in the persisted status and returned for logging.

use chrono::Utc;
use tracing::{info, warn};

use crate::analyze::{AnalyzeTransport, HttpTransport, PayslipAnalyzer, Sleeper, ThreadSleeper};
use crate::error::{AnalyzeError, Result};
use crate::filename::parse_payslip_filename;
use crate::models::config::{AnalyzeConfig, IngestConfig, PayslipConfig};
use crate::models::record::{PayrollRecord, RecordStatus};
use crate::store::PayrollStore;
use crate::validate::{check_transfer_consistency, ConsistencyResult};

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// What one ingestion produced: the persisted record and, when validation
/// ran, the reconciliation diagnostics.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub record: PayrollRecord,
    pub consistency: Option<ConsistencyResult>,
}

/// Single parameterized ingest pipeline.
pub struct Ingestor<T = HttpTransport, S = ThreadSleeper> {
    analyzer: PayslipAnalyzer<T, S>,
    config: IngestConfig,
}

impl Ingestor {
    /// Build a pipeline against a live analyze endpoint.
    pub fn new(credentials: AnalyzeConfig, config: &PayslipConfig) -> std::result::Result<Self, AnalyzeError> {
        let analyzer = PayslipAnalyzer::new(credentials, config.poll.clone())?;
        Ok(Self {
            analyzer,
            config: config.ingest.clone(),
        })
    }
}

impl<T: AnalyzeTransport, S: Sleeper> Ingestor<T, S> {
    /// Assemble a pipeline from parts; the seam tests use to avoid the
    /// network.
    pub fn with_analyzer(analyzer: PayslipAnalyzer<T, S>, config: IngestConfig) -> Self {
        Self { analyzer, config }
    }

    /// Process one slip: `blob_path` is the logical path the trigger saw,
    /// `bytes` the raw PDF payload.
    pub fn ingest<P: PayrollStore>(
        &self,
        store: &mut P,
        blob_path: &str,
        bytes: Vec<u8>,
    ) -> Result<IngestOutcome> {
        let filename = blob_path.rsplit('/').next().unwrap_or(blob_path).to_string();
        let parsed = parse_payslip_filename(&filename);
        info!(
            blob_path,
            user_id = %parsed.user_id,
            year = parsed.year,
            month = parsed.month,
            pay_type = parsed.pay_type.as_str(),
            "ingesting payroll slip"
        );

        let fields = self.analyzer.analyze_bytes(bytes, PDF_CONTENT_TYPE)?;

        let (status, consistency) = if self.config.validate_before_persist {
            let result = check_transfer_consistency(&fields);
            let status = match &result {
                ConsistencyResult::Checked { ok: true, .. } => RecordStatus::Parsed,
                ConsistencyResult::Checked { diff, .. } => {
                    warn!(blob_path, %diff, "transfer amount does not reconcile");
                    RecordStatus::Mismatch
                }
                ConsistencyResult::InvalidNumber { detail, .. } => {
                    warn!(blob_path, detail = %detail, "amounts could not be re-parsed");
                    RecordStatus::InvalidNumber
                }
            };
            (status, Some(result))
        } else {
            (RecordStatus::Parsed, None)
        };

        let record = PayrollRecord {
            user_id: parsed.user_id,
            year: parsed.year,
            month: parsed.month,
            pay_type: parsed.pay_type,
            source_blob_path: blob_path.to_string(),
            filename,
            ingested_at_utc: Utc::now(),
            status,
            total_gross: 0,
            total_deduction: 0,
            other_payment: 0,
            transfer_amount: 0,
        }
        .with_amounts(&fields);

        store.upsert(&record)?;
        info!(
            user_id = %record.user_id,
            row_key = %record.row_key(),
            status = ?record.status,
            "payroll record persisted"
        );

        Ok(IngestOutcome {
            record,
            consistency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::poller::OperationPoller;
    use crate::analyze::transport::{AnalyzeSource, OperationHandle, PollResponse};
    use crate::models::config::PollPolicy;
    use crate::models::fields::AnalyzeOperation;
    use crate::models::record::PayType;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    struct ScriptedTransport {
        responses: RefCell<VecDeque<PollResponse>>,
    }

    impl ScriptedTransport {
        fn succeeding_with(body: &str) -> Self {
            let operation: AnalyzeOperation = serde_json::from_str(body).unwrap();
            Self {
                responses: RefCell::new(
                    vec![PollResponse {
                        operation,
                        retry_after: None,
                        raw_body: body.to_string(),
                    }]
                    .into(),
                ),
            }
        }
    }

    impl AnalyzeTransport for ScriptedTransport {
        fn submit(&self, _source: &AnalyzeSource) -> std::result::Result<OperationHandle, AnalyzeError> {
            Ok(OperationHandle("https://di.example.com/op/1".to_string()))
        }

        fn poll(&self, _handle: &OperationHandle) -> std::result::Result<PollResponse, AnalyzeError> {
            self.responses
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| AnalyzeError::Transport("script exhausted".to_string()))
        }
    }

    struct NoSleep;
    impl Sleeper for NoSleep {
        fn sleep(&self, _duration: Duration) {}
    }

    fn ingestor(body: &str, config: IngestConfig) -> Ingestor<ScriptedTransport, NoSleep> {
        let poller = OperationPoller::with_sleeper(
            ScriptedTransport::succeeding_with(body),
            PollPolicy::default(),
            NoSleep,
        );
        Ingestor::with_analyzer(PayslipAnalyzer::from_poller(poller), config)
    }

    const CONSISTENT_BODY: &str = r#"{
        "status": "succeeded",
        "analyzeResult": {
            "documents": [{
                "fields": {
                    "total_gross": {"valueNumber": 250000.0},
                    "total_deduction": {"valueNumber": 30000.0},
                    "other_payment": {"valueNumber": 0.0},
                    "transfer_amount": {"valueNumber": 220000.0}
                }
            }]
        }
    }"#;

    const MISMATCHED_BODY: &str = r#"{
        "status": "succeeded",
        "analyzeResult": {
            "documents": [{
                "fields": {
                    "total_gross": {"valueNumber": 250000.0},
                    "total_deduction": {"valueNumber": 30000.0},
                    "other_payment": {"valueNumber": 0.0},
                    "transfer_amount": {"valueNumber": 210000.0}
                }
            }]
        }
    }"#;

    #[test]
    fn test_consistent_slip_persists_parsed_record() {
        let ingestor = ingestor(CONSISTENT_BODY, IngestConfig::default());
        let mut store = MemoryStore::new();

        let outcome = ingestor
            .ingest(
                &mut store,
                "payslips/incoming/20251010_支給明細書_0121.pdf",
                b"%PDF-1.7".to_vec(),
            )
            .unwrap();

        assert_eq!(outcome.record.status, RecordStatus::Parsed);
        assert_eq!(outcome.record.user_id, "0121");
        assert_eq!(outcome.record.pay_type, PayType::Salary);
        assert_eq!(outcome.record.total_gross, 250_000);
        assert_eq!(outcome.record.transfer_amount, 220_000);
        assert!(outcome.consistency.as_ref().unwrap().is_ok());

        let entity = store.get("0121/2025-10:salary").unwrap();
        assert_eq!(entity["status"], "parsed");
        assert_eq!(entity["transferAmount"], 220_000);
    }

    #[test]
    fn test_mismatched_slip_still_persists_with_mismatch_status() {
        let ingestor = ingestor(MISMATCHED_BODY, IngestConfig::default());
        let mut store = MemoryStore::new();

        let outcome = ingestor
            .ingest(
                &mut store,
                "payslips/incoming/20251010_支給明細書_0121.pdf",
                b"%PDF-1.7".to_vec(),
            )
            .unwrap();

        assert_eq!(outcome.record.status, RecordStatus::Mismatch);
        // Normalized amounts are persisted untouched.
        assert_eq!(outcome.record.transfer_amount, 210_000);
        assert!(!outcome.consistency.unwrap().is_ok());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_validation_can_be_disabled() {
        let config = IngestConfig {
            validate_before_persist: false,
        };
        let ingestor = ingestor(MISMATCHED_BODY, config);
        let mut store = MemoryStore::new();

        let outcome = ingestor
            .ingest(
                &mut store,
                "payslips/incoming/20251010_支給明細書_0121.pdf",
                b"%PDF-1.7".to_vec(),
            )
            .unwrap();

        assert_eq!(outcome.record.status, RecordStatus::Parsed);
        assert!(outcome.consistency.is_none());
    }

    #[test]
    fn test_failed_operation_persists_nothing() {
        let body = r#"{"status": "failed"}"#;
        let ingestor = ingestor(body, IngestConfig::default());
        let mut store = MemoryStore::new();

        let err = ingestor
            .ingest(
                &mut store,
                "payslips/incoming/20251010_支給明細書_0121.pdf",
                b"%PDF-1.7".to_vec(),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::PayslipError::Analyze(AnalyzeError::OperationFailed { .. })
        ));
        assert!(store.is_empty());
    }
}
