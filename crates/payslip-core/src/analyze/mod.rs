//! Document Intelligence analyze client: transport, poll state machine, and
//! field extraction into the canonical amount set.

pub mod normalize;
pub mod poller;
pub mod transport;

pub use normalize::normalize_amount;
pub use poller::{OperationPoller, Sleeper, ThreadSleeper};
pub use transport::{AnalyzeSource, AnalyzeTransport, HttpTransport, OperationHandle, PollResponse};

use crate::error::AnalyzeError;
use crate::models::config::{AnalyzeConfig, PollPolicy};
use crate::models::fields::{AnalyzeResult, CanonicalFields};

/// High-level analyze client: submits a payroll slip, waits for the
/// operation, and maps the result into [`CanonicalFields`].
pub struct PayslipAnalyzer<T = HttpTransport, S = ThreadSleeper> {
    poller: OperationPoller<T, S>,
}

impl PayslipAnalyzer {
    /// Build a client against a live endpoint. Fails when the configuration
    /// is incomplete or the HTTP client cannot be constructed.
    pub fn new(config: AnalyzeConfig, policy: PollPolicy) -> Result<Self, AnalyzeError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self {
            poller: OperationPoller::new(transport, policy),
        })
    }
}

impl<T: AnalyzeTransport, S: Sleeper> PayslipAnalyzer<T, S> {
    /// Wrap an existing poller; the seam tests use to inject a scripted
    /// transport.
    pub fn from_poller(poller: OperationPoller<T, S>) -> Self {
        Self { poller }
    }

    /// Analyze in-memory document bytes.
    pub fn analyze_bytes(
        &self,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<CanonicalFields, AnalyzeError> {
        let source = AnalyzeSource::Bytes {
            data,
            content_type: content_type.to_string(),
        };
        let result = self.poller.submit_and_wait(&source)?;
        Ok(map_canonical_fields(&result))
    }

    /// Analyze a document the service fetches from a remote locator
    /// (e.g. a blob SAS URL).
    pub fn analyze_url(&self, url: &str) -> Result<CanonicalFields, AnalyzeError> {
        let source = AnalyzeSource::Url(url.to_string());
        let result = self.poller.submit_and_wait(&source)?;
        Ok(map_canonical_fields(&result))
    }
}

/// Map the first recognized document into the canonical amount set. An empty
/// document list is not an error: every amount normalizes to zero.
pub fn map_canonical_fields(result: &AnalyzeResult) -> CanonicalFields {
    let fields = result.documents.first().map(|d| &d.fields);
    let amount = |name: &str| normalize_amount(fields.and_then(|f| f.get(name)));

    CanonicalFields {
        total_gross: amount("total_gross"),
        total_deduction: amount("total_deduction"),
        other_payment: amount("other_payment"),
        transfer_amount: amount("transfer_amount"),
    }
}
