//! Error types for the payslip-core library.

use thiserror::Error;

/// Main error type for the payslip library.
#[derive(Error, Debug)]
pub enum PayslipError {
    /// Document analysis error.
    #[error("analyze error: {0}")]
    Analyze(#[from] AnalyzeError),

    /// Record storage error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the Document Intelligence analyze client.
///
/// Every variant is fatal for the document being processed; none of them is
/// retried internally. Numeric malformation is deliberately absent from this
/// taxonomy: the normalizer degrades to zero and the validator reports a
/// structured result instead of raising.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// Missing or empty endpoint, subscription key, or model id. Raised when
    /// the configuration object is built, before any network call.
    #[error("analyze configuration error: {0}")]
    Config(String),

    /// Network failure, timeout, or non-2xx response from the service.
    #[error("analyze request failed: {0}")]
    Transport(String),

    /// The service answered but broke the protocol contract.
    #[error("analyze protocol violation: {0}")]
    Protocol(String),

    /// The remote operation reached a `failed` or `canceled` terminal state.
    /// Carries the full response body for diagnostics.
    #[error("analyze operation {status}: {body}")]
    OperationFailed { status: String, body: String },

    /// The poll policy was exhausted before the operation reached a terminal
    /// state.
    #[error("analyze operation timed out after {attempts} polls ({elapsed_secs}s)")]
    TimedOut { attempts: u32, elapsed_secs: u64 },
}

/// Errors raised by payroll record stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to read or write the backing file.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file does not contain a valid record map.
    #[error("store data error: {0}")]
    Data(#[from] serde_json::Error),
}

/// Result type for the payslip library.
pub type Result<T> = std::result::Result<T, PayslipError>;
