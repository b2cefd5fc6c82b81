//! HTTP transport for the Document Intelligence analyze protocol.
//!
//! The [`AnalyzeTransport`] trait is the seam between the poll state machine
//! and the wire: production code talks to the service through
//! [`HttpTransport`], tests script responses through a fake.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::error::AnalyzeError;
use crate::models::config::AnalyzeConfig;
use crate::models::fields::AnalyzeOperation;

const API_VERSION: &str = "2024-11-30";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION_HEADER: &str = "Operation-Location";

const POLL_TIMEOUT: Duration = Duration::from_secs(30);
const SUBMIT_BYTES_TIMEOUT: Duration = Duration::from_secs(60);
const SUBMIT_URL_TIMEOUT: Duration = Duration::from_secs(30);

/// What gets submitted for analysis. Exactly one form per call.
#[derive(Debug, Clone)]
pub enum AnalyzeSource {
    /// Raw document payload with its MIME type.
    Bytes {
        data: Vec<u8>,
        content_type: String,
    },
    /// Remote locator (e.g. a blob SAS URL) the service fetches itself.
    Url(String),
}

/// Opaque locator for an in-progress analyze operation, taken from the
/// `Operation-Location` response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle(pub String);

/// One poll observation: the parsed operation body, the server's backoff
/// hint, and the raw body kept for failure diagnostics.
#[derive(Debug, Clone)]
pub struct PollResponse {
    pub operation: AnalyzeOperation,
    /// `Retry-After` seconds, present only when the header held a valid
    /// non-negative integer.
    pub retry_after: Option<u64>,
    pub raw_body: String,
}

/// Transport seam for the analyze protocol.
pub trait AnalyzeTransport {
    /// Submit a document for analysis and return the poll handle.
    fn submit(&self, source: &AnalyzeSource) -> Result<OperationHandle, AnalyzeError>;

    /// Fetch the current state of an operation.
    fn poll(&self, handle: &OperationHandle) -> Result<PollResponse, AnalyzeError>;
}

#[derive(Serialize)]
struct UrlSourceRequest<'a> {
    #[serde(rename = "urlSource")]
    url_source: &'a str,
}

/// Blocking reqwest transport against a live Document Intelligence endpoint.
pub struct HttpTransport {
    config: AnalyzeConfig,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: AnalyzeConfig) -> Result<Self, AnalyzeError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| AnalyzeError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/documentintelligence/documentModels/{}:analyze",
            self.config.endpoint, self.config.model_id
        )
    }

    fn transport_error(e: reqwest::Error) -> AnalyzeError {
        AnalyzeError::Transport(e.to_string())
    }
}

impl AnalyzeTransport for HttpTransport {
    fn submit(&self, source: &AnalyzeSource) -> Result<OperationHandle, AnalyzeError> {
        let url = self.analyze_url();
        debug!(url = %url, "submitting analyze request");

        let request = self
            .client
            .post(&url)
            .query(&[("api-version", API_VERSION)])
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.key);

        let response = match source {
            AnalyzeSource::Bytes { data, content_type } => request
                .timeout(SUBMIT_BYTES_TIMEOUT)
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(data.clone())
                .send(),
            AnalyzeSource::Url(url_source) => request
                .timeout(SUBMIT_URL_TIMEOUT)
                .json(&UrlSourceRequest { url_source })
                .send(),
        }
        .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalyzeError::Transport(format!(
                "analyze submit returned {status}: {body}"
            )));
        }

        let location = response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AnalyzeError::Protocol(format!(
                    "missing {OPERATION_LOCATION_HEADER} header in submit response"
                ))
            })?;

        Ok(OperationHandle(location.to_string()))
    }

    fn poll(&self, handle: &OperationHandle) -> Result<PollResponse, AnalyzeError> {
        let response = self
            .client
            .get(&handle.0)
            .timeout(POLL_TIMEOUT)
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.key)
            .send()
            .map_err(Self::transport_error)?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());

        let raw_body = response.text().map_err(Self::transport_error)?;
        if !status.is_success() {
            return Err(AnalyzeError::Transport(format!(
                "analyze poll returned {status}: {raw_body}"
            )));
        }

        let operation: AnalyzeOperation = serde_json::from_str(&raw_body)
            .map_err(|e| AnalyzeError::Protocol(format!("malformed poll body: {e}")))?;

        Ok(PollResponse {
            operation,
            retry_after,
            raw_body,
        })
    }
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::AnalyzeConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_analyze_url_shape() {
        let config =
            AnalyzeConfig::new("https://di.example.com", "key", "payslip-v1").unwrap();
        let transport = HttpTransport::new(config).unwrap();
        assert_eq!(
            transport.analyze_url(),
            "https://di.example.com/documentintelligence/documentModels/payslip-v1:analyze"
        );
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "5".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(5));

        headers.insert(reqwest::header::RETRY_AFTER, "soon".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(reqwest::header::RETRY_AFTER, "-3".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), None);

        headers.remove(reqwest::header::RETRY_AFTER);
        assert_eq!(parse_retry_after(&headers), None);
    }
}
