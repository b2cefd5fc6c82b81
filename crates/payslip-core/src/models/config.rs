//! Configuration structures for the ingestion pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::AnalyzeError;

/// Main configuration for the payslip pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PayslipConfig {
    /// Poll loop policy for the analyze operation.
    pub poll: PollPolicy,

    /// Ingest pipeline behavior.
    pub ingest: IngestConfig,
}

impl Default for PayslipConfig {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            ingest: IngestConfig::default(),
        }
    }
}

/// Credentials and target for the Document Intelligence service.
///
/// Validated at construction: every field must be non-empty before any
/// network call can be attempted. Credentials never come from the config
/// file; they are passed explicitly or read from the environment.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// Service endpoint, e.g. `https://<resource>.cognitiveservices.azure.com`.
    pub endpoint: String,

    /// `Ocp-Apim-Subscription-Key` value.
    pub key: String,

    /// Custom model identifier.
    pub model_id: String,
}

impl AnalyzeConfig {
    /// Build a validated configuration. Trailing slashes on the endpoint are
    /// stripped so URL construction stays uniform.
    pub fn new(
        endpoint: impl Into<String>,
        key: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Result<Self, AnalyzeError> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let key = key.into();
        let model_id = model_id.into();

        if endpoint.is_empty() || key.is_empty() || model_id.is_empty() {
            return Err(AnalyzeError::Config(
                "DI_ENDPOINT/DI_KEY/DI_MODEL_ID must all be set".to_string(),
            ));
        }

        Ok(Self {
            endpoint,
            key,
            model_id,
        })
    }

    /// Read the configuration from `DI_ENDPOINT`, `DI_KEY`, and
    /// `DI_MODEL_ID` environment variables.
    pub fn from_env() -> Result<Self, AnalyzeError> {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self::new(var("DI_ENDPOINT"), var("DI_KEY"), var("DI_MODEL_ID"))
    }
}

/// Bounds and backoff defaults for the analyze poll loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Wait between polls when the service sends no `Retry-After` hint,
    /// in seconds.
    pub default_delay_secs: u64,

    /// Maximum number of poll requests before giving up.
    pub max_attempts: u32,

    /// Maximum total time spent polling, in seconds.
    pub max_elapsed_secs: u64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            default_delay_secs: 2,
            // Generous bounds: an ordinary analyze operation finishes in
            // seconds, so hitting either limit means the operation stalled.
            max_attempts: 120,
            max_elapsed_secs: 600,
        }
    }
}

impl PollPolicy {
    pub fn default_delay(&self) -> Duration {
        Duration::from_secs(self.default_delay_secs)
    }

    pub fn max_elapsed(&self) -> Duration {
        Duration::from_secs(self.max_elapsed_secs)
    }
}

/// Ingest pipeline behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Run the transfer consistency check before persisting the record.
    pub validate_before_persist: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            validate_before_persist: true,
        }
    }
}

impl PayslipConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
