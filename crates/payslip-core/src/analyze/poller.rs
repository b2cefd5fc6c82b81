//! Poll state machine for the asynchronous analyze operation.
//!
//! One submission yields an operation handle which is polled until a
//! terminal state. Backoff honors the server's `Retry-After` hint and falls
//! back to the policy default. The loop is bounded by [`PollPolicy`]; an
//! operation that never terminates surfaces as [`AnalyzeError::TimedOut`]
//! instead of blocking the invocation forever.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::AnalyzeError;
use crate::models::config::PollPolicy;
use crate::models::fields::AnalyzeResult;

use super::transport::{AnalyzeSource, AnalyzeTransport, PollResponse};

/// Wall-clock seam. Production sleeps the thread; tests record the requested
/// waits instead.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocking sleep. Each invocation owns its execution context, so the thread
/// parks between polls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Drives one analyze operation from submission to a terminal state.
pub struct OperationPoller<T, S = ThreadSleeper> {
    transport: T,
    sleeper: S,
    policy: PollPolicy,
}

impl<T: AnalyzeTransport> OperationPoller<T, ThreadSleeper> {
    pub fn new(transport: T, policy: PollPolicy) -> Self {
        Self {
            transport,
            sleeper: ThreadSleeper,
            policy,
        }
    }
}

impl<T: AnalyzeTransport, S: Sleeper> OperationPoller<T, S> {
    pub fn with_sleeper(transport: T, policy: PollPolicy, sleeper: S) -> Self {
        Self {
            transport,
            sleeper,
            policy,
        }
    }

    /// Submit the document and poll the resulting operation to completion.
    ///
    /// Terminal outcomes: the embedded `analyzeResult` on `succeeded` or
    /// `completed`; [`AnalyzeError::OperationFailed`] on `failed` or
    /// `canceled`; [`AnalyzeError::TimedOut`] once the policy bounds are
    /// exhausted. Transport and protocol errors abort on first occurrence,
    /// polling never retries them.
    pub fn submit_and_wait(&self, source: &AnalyzeSource) -> Result<AnalyzeResult, AnalyzeError> {
        let handle = self.transport.submit(source)?;
        debug!(handle = %handle.0, "analyze operation submitted");

        let mut attempts: u32 = 0;
        let mut waited = Duration::ZERO;

        loop {
            let response = self.transport.poll(&handle)?;
            attempts += 1;

            match classify(&response.operation.status) {
                OperationState::Succeeded => {
                    info!(attempts, "analyze operation succeeded");
                    return response.operation.analyze_result.ok_or_else(|| {
                        AnalyzeError::Protocol(
                            "succeeded operation without analyzeResult".to_string(),
                        )
                    });
                }
                OperationState::Failed => {
                    return Err(AnalyzeError::OperationFailed {
                        status: response.operation.status,
                        body: response.raw_body,
                    });
                }
                OperationState::Running => {
                    if attempts >= self.policy.max_attempts || waited >= self.policy.max_elapsed()
                    {
                        return Err(AnalyzeError::TimedOut {
                            attempts,
                            elapsed_secs: waited.as_secs(),
                        });
                    }
                    let delay = next_delay(&response, &self.policy);
                    debug!(
                        status = %response.operation.status,
                        delay_secs = delay.as_secs(),
                        "analyze operation still running"
                    );
                    self.sleeper.sleep(delay);
                    waited += delay;
                }
            }
        }
    }
}

enum OperationState {
    Running,
    Succeeded,
    Failed,
}

/// Any status outside the four terminal strings keeps the loop going;
/// `queued` and `running` are not distinguished.
fn classify(status: &str) -> OperationState {
    match status {
        "succeeded" | "completed" => OperationState::Succeeded,
        "failed" | "canceled" => OperationState::Failed,
        _ => OperationState::Running,
    }
}

fn next_delay(response: &PollResponse, policy: &PollPolicy) -> Duration {
    response
        .retry_after
        .map(Duration::from_secs)
        .unwrap_or_else(|| policy.default_delay())
}
