//! Bounded retry for outbound query calls.
//!
//! Only codes on the allow-list are retried. Attempt `n` is followed by a
//! pause of `n * backoff`. The request context is checked at every attempt
//! boundary, so a cancelled or expired request stops the loop at once.

use crate::domain::config::{ConfigError, RetryConfig};
use crate::domain::context::RequestContext;
use crate::rpc::transport::{interrupted, QueryTransport};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tonic::{Code, Status};
use tracing::{debug, warn};

/// Status code by name. Accepts `NotFound` and `NOT_FOUND` spellings.
pub fn parse_code(name: &str) -> Option<Code> {
    let normalized: String = name
        .chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let code = match normalized.as_str() {
        "ok" => Code::Ok,
        "cancelled" | "canceled" => Code::Cancelled,
        "unknown" => Code::Unknown,
        "invalidargument" => Code::InvalidArgument,
        "deadlineexceeded" => Code::DeadlineExceeded,
        "notfound" => Code::NotFound,
        "alreadyexists" => Code::AlreadyExists,
        "permissiondenied" => Code::PermissionDenied,
        "resourceexhausted" => Code::ResourceExhausted,
        "failedprecondition" => Code::FailedPrecondition,
        "aborted" => Code::Aborted,
        "outofrange" => Code::OutOfRange,
        "unimplemented" => Code::Unimplemented,
        "internal" => Code::Internal,
        "unavailable" => Code::Unavailable,
        "dataloss" => Code::DataLoss,
        "unauthenticated" => Code::Unauthenticated,
        _ => return None,
    };
    Some(code)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
    retry_codes: Vec<Code>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration, retry_codes: Vec<Code>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            retry_codes,
        }
    }

    /// Single attempt, nothing retried.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Vec::new())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_retryable(&self, code: Code) -> bool {
        self.retry_codes.contains(&code)
    }

    /// Pause after the given (1-based) failed attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            3,
            Duration::from_millis(100),
            vec![Code::NotFound, Code::Aborted],
        )
    }
}

impl TryFrom<&RetryConfig> for RetryPolicy {
    type Error = ConfigError;

    fn try_from(config: &RetryConfig) -> Result<Self, Self::Error> {
        if config.max_attempts == 0 {
            return Err(ConfigError::InvalidRetry("max_attempts cannot be 0".into()));
        }
        let codes = config
            .retry_codes
            .iter()
            .map(|name| {
                parse_code(name)
                    .ok_or_else(|| ConfigError::InvalidRetry(format!("unknown status code {name}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(config.max_attempts, config.backoff, codes))
    }
}

/// Applies a [`RetryPolicy`] to an inner transport.
#[derive(Debug, Clone)]
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<T: QueryTransport> QueryTransport for RetryingTransport<T> {
    async fn unary(
        &self,
        ctx: &RequestContext,
        method: &str,
        request: Bytes,
    ) -> Result<Bytes, Status> {
        let mut attempt = 1;
        loop {
            if ctx.is_done() {
                debug!(method, attempt, "Request finished, not calling backend");
                return Err(interrupted(ctx));
            }

            let status = match self.inner.unary(ctx, method, request.clone()).await {
                Ok(reply) => return Ok(reply),
                Err(status) => status,
            };

            if attempt >= self.policy.max_attempts || !self.policy.is_retryable(status.code()) {
                return Err(status);
            }

            let delay = self.policy.delay(attempt);
            warn!(
                method,
                attempt,
                code = ?status.code(),
                delay_ms = delay.as_millis() as u64,
                "Retrying query call"
            );
            if ctx.guard(tokio::time::sleep(delay)).await.is_none() {
                return Err(interrupted(ctx));
            }
            attempt += 1;
        }
    }
}
