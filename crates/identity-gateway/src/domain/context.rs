//! Per-request context passed explicitly down the dispatch chain.

use super::trace::TraceContext;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Trace context plus the cancellation/deadline signal of one inbound request.
///
/// Outbound publishes and RPC calls race against [`RequestContext::done`] so a
/// cancelled or expired request never leaves orphaned work behind.
#[derive(Debug, Clone)]
pub struct RequestContext {
    trace: TraceContext,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(trace: TraceContext) -> Self {
        Self {
            trace,
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Context for work that did not arrive through a request.
    pub fn background() -> Self {
        Self::new(TraceContext::new_root())
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Same request, new span. Cancellation and deadline are shared.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            trace: self.trace.child(),
            cancel: self.cancel.clone(),
            deadline: self.deadline,
        }
    }

    pub fn trace(&self) -> &TraceContext {
        &self.trace
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Cancelled or past the deadline.
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.is_expired()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Resolves once the request is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.cancel.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.cancel.cancelled().await,
        }
    }

    /// Run `fut` unless the request finishes first. `None` means it was cut short.
    pub async fn guard<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.done() => None,
            output = fut => Some(output),
        }
    }
}
