//! Invocation dispatcher enforcing timeouts, concurrency and failure isolation.

use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::binding::{BlockingCall, Invocation, ToolFuture};
use crate::error::{ToolError, ToolResult};
use crate::registry::ToolHandle;
use crate::validate::Arguments;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_CONCURRENCY: NonZeroUsize = NonZeroUsize::new(32).expect("non-zero");

/// Timeout and concurrency policy applied to every dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    default_timeout: Duration,
    max_concurrency: NonZeroUsize,
}

impl DispatchConfig {
    /// Creates a configuration with the supplied limits.
    #[must_use]
    pub const fn new(default_timeout: Duration, max_concurrency: NonZeroUsize) -> Self {
        Self {
            default_timeout,
            max_concurrency,
        }
    }

    /// Overrides the timeout used when a call does not specify one.
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Overrides the number of capabilities allowed in flight.
    #[must_use]
    pub const fn with_max_concurrency(mut self, max_concurrency: NonZeroUsize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Returns the fallback timeout.
    #[must_use]
    pub const fn default_timeout(self) -> Duration {
        self.default_timeout
    }

    /// Returns the concurrency limit.
    #[must_use]
    pub const fn max_concurrency(self) -> NonZeroUsize {
        self.max_concurrency
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_MAX_CONCURRENCY)
    }
}

/// Executes bound capabilities and turns every failure into a [`ToolError`].
///
/// Every call waits for a concurrency permit and then runs under the timeout;
/// the wait for the permit counts against that timeout. Synchronous
/// capabilities run on tokio's blocking pool so the timeout can fire while they
/// are still busy. On timeout the dispatcher stops waiting: an asynchronous
/// future is dropped, a blocking body runs on to completion and its result is
/// discarded.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    semaphore: Arc<Semaphore>,
    closed: Arc<AtomicBool>,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Constructs a dispatcher using the provided configuration.
    #[must_use]
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrency().get())),
            closed: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    /// Returns the associated configuration.
    #[must_use]
    pub const fn config(&self) -> DispatchConfig {
        self.config
    }

    /// Returns `true` if the dispatcher has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Closes the dispatcher. Pending and future dispatches fail.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.semaphore.close();
    }

    /// Runs the capability behind `handle` with validated arguments.
    ///
    /// `timeout` overrides [`DispatchConfig::default_timeout`] for this call.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Timeout`] when the capability does not finish in
    /// time, [`ToolError::Execution`] when it fails, panics or the dispatcher
    /// is closed, and passes through argument decoding errors.
    pub async fn dispatch(
        &self,
        handle: &ToolHandle,
        arguments: Arguments,
        timeout: Option<Duration>,
    ) -> ToolResult<Value> {
        if self.is_closed() {
            return Err(ToolError::execution("dispatcher closed"));
        }

        let capability = handle.name();
        let limit = timeout.unwrap_or(self.config.default_timeout);
        let guarded = async {
            let Ok(_permit) = self.semaphore.acquire().await else {
                return Err(ToolError::execution("dispatcher closed"));
            };
            match panic::catch_unwind(AssertUnwindSafe(|| handle.start(arguments))) {
                Ok(Invocation::Blocking(call)) => run_blocking(capability, call).await,
                Ok(Invocation::Pending(future)) => run_pending(capability, future).await,
                Err(payload) => Err(panic_error(capability, payload.as_ref())),
            }
        };

        tokio::time::timeout(limit, guarded).await.unwrap_or_else(|_| {
            warn!(capability, timeout = ?limit, "capability timed out");
            Err(ToolError::Timeout {
                capability: capability.to_owned(),
                timeout: limit,
            })
        })
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

async fn run_blocking(capability: &str, call: BlockingCall) -> ToolResult<Value> {
    match tokio::task::spawn_blocking(call).await {
        Ok(result) => result,
        Err(err) if err.is_panic() => Err(panic_error(capability, err.into_panic().as_ref())),
        Err(_) => Err(ToolError::execution("capability task cancelled")),
    }
}

async fn run_pending(capability: &str, future: ToolFuture) -> ToolResult<Value> {
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(panic_error(capability, payload.as_ref())),
    }
}

fn panic_error(capability: &str, payload: &(dyn Any + Send)) -> ToolError {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    warn!(capability, message, "capability panicked");
    ToolError::execution_with_cause(format!("capability `{capability}` panicked: {message}"), "panic")
}
