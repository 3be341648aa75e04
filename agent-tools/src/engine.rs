//! Single entry point used by agent loops to call capabilities.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::dispatch::{DispatchConfig, Dispatcher};
use crate::error::{ToolError, ToolResult};
use crate::registry::ToolRegistry;
use crate::result::{InvocationResult, normalize};
use crate::validate::{json_kind, validate};

/// One capability call as issued by an agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Capability to call.
    #[serde(alias = "name")]
    pub capability: String,
    /// Raw argument bundle; `null` means no arguments.
    #[serde(default, alias = "input")]
    pub arguments: Value,
    /// Per-call timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl InvocationRequest {
    /// Creates a request without a timeout override.
    #[must_use]
    pub fn new(capability: impl Into<String>, arguments: Value) -> Self {
        Self {
            capability: capability.into(),
            arguments,
            timeout_ms: None,
        }
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Returns the per-call timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Capability invocation seam for agent loops.
#[async_trait]
pub trait Invoke: Send + Sync {
    /// Calls a capability by name. Failures are reported in the envelope.
    async fn invoke(&self, name: &str, arguments: Value) -> InvocationResult;
}

/// Sequences lookup, validation, dispatch and normalization.
///
/// Cloning is cheap; clones share the registry and the concurrency limit.
#[derive(Clone, Debug)]
pub struct InvocationEngine {
    registry: Arc<ToolRegistry>,
    dispatcher: Dispatcher,
}

impl InvocationEngine {
    /// Creates an engine with the default dispatch policy.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self::with_config(registry, DispatchConfig::default())
    }

    /// Creates an engine with an explicit dispatch policy.
    #[must_use]
    pub fn with_config(registry: Arc<ToolRegistry>, config: DispatchConfig) -> Self {
        Self {
            registry,
            dispatcher: Dispatcher::new(config),
        }
    }

    /// Returns the shared registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Invokes `name` with the default timeout.
    pub async fn invoke(&self, name: &str, arguments: Value) -> InvocationResult {
        self.invoke_with_timeout(name, arguments, None).await
    }

    /// Invokes `name`, overriding the default timeout when `timeout` is set.
    pub async fn invoke_with_timeout(
        &self,
        name: &str,
        arguments: Value,
        timeout: Option<Duration>,
    ) -> InvocationResult {
        let started = Instant::now();
        let result = normalize(self.call(name, arguments, timeout).await);
        match &result {
            InvocationResult::Success { .. } => {
                debug!(capability = name, elapsed = ?started.elapsed(), "capability succeeded");
            }
            InvocationResult::Failure(failure) => {
                debug!(
                    capability = name,
                    elapsed = ?started.elapsed(),
                    kind = %failure.kind(),
                    "capability failed"
                );
            }
        }
        result
    }

    /// Invokes a deserialized request.
    pub async fn invoke_request(&self, request: InvocationRequest) -> InvocationResult {
        let timeout = request.timeout();
        self.invoke_with_timeout(&request.capability, request.arguments, timeout)
            .await
    }

    /// Invokes every request concurrently. Results follow request order.
    pub async fn invoke_batch<I>(&self, requests: I) -> Vec<InvocationResult>
    where
        I: IntoIterator<Item = InvocationRequest>,
    {
        join_all(requests.into_iter().map(|request| self.invoke_request(request))).await
    }

    async fn call(
        &self,
        name: &str,
        arguments: Value,
        timeout: Option<Duration>,
    ) -> ToolResult<Value> {
        let handle = self.registry.handle(name)?;
        let raw = match arguments {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(ToolError::type_mismatch(
                    "arguments",
                    "object",
                    json_kind(&other),
                ));
            }
        };
        let arguments = validate(handle.descriptor(), &raw)?;
        self.dispatcher.dispatch(&handle, arguments, timeout).await
    }
}

impl Default for InvocationEngine {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

#[async_trait]
impl Invoke for InvocationEngine {
    async fn invoke(&self, name: &str, arguments: Value) -> InvocationResult {
        InvocationEngine::invoke(self, name, arguments).await
    }
}
