//! Toolset trait and the method table emitted by `#[toolset]`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ToolError, ToolResult};
use crate::infer::MethodSignature;
use crate::validate::Arguments;

/// Future alias produced by asynchronous capability shims.
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult<Value>> + Send>>;

/// A type whose methods are exposed as capabilities.
///
/// Implementations are normally generated by the `#[toolset]` attribute on an
/// inherent `impl` block. The registry owns the instance for as long as it is
/// registered; resources it holds are released by its own `Drop`.
pub trait Toolset: Send + Sync + 'static {
    /// Display name recorded on every descriptor the toolset produces.
    fn toolset_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Enumerates the exposed methods in declaration order.
    fn methods() -> Vec<MethodDef<Self>>
    where
        Self: Sized;
}

/// Typed entry point for one capability.
pub enum Handler<T> {
    /// Runs to completion on a blocking thread.
    Sync(fn(&T, Arguments) -> ToolResult<Value>),
    /// Produces a future that is awaited by the dispatcher.
    Async(fn(Arc<T>, Arguments) -> ToolFuture),
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handler<T> {}

impl<T> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Handler::Sync"),
            Self::Async(_) => f.write_str("Handler::Async"),
        }
    }
}

impl<T: Toolset> Handler<T> {
    /// Binds the handler to a shared instance, erasing the toolset type.
    pub(crate) fn bind(self, instance: &Arc<T>) -> BoundCall {
        let instance = Arc::clone(instance);
        match self {
            Self::Sync(call) => Arc::new(move |args: Arguments| {
                let instance = Arc::clone(&instance);
                Invocation::Blocking(Box::new(move || call(instance.as_ref(), args)))
            }),
            Self::Async(call) => {
                Arc::new(move |args: Arguments| Invocation::Pending(call(Arc::clone(&instance), args)))
            }
        }
    }
}

/// Synchronous capability body, run on the blocking pool.
pub(crate) type BlockingCall = Box<dyn FnOnce() -> ToolResult<Value> + Send>;

/// Outcome of starting a bound call. Neither variant has run the method yet.
pub(crate) enum Invocation {
    /// Synchronous capability.
    Blocking(BlockingCall),
    /// Asynchronous capability.
    Pending(ToolFuture),
}

/// Type-erased capability entry point bound to its owning instance.
pub(crate) type BoundCall = Arc<dyn Fn(Arguments) -> Invocation + Send + Sync>;

/// One exposed method: its raw signature and its typed handler.
#[derive(Debug)]
pub struct MethodDef<T> {
    signature: MethodSignature,
    handler: Handler<T>,
}

impl<T> MethodDef<T> {
    /// Creates a method definition. The signature's asynchronous flag follows
    /// the handler variant.
    #[must_use]
    pub fn new(signature: MethodSignature, handler: Handler<T>) -> Self {
        let is_async = matches!(handler, Handler::Async(_));
        Self {
            signature: signature.asynchronous(is_async),
            handler,
        }
    }

    /// Returns the raw signature.
    #[must_use]
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub(crate) fn into_parts(self) -> (MethodSignature, Handler<T>) {
        (self.signature, self.handler)
    }
}

/// Converts an infallible return value into capability output.
///
/// # Errors
///
/// Returns [`ToolError::Execution`] if the value cannot be serialized.
pub fn infallible<T: Serialize>(output: T) -> ToolResult<Value> {
    serde_json::to_value(output).map_err(|err| {
        ToolError::execution_with_cause("failed to serialize capability output", err.to_string())
    })
}

/// Converts a fallible return value into capability output.
///
/// # Errors
///
/// Returns [`ToolError::Execution`] carrying the method's error message with
/// the error type as its cause, or a serialization failure.
pub fn fallible<T: Serialize, E: fmt::Display>(output: Result<T, E>) -> ToolResult<Value> {
    match output {
        Ok(value) => infallible(value),
        Err(err) => Err(ToolError::execution_with_cause(
            err.to_string(),
            std::any::type_name::<E>(),
        )),
    }
}
