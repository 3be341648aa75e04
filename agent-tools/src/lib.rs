//! Toolset registration, schema inference and capability invocation.
//!
//! Annotate an inherent `impl` block with [`toolset`] to expose its public
//! methods, register instances with a [`ToolRegistry`] and call capabilities
//! through an [`InvocationEngine`]. Every call yields an [`InvocationResult`];
//! lookup, validation, timeout and execution failures are reported in the
//! envelope instead of being raised.

#![warn(missing_docs, clippy::pedantic)]

extern crate self as agent_tools;

mod binding;
mod doc;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod infer;
pub mod registry;
pub mod result;
pub mod schema;
pub mod validate;

pub use agent_tools_macros::toolset;
pub use binding::{Handler, MethodDef, ToolFuture, Toolset};
pub use dispatch::{DispatchConfig, Dispatcher};
pub use engine::{InvocationEngine, InvocationRequest, Invoke};
pub use error::{ToolError, ToolResult};
pub use infer::{InferenceWarning, MethodSignature, RawParam, TypeResolver};
pub use registry::{Registration, ToolHandle, ToolRegistry, ToolsetInfo};
pub use result::{FailureKind, InvocationFailure, InvocationResult, normalize};
pub use schema::{CapabilityDescriptor, CapabilitySchema, ParamType, ParameterSpec, ReturnHint};
pub use validate::{Arguments, validate};

#[doc(hidden)]
pub mod __private {
    pub use crate::binding::{fallible, infallible};
    pub use serde_json::{Value, json};
}
