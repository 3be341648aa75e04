//! Errors produced by toolset registration and capability invocation.

use std::time::Duration;

use agent_primitives::ToolsetId;
use thiserror::Error;

/// Result alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors produced by tool registration and invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    /// A method signature could not be turned into a capability schema.
    #[error("cannot infer schema for `{capability}`: {reason}")]
    SchemaInference {
        /// Capability whose signature was rejected.
        capability: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Capability name collided with an existing registration.
    #[error("capability `{name}` is already registered")]
    DuplicateCapability {
        /// Name of the offending capability.
        name: String,
    },

    /// Requested capability does not exist.
    #[error("capability `{name}` is not registered")]
    CapabilityNotFound {
        /// Name of the missing capability.
        name: String,
    },

    /// Requested toolset registration does not exist.
    #[error("toolset `{id}` is not registered")]
    ToolsetNotFound {
        /// Identifier that was not found.
        id: ToolsetId,
    },

    /// A required argument was not supplied.
    #[error("missing required argument `{parameter}`")]
    MissingArgument {
        /// Name of the missing parameter.
        parameter: String,
    },

    /// An argument was supplied that the capability does not declare.
    #[error("unexpected argument `{parameter}`")]
    UnexpectedArgument {
        /// Name of the unknown argument.
        parameter: String,
    },

    /// An argument could not be coerced to the declared type.
    #[error("argument `{parameter}` expected {expected}, received {received}")]
    TypeMismatch {
        /// Parameter (or nested path) that failed to coerce.
        parameter: String,
        /// Declared type.
        expected: String,
        /// Type of the value that was received.
        received: String,
    },

    /// Execution did not complete within the allotted time.
    #[error("capability `{capability}` timed out after {timeout:?}")]
    Timeout {
        /// Capability that timed out.
        capability: String,
        /// Limit that was exceeded.
        timeout: Duration,
    },

    /// Tool execution failed.
    #[error("tool execution failed: {reason}")]
    Execution {
        /// Human-readable error returned by the tool implementation.
        reason: String,
        /// Underlying cause, when one is known.
        cause: Option<String>,
    },
}

impl ToolError {
    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
            cause: None,
        }
    }

    /// Creates an execution error carrying an underlying cause.
    #[must_use]
    pub fn execution_with_cause(reason: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
            cause: Some(cause.into()),
        }
    }

    /// Creates a schema inference error for the named capability.
    #[must_use]
    pub fn schema(capability: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaInference {
            capability: capability.into(),
            reason: reason.into(),
        }
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(
        parameter: impl Into<String>,
        expected: impl Into<String>,
        received: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            parameter: parameter.into(),
            expected: expected.into(),
            received: received.into(),
        }
    }
}
