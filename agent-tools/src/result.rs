//! Uniform invocation envelope returned to the calling agent loop.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::{ToolError, ToolResult};

/// Failure taxonomy exposed to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A method signature could not be turned into a schema.
    SchemaInference,
    /// Capability name collided with an existing registration.
    DuplicateCapability,
    /// No capability with the requested name.
    CapabilityNotFound,
    /// A required argument was omitted.
    MissingArgument,
    /// An undeclared argument was supplied.
    UnexpectedArgument,
    /// An argument could not be coerced to its declared type.
    TypeMismatch,
    /// The capability did not finish in time.
    Timeout,
    /// The capability itself failed or panicked.
    CapabilityExecution,
}

impl FailureKind {
    /// Returns the wire spelling of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SchemaInference => "schema_inference",
            Self::DuplicateCapability => "duplicate_capability",
            Self::CapabilityNotFound => "capability_not_found",
            Self::MissingArgument => "missing_argument",
            Self::UnexpectedArgument => "unexpected_argument",
            Self::TypeMismatch => "type_mismatch",
            Self::Timeout => "timeout",
            Self::CapabilityExecution => "capability_execution",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured description of a failed invocation.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct InvocationFailure {
    kind: FailureKind,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameter: Option<String>,
}

impl InvocationFailure {
    /// Creates a failure with the given kind and message.
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
            parameter: None,
        }
    }

    /// Attaches the underlying cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Attaches the offending parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    /// Returns the failure kind.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the underlying cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    /// Returns the offending parameter, if any.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }
}

impl From<ToolError> for InvocationFailure {
    fn from(err: ToolError) -> Self {
        let message = err.to_string();
        match err {
            ToolError::SchemaInference { .. } => Self::new(FailureKind::SchemaInference, message),
            ToolError::DuplicateCapability { .. } => {
                Self::new(FailureKind::DuplicateCapability, message)
            }
            ToolError::CapabilityNotFound { .. } | ToolError::ToolsetNotFound { .. } => {
                Self::new(FailureKind::CapabilityNotFound, message)
            }
            ToolError::MissingArgument { parameter } => {
                Self::new(FailureKind::MissingArgument, message).with_parameter(parameter)
            }
            ToolError::UnexpectedArgument { parameter } => {
                Self::new(FailureKind::UnexpectedArgument, message).with_parameter(parameter)
            }
            ToolError::TypeMismatch { parameter, .. } => {
                Self::new(FailureKind::TypeMismatch, message).with_parameter(parameter)
            }
            ToolError::Timeout { .. } => Self::new(FailureKind::Timeout, message),
            ToolError::Execution { reason, cause } => {
                let failure = Self::new(FailureKind::CapabilityExecution, reason);
                match cause {
                    Some(cause) => failure.with_cause(cause),
                    None => failure,
                }
            }
        }
    }
}

/// Outcome of one invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvocationResult {
    /// The capability returned normally.
    Success {
        /// Value returned by the capability, unchanged.
        payload: Value,
    },
    /// Lookup, validation, dispatch or the capability itself failed.
    Failure(InvocationFailure),
}

impl InvocationResult {
    /// Returns `true` for [`InvocationResult::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the payload of a successful invocation.
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success { payload } => Some(payload),
            Self::Failure(_) => None,
        }
    }

    /// Returns the failure of an unsuccessful invocation.
    #[must_use]
    pub fn failure(&self) -> Option<&InvocationFailure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Converts the envelope back into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the contained [`InvocationFailure`] for failed invocations.
    pub fn into_result(self) -> Result<Value, InvocationFailure> {
        match self {
            Self::Success { payload } => Ok(payload),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl From<ToolError> for InvocationResult {
    fn from(err: ToolError) -> Self {
        Self::Failure(err.into())
    }
}

/// Wraps a dispatch outcome into the uniform envelope.
#[must_use]
pub fn normalize(outcome: ToolResult<Value>) -> InvocationResult {
    match outcome {
        Ok(payload) => InvocationResult::Success { payload },
        Err(err) => err.into(),
    }
}
