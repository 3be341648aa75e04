//! Shared error definitions for toolset primitives.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the toolset runtime.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided toolset identifier could not be parsed.
    #[error("invalid toolset id: {source}")]
    InvalidToolsetId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// Capability name failed validation.
    #[error("invalid capability name `{name}`: {reason}")]
    InvalidCapabilityName {
        /// The offending name.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}
