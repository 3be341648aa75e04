//! Core shared types for toolset registries and capability invocation.

#![warn(missing_docs, clippy::pedantic)]

mod capability;
mod error;
mod ids;

/// Validated capability names shared by the registry and its callers.
pub use capability::CapabilityName;
/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Identifier handed out for every registered toolset.
pub use ids::ToolsetId;
