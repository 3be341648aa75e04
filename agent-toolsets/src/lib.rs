//! Toolset registry and invocation engine facade.
//!
//! Depend on this crate via `cargo add agent-toolsets`. It bundles the
//! internal crates behind feature flags so hosts can leave out configuration
//! loading or tracing setup they provide themselves.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use agent_primitives as primitives;

/// Registry, validation and dispatch (enabled by `tools` feature).
#[cfg(feature = "tools")]
pub use agent_tools as tools;

/// The `#[toolset]` attribute (enabled by `tools` feature).
#[cfg(feature = "tools")]
pub use agent_tools::toolset;

/// Tracing setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use agent_telemetry as telemetry;

/// Configuration management (enabled by `config` feature).
#[cfg(feature = "config")]
pub use agent_config as config;
