//! Configuration management for the invocation engine.
//!
//! Settings come from an optional JSON file and are then overridden by
//! `TOOLSETS_*` environment variables.

#![warn(missing_docs, clippy::pedantic)]

pub mod loader;
pub mod schema;

pub use loader::{
    ENV_DEFAULT_TIMEOUT_MS, ENV_LOG_FILTER, ENV_MAX_CONCURRENCY, apply_env, from_file,
    from_json_str, load,
};
pub use schema::EngineConfig;
