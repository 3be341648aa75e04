//! Command-line host that registers a text toolset and invokes it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use agent_toolsets::config;
use agent_toolsets::telemetry::{self, TelemetryConfig};
use agent_toolsets::tools::{InvocationEngine, ToolRegistry};
use agent_toolsets::toolset;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

#[derive(Parser)]
#[command(name = "toolset-cli")]
#[command(about = "Inspect and call toolset capabilities")]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the discovery view of every capability
    List,
    /// Print function-calling JSON schemas
    Schemas,
    /// Invoke a capability
    Call {
        /// Capability name
        name: String,
        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        arguments: String,
        /// Per-call timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

struct TextTools;

#[toolset(name = "TextTools", crate = "agent_toolsets::tools")]
impl TextTools {
    /// Repeats text.
    ///
    /// # Arguments
    ///
    /// * `text` - Text to repeat.
    /// * `times` - Number of repetitions.
    ///
    /// # Returns
    ///
    /// The repeated text.
    pub fn repeat(&self, text: &str, #[arg(default = 1)] times: usize) -> String {
        text.repeat(times)
    }

    /// Counts whitespace-separated words.
    ///
    /// # Arguments
    ///
    /// * `text` - Text to count.
    pub fn word_count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Echoes text after a delay.
    ///
    /// # Arguments
    ///
    /// * `text` - Text to echo.
    /// * `delay_ms` - Delay before answering.
    pub async fn slow_echo(&self, text: String, #[arg(default = 100)] delay_ms: u64) -> String {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        text
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let engine_config = config::load(cli.config.as_deref())?;
    telemetry::init(&TelemetryConfig::with_filter(engine_config.log_filter()))?;

    let registry = ToolRegistry::new();
    let registration = registry.register(TextTools)?;
    info!(capabilities = registration.capabilities().len(), "toolset ready");

    let engine = InvocationEngine::with_config(Arc::new(registry), engine_config.dispatch_config()?);

    match cli.command {
        Command::List => {
            print_json(&serde_json::to_value(engine.registry().describe())?)?;
        }
        Command::Schemas => {
            print_json(&Value::Array(engine.registry().json_schemas()))?;
        }
        Command::Call {
            name,
            arguments,
            timeout_ms,
        } => {
            let arguments: Value =
                serde_json::from_str(&arguments).context("arguments must be valid JSON")?;
            let result = engine
                .invoke_with_timeout(&name, arguments, timeout_ms.map(Duration::from_millis))
                .await;
            print_json(&serde_json::to_value(&result)?)?;
        }
    }

    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
