use std::sync::Arc;
use std::time::{Duration, Instant};

use agent_tools::{
    FailureKind, InvocationEngine, InvocationRequest, InvocationResult, ParamType, ToolRegistry,
    Toolset, toolset,
};
use serde::Serialize;
use serde_json::json;

struct Echo {
    prefix: String,
}

#[toolset(name = "Echo")]
impl Echo {
    /// Creates the toolset.
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
        }
    }

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
        format!("{}{}", self.prefix, text.repeat(times))
    }

    /// Joins words with a separator.
    ///
    /// # Arguments
    ///
    /// * `words` - Words to join.
    /// * `separator` - Defaults to a single space.
    pub fn join(&self, words: &[String], separator: Option<String>) -> String {
        words.join(separator.as_deref().unwrap_or(" "))
    }

    /// Upper-cases text.
    ///
    /// # Arguments
    ///
    /// * `text` - Text to transform.
    #[capability(name = "echo.upper")]
    pub fn upper(&self, text: String) -> String {
        text.to_uppercase()
    }

    /// Divides two numbers.
    ///
    /// # Arguments
    ///
    /// * `a` - Dividend.
    /// * `b` - Divisor.
    pub fn divide(&self, a: f64, b: f64) -> Result<f64, String> {
        if b == 0.0 {
            Err("division by zero".into())
        } else {
            Ok(a / b)
        }
    }

    /// Sleeps, then reports how long it slept.
    ///
    /// # Arguments
    ///
    /// * `ms` - Milliseconds to sleep.
    pub async fn nap(&self, ms: u64) -> u64 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        ms
    }

    /// Names a temperature unit.
    ///
    /// # Arguments
    ///
    /// * `unit` - Temperature unit.
    pub fn unit(&self, #[arg(kind = "enum(celsius|fahrenheit)")] unit: String) -> String {
        unit
    }

    #[capability(skip)]
    pub fn hidden(&self) -> bool {
        true
    }

    #[allow(dead_code)]
    pub fn _internal(&self) {}

    #[allow(dead_code)]
    fn helper(&self) {}
}

#[derive(Serialize)]
struct SearchResult {
    query: String,
    hits: usize,
}

struct Index;

#[toolset(name = "Index")]
impl Index {
    /// Searches the index.
    ///
    /// # Arguments
    ///
    /// * `query` - Search terms.
    pub fn search(&self, query: &str) -> SearchResult {
        SearchResult {
            query: query.to_owned(),
            hits: query.split_whitespace().count(),
        }
    }

    /// Burns CPU time, then fails.
    ///
    /// # Arguments
    ///
    /// * `ms` - Milliseconds to block for.
    pub fn crunch(&self, ms: u64) -> Result<u64, String> {
        std::thread::sleep(Duration::from_millis(ms));
        Err("raised".into())
    }
}

fn index_engine() -> InvocationEngine {
    let registry = ToolRegistry::new();
    registry.register(Index).unwrap();
    InvocationEngine::new(Arc::new(registry))
}

fn engine() -> InvocationEngine {
    let registry = ToolRegistry::new();
    registry.register(Echo::new()).unwrap();
    InvocationEngine::new(Arc::new(registry))
}

fn failure_kind(result: &InvocationResult) -> Option<FailureKind> {
    result.failure().map(|failure| failure.kind())
}

#[test]
fn exposes_public_self_methods_in_declaration_order() {
    let registry = ToolRegistry::new();
    let registration = registry.register(Echo::new()).unwrap();

    let names: Vec<_> = registration
        .capabilities()
        .iter()
        .map(|descriptor| descriptor.name().to_owned())
        .collect();
    assert_eq!(names, ["repeat", "join", "echo.upper", "divide", "nap", "unit"]);
    assert_eq!(registry.len(), names.len());
    assert_eq!(registration.toolset(), "Echo");
    assert!(registration.warnings().is_empty(), "{:?}", registration.warnings());
    assert!(Echo::new().hidden());
}

#[test]
fn descriptors_carry_inferred_schema() {
    let registry = ToolRegistry::new();
    registry.register(Echo::new()).unwrap();

    let repeat = registry.lookup("repeat").unwrap();
    assert_eq!(repeat.documentation(), "Repeats text.");
    assert_eq!(repeat.toolset(), "Echo");
    assert!(!repeat.is_async());
    assert_eq!(repeat.return_hint().type_name(), Some("String"));
    assert_eq!(repeat.return_hint().description(), Some("The repeated text."));

    let text = repeat.parameter("text").unwrap();
    assert_eq!(text.ty(), &ParamType::String);
    assert!(text.required());
    assert_eq!(text.description(), Some("Text to repeat."));

    let times = repeat.parameter("times").unwrap();
    assert_eq!(times.ty(), &ParamType::Integer);
    assert!(!times.required());
    assert_eq!(times.default(), Some(&json!(1)));

    let join = registry.lookup("join").unwrap();
    assert_eq!(
        join.parameter("words").unwrap().ty(),
        &ParamType::sequence_of(ParamType::String)
    );
    assert!(!join.parameter("separator").unwrap().required());

    assert!(registry.lookup("nap").unwrap().is_async());
    assert_eq!(
        registry.lookup("unit").unwrap().parameter("unit").unwrap().ty(),
        &ParamType::enumeration(["celsius", "fahrenheit"])
    );
    assert_eq!(
        registry.lookup("divide").unwrap().return_hint().type_name(),
        Some("Result<f64, String>")
    );
}

#[test]
fn toolset_trait_is_generated() {
    assert_eq!(Echo::new().toolset_name(), "Echo");
    assert_eq!(Echo::methods().len(), 6);
}

#[tokio::test]
async fn echo_scenario() {
    let engine = engine();

    let result = engine.invoke("repeat", json!({ "text": "hi" })).await;
    assert_eq!(result, InvocationResult::Success { payload: json!("hi") });

    let result = engine.invoke("repeat", json!({ "text": "hi", "times": 3 })).await;
    assert_eq!(result.payload(), Some(&json!("hihihi")));

    let result = engine.invoke("repeat", json!({})).await;
    let failure = result.failure().unwrap();
    assert_eq!(failure.kind(), FailureKind::MissingArgument);
    assert_eq!(failure.parameter(), Some("text"));
}

#[tokio::test]
async fn borrowed_and_optional_parameters() {
    let engine = engine();

    let result = engine.invoke("join", json!({ "words": ["a", "b"] })).await;
    assert_eq!(result.payload(), Some(&json!("a b")));

    let result = engine
        .invoke("join", json!({ "words": ["a", "b"], "separator": "-" }))
        .await;
    assert_eq!(result.payload(), Some(&json!("a-b")));

    let result = engine.invoke("echo.upper", json!({ "text": "abc" })).await;
    assert_eq!(result.payload(), Some(&json!("ABC")));

    let result = engine.invoke("unit", json!({ "unit": "Celsius" })).await;
    assert_eq!(result.payload(), Some(&json!("celsius")));
}

#[tokio::test]
async fn fallible_methods_report_execution_failures() {
    let engine = engine();

    let result = engine.invoke("divide", json!({ "a": 1, "b": 4 })).await;
    assert_eq!(result.payload(), Some(&json!(0.25)));

    let result = engine.invoke("divide", json!({ "a": 1, "b": 0 })).await;
    let failure = result.failure().unwrap();
    assert_eq!(failure.kind(), FailureKind::CapabilityExecution);
    assert_eq!(failure.message(), "division by zero");
    assert!(failure.cause().is_some_and(|cause| cause.ends_with("String")));
}

#[tokio::test]
async fn result_named_structs_are_plain_values() {
    let engine = index_engine();

    let result = engine.invoke("search", json!({ "query": "rust macros" })).await;
    assert_eq!(
        result.payload(),
        Some(&json!({ "query": "rust macros", "hits": 2 }))
    );

    let descriptor = engine.registry().lookup("search").unwrap();
    assert_eq!(descriptor.return_hint().type_name(), Some("SearchResult"));
}

#[tokio::test]
async fn blocking_capability_times_out() {
    let engine = index_engine();

    let started = Instant::now();
    let result = engine
        .invoke_with_timeout("crunch", json!({ "ms": 200 }), Some(Duration::from_millis(10)))
        .await;
    assert_eq!(failure_kind(&result), Some(FailureKind::Timeout));
    assert!(started.elapsed() < Duration::from_millis(150), "{:?}", started.elapsed());

    let result = engine.invoke("crunch", json!({ "ms": 1 })).await;
    let failure = result.failure().unwrap();
    assert_eq!(failure.kind(), FailureKind::CapabilityExecution);
    assert_eq!(failure.message(), "raised");
}

#[tokio::test]
async fn batch_runs_blocking_capabilities_side_by_side() {
    let engine = index_engine();

    let started = Instant::now();
    let requests = (0..4).map(|_| InvocationRequest::new("crunch", json!({ "ms": 100 })));
    let results = engine.invoke_batch(requests).await;
    assert_eq!(results.len(), 4);
    assert!(results
        .iter()
        .all(|result| failure_kind(result) == Some(FailureKind::CapabilityExecution)));
    assert!(started.elapsed() < Duration::from_millis(350), "{:?}", started.elapsed());
}

#[tokio::test]
async fn async_capability_times_out() {
    let engine = engine();

    let result = engine
        .invoke_with_timeout("nap", json!({ "ms": 50 }), Some(Duration::from_millis(10)))
        .await;
    assert_eq!(failure_kind(&result), Some(FailureKind::Timeout));

    let result = engine.invoke("nap", json!({ "ms": 1 })).await;
    assert_eq!(result.payload(), Some(&json!(1)));
}

#[tokio::test]
async fn validation_failures_never_reach_the_method() {
    let engine = engine();

    let result = engine.invoke("repeat", json!({ "text": 5 })).await;
    assert_eq!(failure_kind(&result), Some(FailureKind::TypeMismatch));

    let result = engine
        .invoke("repeat", json!({ "text": "hi", "extra": true }))
        .await;
    assert_eq!(failure_kind(&result), Some(FailureKind::UnexpectedArgument));

    let result = engine.invoke("hidden", json!({})).await;
    assert_eq!(failure_kind(&result), Some(FailureKind::CapabilityNotFound));

    // Range errors surface while decoding into the declared Rust type.
    let result = engine.invoke("nap", json!({ "ms": -5 })).await;
    assert_eq!(failure_kind(&result), Some(FailureKind::TypeMismatch));
}
