use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use hookline::compiler::CompilerOptions;
use hookline::plugins::{LoggerPlugin, TimingPlugin};
use hookline::{
    load_config, CompiledQuery, ConfigFormat, Document, ExecutionArgs, ExecutionResult,
    GraphError, JitConfig, JitOptions, JitPlugin, OperationRequest, Orchestrator,
    PipelineResult, QueryCompiler, QueryEngine, Schema, Source,
};

/// Treats each whitespace-separated word inside the braces as a field name.
struct WordEngine;

#[async_trait]
impl QueryEngine for WordEngine {
    fn parse(&self, source: &Source) -> Result<Value, GraphError> {
        let body = source.body.trim();
        let inner = body
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| GraphError::new("Syntax Error: expected { ... }"))?;
        let fields: Vec<Value> = inner.split_whitespace().map(Value::from).collect();
        Ok(Value::Array(fields))
    }

    fn validate(&self, _schema: &Schema, document: &Document) -> Vec<GraphError> {
        match document.ast().as_array() {
            Some(fields) if !fields.is_empty() => Vec::new(),
            _ => vec![GraphError::new("Operation selects no fields")],
        }
    }

    async fn execute(&self, args: ExecutionArgs) -> PipelineResult<ExecutionResult> {
        Ok(ExecutionResult::from_data(resolve_fields(
            args.document.ast(),
            "interpreted",
        )))
    }
}

struct WordCompiler {
    compilations: AtomicUsize,
}

#[async_trait]
impl QueryCompiler for WordCompiler {
    async fn compile(
        &self,
        _schema: &Schema,
        document: &Document,
        _operation_name: Option<&str>,
        _options: &CompilerOptions,
    ) -> Result<CompiledQuery, ExecutionResult> {
        self.compilations.fetch_add(1, Ordering::SeqCst);
        let ast = document.ast().clone();
        Ok(CompiledQuery::new(move |_root, _context, _variables| {
            let data = resolve_fields(&ast, "compiled");
            async move { ExecutionResult::from_data(data) }
        }))
    }
}

fn resolve_fields(ast: &Value, mode: &str) -> Value {
    let mut data = serde_json::Map::new();
    for field in ast.as_array().into_iter().flatten() {
        if let Some(name) = field.as_str() {
            data.insert(name.to_string(), Value::from(format!("{}:{}", mode, name)));
        }
    }
    Value::Object(data)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Hookline ===\n");

    let config: JitConfig = load_config(
        "cache:\n  max_entries: 100\n  ttl_ms: 60000\n",
        ConfigFormat::Yaml,
    )?;
    let compiler = Arc::new(WordCompiler {
        compilations: AtomicUsize::new(0),
    });

    let orchestrator = Orchestrator::builder(Arc::new(WordEngine))
        .schema(Schema::new(json!({"query": "Query"})))
        .plugin(LoggerPlugin::new())
        .plugin(TimingPlugin::new())
        .plugin(JitPlugin::new(compiler.clone(), JitOptions::from_config(config)))
        .build()?;

    for body in ["{ hello world }", "{ hello world }", "{ }", "{ hello"] {
        let result = orchestrator.run(OperationRequest::new(body)).await?;
        println!("{:<18} => {}", body, serde_json::to_string(&result)?);
    }

    println!(
        "\n[OK] compiler invoked {} time(s)",
        compiler.compilations.load(Ordering::SeqCst)
    );
    Ok(())
}
