#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::{json, Value};

use hookline::plugin_system::{
    ExecuteHook, ExecuteHookContext, ParseHook, ParseHookContext, ParseOutcome,
};
use hookline::{
    AfterHook, Document, ExecutionArgs, ExecutionResult, GraphError, HookOutcome,
    PipelineError, PipelineResult, Plugin, PluginContext, PluginError, PluginMetadata,
    QueryEngine, Schema, Source, SubscriptionResult,
};

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &EventLog) -> Vec<String> {
    log.lock().clone()
}

pub fn test_schema() -> Schema {
    Schema::new(json!({"query": "Query"}))
}

/// Engine whose documents are just the source text.
///
/// Bodies not starting with `{` fail to parse, bodies containing `invalid`
/// fail validation, bodies containing `explode` fail execution.
#[derive(Default)]
pub struct FakeEngine {
    pub parse_calls: AtomicUsize,
    pub validate_calls: AtomicUsize,
    pub execute_calls: AtomicUsize,
    pub log: Option<EventLog>,
    pub stream_events: Option<Vec<ExecutionResult>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: &EventLog) -> Self {
        Self {
            log: Some(Arc::clone(log)),
            ..Self::default()
        }
    }

    pub fn with_stream(events: Vec<ExecutionResult>) -> Self {
        Self {
            stream_events: Some(events),
            ..Self::default()
        }
    }

    pub fn executions(&self) -> usize {
        self.execute_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryEngine for FakeEngine {
    fn parse(&self, source: &Source) -> Result<Value, GraphError> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        if source.body.trim_start().starts_with('{') {
            Ok(Value::String(source.body.clone()))
        } else {
            Err(GraphError::new(format!("Syntax Error: {}", source.body)))
        }
    }

    fn validate(&self, _schema: &Schema, document: &Document) -> Vec<GraphError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        match document.ast().as_str() {
            Some(body) if body.contains("invalid") => {
                vec![GraphError::new("Cannot query field \"invalid\"")]
            }
            _ => Vec::new(),
        }
    }

    async fn execute(&self, args: ExecutionArgs) -> PipelineResult<ExecutionResult> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.lock().push("operation".to_string());
        }
        let body = args.document.ast().as_str().unwrap_or_default().to_string();
        if body.contains("explode") {
            return Err(PipelineError::Execution("engine exploded".into()));
        }
        Ok(ExecutionResult::from_data(json!({
            "engine": body,
            "context": Value::Object(args.context_value),
            "variables": Value::Object(args.variable_values),
        })))
    }

    async fn subscribe(&self, args: ExecutionArgs) -> PipelineResult<SubscriptionResult> {
        match &self.stream_events {
            Some(events) => Ok(SubscriptionResult::Stream(
                futures::stream::iter(events.clone()).boxed(),
            )),
            None => self.execute(args).await.map(SubscriptionResult::Single),
        }
    }
}

type RegisterFn = dyn Fn(&mut PluginContext<'_>) -> Result<(), PluginError> + Send + Sync;

/// Plugin whose registration is a closure, for one-off handlers in tests.
pub struct FnPlugin {
    metadata: PluginMetadata,
    register: Box<RegisterFn>,
}

impl FnPlugin {
    pub fn new<F>(id: &str, register: F) -> Self
    where
        F: Fn(&mut PluginContext<'_>) -> Result<(), PluginError> + Send + Sync + 'static,
    {
        Self {
            metadata: PluginMetadata::new(id, id),
            register: Box::new(register),
        }
    }
}

impl Plugin for FnPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn register(&self, context: &mut PluginContext<'_>) -> Result<(), PluginError> {
        (self.register)(context)
    }
}

/// Plugin recording `<id>.before` / `<id>.after` for parse and execute.
pub struct RecordingPlugin {
    metadata: PluginMetadata,
    hooks: Arc<RecordingHooks>,
}

struct RecordingHooks {
    id: String,
    log: EventLog,
    fail_execute: bool,
}

impl RecordingPlugin {
    pub fn new(id: &str, log: &EventLog) -> Self {
        Self::build(id, log, false)
    }

    pub fn failing(id: &str, log: &EventLog) -> Self {
        Self::build(id, log, true)
    }

    fn build(id: &str, log: &EventLog, fail_execute: bool) -> Self {
        Self {
            metadata: PluginMetadata::new(id, id),
            hooks: Arc::new(RecordingHooks {
                id: id.to_string(),
                log: Arc::clone(log),
                fail_execute,
            }),
        }
    }
}

impl Plugin for RecordingPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn register(&self, context: &mut PluginContext<'_>) -> Result<(), PluginError> {
        context.on_parse(self.hooks.clone())?;
        context.on_execute(self.hooks.clone())?;
        Ok(())
    }
}

impl RecordingHooks {
    fn after<T: Send + 'static>(&self, phase: &str) -> AfterHook<T> {
        let log = Arc::clone(&self.log);
        let entry = format!("{}.{}.after", self.id, phase);
        AfterHook::observe(move |_: &mut T| log.lock().push(entry))
    }
}

#[async_trait]
impl ParseHook for RecordingHooks {
    async fn on_parse(&self, _ctx: &mut ParseHookContext<'_>) -> HookOutcome<ParseOutcome> {
        self.log.lock().push(format!("{}.parse.before", self.id));
        Ok(Some(self.after("parse")))
    }
}

#[async_trait]
impl ExecuteHook for RecordingHooks {
    async fn on_execute(&self, _ctx: &mut ExecuteHookContext<'_>) -> HookOutcome<ExecutionResult> {
        self.log.lock().push(format!("{}.before", self.id));
        if self.fail_execute {
            return Err(PluginError::HookFailed(format!("{} refused", self.id)));
        }
        let log = Arc::clone(&self.log);
        let entry = format!("{}.after", self.id);
        Ok(Some(AfterHook::observe(move |_: &mut ExecutionResult| {
            log.lock().push(entry)
        })))
    }
}

#[cfg(feature = "jit")]
pub use jit_support::*;

#[cfg(feature = "jit")]
mod jit_support {
    use super::*;
    use hookline::compiler::CompilerOptions;
    use hookline::CompiledQuery;

    /// Compiler counting invocations; documents containing `broken` fail.
    #[derive(Default)]
    pub struct CountingCompiler {
        pub calls: AtomicUsize,
        pub operation_names: Mutex<Vec<Option<String>>>,
    }

    impl CountingCompiler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    pub fn compile_failure() -> ExecutionResult {
        ExecutionResult::from_errors(vec![GraphError::new("Compilation failed: broken field")])
    }

    #[async_trait]
    impl hookline::QueryCompiler for CountingCompiler {
        async fn compile(
            &self,
            _schema: &Schema,
            document: &Document,
            operation_name: Option<&str>,
            _options: &CompilerOptions,
        ) -> Result<CompiledQuery, ExecutionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.operation_names
                .lock()
                .push(operation_name.map(str::to_string));
            let body = document.ast().as_str().unwrap_or_default().to_string();
            if body.contains("broken") {
                return Err(compile_failure());
            }
            let query_body = body.clone();
            let compiled = CompiledQuery::new(move |root, context, variables| {
                let data = json!({
                    "compiled": query_body.clone(),
                    "root": root,
                    "context": Value::Object(context),
                    "variables": Value::Object(variables),
                });
                async move { ExecutionResult::from_data(data) }
            });
            if body.contains("subscription") {
                let events_body = body.clone();
                return Ok(compiled.with_subscribe(move |_, _, _| {
                    let events = vec![
                        ExecutionResult::from_data(json!({"tick": 1, "compiled": events_body.clone()})),
                        ExecutionResult::from_data(json!({"tick": 2, "compiled": events_body.clone()})),
                    ];
                    async move { SubscriptionResult::Stream(futures::stream::iter(events).boxed()) }
                }));
            }
            Ok(compiled)
        }
    }
}
