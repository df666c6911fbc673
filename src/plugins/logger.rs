//! Execute and subscribe start/end logging.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::execution::{ExecutionArgs, ExecutionResult, SubscriptionResult};
use crate::plugin_system::{
    AfterHook, ExecuteHook, ExecuteHookContext, HookOutcome, Plugin, PluginContext, PluginError,
    PluginMetadata, SubscribeHook, SubscribeHookContext,
};

/// Receives an event name (`execute-start`, `execute-end`, `subscribe-start`,
/// `subscribe-end`) and its payload.
pub type LogFn = Arc<dyn Fn(&str, &Value) + Send + Sync>;

pub struct LoggerPlugin {
    metadata: PluginMetadata,
    hooks: Arc<LoggerHooks>,
}

struct LoggerHooks {
    log: Option<LogFn>,
    include_variables: bool,
}

impl LoggerPlugin {
    /// Log through `tracing` at info level.
    pub fn new() -> Self {
        Self::build(None, false)
    }

    /// Log through `log` instead of `tracing`.
    pub fn with_log_fn(log: LogFn) -> Self {
        Self::build(Some(log), false)
    }

    /// Include variable values in start events.
    pub fn include_variables(self, include: bool) -> Self {
        Self::build(self.hooks.log.clone(), include)
    }

    fn build(log: Option<LogFn>, include_variables: bool) -> Self {
        Self {
            metadata: PluginMetadata::new("logger", "Logger"),
            hooks: Arc::new(LoggerHooks {
                log,
                include_variables,
            }),
        }
    }
}

impl Default for LoggerPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for LoggerPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn register(&self, context: &mut PluginContext<'_>) -> Result<(), PluginError> {
        context.on_execute(self.hooks.clone())?;
        context.on_subscribe(self.hooks.clone())?;
        Ok(())
    }
}

impl LoggerHooks {
    fn emit(&self, event: &str, payload: Value) {
        match &self.log {
            Some(log) => log(event, &payload),
            None => tracing::info!(event = %event, payload = %payload, "operation event"),
        }
    }

    fn start_payload(&self, operation_id: &str, args: &ExecutionArgs) -> Value {
        let mut payload = json!({
            "operation_id": operation_id,
            "operation_name": args.operation_name,
        });
        if self.include_variables {
            payload["variables"] = Value::Object(args.variable_values.clone());
        }
        payload
    }
}

fn end_payload(operation_id: &str, result: &ExecutionResult) -> Value {
    json!({
        "operation_id": operation_id,
        "has_data": result.data.is_some(),
        "errors": result.errors.len(),
    })
}

#[async_trait]
impl ExecuteHook for LoggerHooks {
    async fn on_execute(&self, ctx: &mut ExecuteHookContext<'_>) -> HookOutcome<ExecutionResult> {
        self.emit(
            "execute-start",
            self.start_payload(ctx.operation_id(), ctx.args()),
        );
        let log = self.log.clone();
        let operation_id = ctx.operation_id().to_string();
        Ok(Some(AfterHook::observe(move |result: &mut ExecutionResult| {
            let payload = end_payload(&operation_id, result);
            match log {
                Some(log) => log("execute-end", &payload),
                None => tracing::info!(event = "execute-end", payload = %payload, "operation event"),
            }
        })))
    }
}

#[async_trait]
impl SubscribeHook for LoggerHooks {
    async fn on_subscribe(
        &self,
        ctx: &mut SubscribeHookContext<'_>,
    ) -> HookOutcome<SubscriptionResult> {
        self.emit(
            "subscribe-start",
            self.start_payload(ctx.operation_id(), ctx.args()),
        );
        let log = self.log.clone();
        let operation_id = ctx.operation_id().to_string();
        Ok(Some(AfterHook::observe(
            move |subscription: &mut SubscriptionResult| {
                let payload = match subscription {
                    SubscriptionResult::Single(result) => end_payload(&operation_id, result),
                    SubscriptionResult::Stream(_) => {
                        json!({ "operation_id": operation_id, "stream": true })
                    }
                };
                match log {
                    Some(log) => log("subscribe-end", &payload),
                    None => {
                        tracing::info!(event = "subscribe-end", payload = %payload, "operation event")
                    }
                }
            },
        )))
    }
}
