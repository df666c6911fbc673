//! Lifecycle phases, hook handler traits and the payloads they receive.
//!
//! A handler's before-hook runs while the phase is dispatched and may return
//! an [`AfterHook`]. After-hooks receive the phase's output by value once the
//! underlying operation has finished and hand it back, possibly replaced.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use serde::Serialize;

use super::error::PluginError;
use super::substitution::FnSlot;
use crate::core::document::{Document, DocumentId, Source};
use crate::core::engine::{ExecuteFn, SubscribeFn};
use crate::core::execution::{
    Context, ExecutionArgs, ExecutionResult, GraphError, SubscriptionResult,
};
use crate::core::schema::Schema;

/// Points in the operation lifecycle where hooks are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Parse,
    Validate,
    ContextBuilding,
    Execute,
    Subscribe,
    Result,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Parse,
        Phase::Validate,
        Phase::ContextBuilding,
        Phase::Execute,
        Phase::Subscribe,
        Phase::Result,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Parse => "parse",
            Phase::Validate => "validate",
            Phase::ContextBuilding => "context_building",
            Phase::Execute => "execute",
            Phase::Subscribe => "subscribe",
            Phase::Result => "result",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback returned by a before-hook, invoked with the phase output.
pub struct AfterHook<T> {
    callback: Box<dyn FnOnce(T) -> BoxFuture<'static, Result<T, PluginError>> + Send>,
}

impl<T: Send + 'static> AfterHook<T> {
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, PluginError>> + Send + 'static,
    {
        Self {
            callback: Box::new(move |value| callback(value).boxed()),
        }
    }

    /// Synchronous after-hook that inspects or edits the output in place.
    pub fn observe<F>(observer: F) -> Self
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        Self::new(move |mut value| {
            observer(&mut value);
            future::ready(Ok(value))
        })
    }

    pub async fn call(self, value: T) -> Result<T, PluginError> {
        (self.callback)(value).await
    }
}

impl<T> fmt::Debug for AfterHook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AfterHook")
    }
}

/// Return type of every before-hook.
pub type HookOutcome<T> = Result<Option<AfterHook<T>>, PluginError>;

/// Output of the parse phase as seen by after-hooks.
pub type ParseOutcome = Result<Arc<Document>, GraphError>;

/// Output of the validate phase as seen by after-hooks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    pub errors: Vec<GraphError>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Payload for [`ParseHook::on_parse`].
pub struct ParseHookContext<'a> {
    pub(crate) operation_id: &'a str,
    pub(crate) source: &'a Source,
    pub(crate) context: &'a Context,
    pub(crate) parsed_document: Option<Arc<Document>>,
}

impl<'a> ParseHookContext<'a> {
    pub(crate) fn new(operation_id: &'a str, source: &'a Source, context: &'a Context) -> Self {
        Self {
            operation_id,
            source,
            context,
            parsed_document: None,
        }
    }

    pub fn operation_id(&self) -> &str {
        self.operation_id
    }

    pub fn source(&self) -> &Source {
        self.source
    }

    pub fn context(&self) -> &Context {
        self.context
    }

    /// Supply the document directly; the engine parser is skipped.
    pub fn set_parsed_document(&mut self, document: Arc<Document>) {
        self.parsed_document = Some(document);
    }
}

/// Payload for [`ValidateHook::on_validate`].
pub struct ValidateHookContext<'a> {
    pub(crate) operation_id: &'a str,
    pub(crate) schema: &'a Schema,
    pub(crate) document: &'a Arc<Document>,
    pub(crate) context: &'a Context,
    pub(crate) result: Option<Vec<GraphError>>,
}

impl<'a> ValidateHookContext<'a> {
    pub(crate) fn new(
        operation_id: &'a str,
        schema: &'a Schema,
        document: &'a Arc<Document>,
        context: &'a Context,
    ) -> Self {
        Self {
            operation_id,
            schema,
            document,
            context,
            result: None,
        }
    }

    pub fn operation_id(&self) -> &str {
        self.operation_id
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    pub fn document(&self) -> &Arc<Document> {
        self.document
    }

    pub fn context(&self) -> &Context {
        self.context
    }

    /// Supply the validation errors directly; the engine validator is skipped.
    pub fn set_result(&mut self, errors: Vec<GraphError>) {
        self.result = Some(errors);
    }
}

/// Payload for [`ContextHook::on_context_building`].
pub struct ContextHookContext<'a> {
    pub(crate) operation_id: &'a str,
    pub(crate) context: Context,
}

impl<'a> ContextHookContext<'a> {
    pub(crate) fn new(operation_id: &'a str, context: Context) -> Self {
        Self {
            operation_id,
            context,
        }
    }

    pub fn operation_id(&self) -> &str {
        self.operation_id
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Merge `extension` into the context; existing keys are overwritten.
    pub fn extend_context(&mut self, extension: Context) {
        self.context.extend(extension);
    }
}

/// Payload for [`ExecuteHook::on_execute`].
pub struct ExecuteHookContext<'a> {
    pub(crate) operation_id: &'a str,
    pub(crate) args: ExecutionArgs,
    pub(crate) execute_fn: FnSlot<ExecuteFn>,
    pub(crate) early_result: Option<ExecutionResult>,
}

impl<'a> ExecuteHookContext<'a> {
    pub(crate) fn new(operation_id: &'a str, args: ExecutionArgs, default: ExecuteFn) -> Self {
        Self {
            operation_id,
            args,
            execute_fn: FnSlot::new(default),
            early_result: None,
        }
    }

    pub fn operation_id(&self) -> &str {
        self.operation_id
    }

    pub fn args(&self) -> &ExecutionArgs {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut ExecutionArgs {
        &mut self.args
    }

    pub fn extend_context(&mut self, extension: Context) {
        self.args.context_value.extend(extension);
    }

    /// Install a new executor built from the one currently installed.
    pub fn set_execute_fn<W>(&mut self, wrap: W) -> Result<(), PluginError>
    where
        W: FnOnce(ExecuteFn) -> ExecuteFn,
    {
        self.execute_fn.install(wrap)
    }

    /// Id of the plugin whose executor is currently installed.
    pub fn execute_fn_installed_by(&self) -> Option<&str> {
        self.execute_fn.installed_by()
    }

    /// Skip the executor and use `result` as the phase output. After-hooks
    /// still run.
    pub fn set_result_and_stop_execution(&mut self, result: ExecutionResult) {
        self.early_result = Some(result);
    }
}

/// Payload for [`SubscribeHook::on_subscribe`].
pub struct SubscribeHookContext<'a> {
    pub(crate) operation_id: &'a str,
    pub(crate) args: ExecutionArgs,
    pub(crate) subscribe_fn: FnSlot<SubscribeFn>,
}

impl<'a> SubscribeHookContext<'a> {
    pub(crate) fn new(operation_id: &'a str, args: ExecutionArgs, default: SubscribeFn) -> Self {
        Self {
            operation_id,
            args,
            subscribe_fn: FnSlot::new(default),
        }
    }

    pub fn operation_id(&self) -> &str {
        self.operation_id
    }

    pub fn args(&self) -> &ExecutionArgs {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut ExecutionArgs {
        &mut self.args
    }

    pub fn extend_context(&mut self, extension: Context) {
        self.args.context_value.extend(extension);
    }

    /// Install a new subscriber built from the one currently installed.
    pub fn set_subscribe_fn<W>(&mut self, wrap: W) -> Result<(), PluginError>
    where
        W: FnOnce(SubscribeFn) -> SubscribeFn,
    {
        self.subscribe_fn.install(wrap)
    }

    pub fn subscribe_fn_installed_by(&self) -> Option<&str> {
        self.subscribe_fn.installed_by()
    }
}

#[async_trait]
pub trait ParseHook: Send + Sync {
    async fn on_parse(&self, ctx: &mut ParseHookContext<'_>) -> HookOutcome<ParseOutcome>;
}

#[async_trait]
pub trait ValidateHook: Send + Sync {
    async fn on_validate(&self, ctx: &mut ValidateHookContext<'_>)
        -> HookOutcome<ValidationOutcome>;
}

#[async_trait]
pub trait ContextHook: Send + Sync {
    async fn on_context_building(&self, ctx: &mut ContextHookContext<'_>) -> HookOutcome<Context>;
}

#[async_trait]
pub trait ExecuteHook: Send + Sync {
    async fn on_execute(&self, ctx: &mut ExecuteHookContext<'_>) -> HookOutcome<ExecutionResult>;
}

#[async_trait]
pub trait SubscribeHook: Send + Sync {
    async fn on_subscribe(
        &self,
        ctx: &mut SubscribeHookContext<'_>,
    ) -> HookOutcome<SubscriptionResult>;
}

/// Observes every result produced by execute, and every event of a
/// subscription stream.
#[async_trait]
pub trait ResultHook: Send + Sync {
    async fn on_result(
        &self,
        args: &ExecutionArgs,
        result: &mut ExecutionResult,
    ) -> Result<(), PluginError>;
}

/// Notified when the operation that parsed a document ends.
pub trait DocumentReleaseHook: Send + Sync {
    fn on_document_release(&self, document_id: DocumentId);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Parse.to_string(), "parse");
        assert_eq!(Phase::ContextBuilding.to_string(), "context_building");
        assert_eq!(
            serde_json::to_value(Phase::ContextBuilding).unwrap(),
            Value::String("context_building".into())
        );
        assert_eq!(Phase::ALL.len(), 6);
    }

    #[test]
    fn test_phase_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Phase::Execute);
        set.insert(Phase::Subscribe);
        set.insert(Phase::Execute); // duplicate
        assert_eq!(set.len(), 2);
    }

    #[tokio::test]
    async fn test_after_hook_observe_mutates() {
        let hook = AfterHook::observe(|result: &mut ExecutionResult| {
            result
                .extensions
                .insert("seen".into(), Value::Bool(true));
        });
        let out = hook.call(ExecutionResult::default()).await.unwrap();
        assert_eq!(out.extensions.get("seen"), Some(&Value::Bool(true)));
    }

    #[tokio::test]
    async fn test_after_hook_can_replace_output() {
        let hook = AfterHook::new(|_old: ExecutionResult| async move {
            Ok(ExecutionResult::from_data(Value::from("replaced")))
        });
        let out = hook.call(ExecutionResult::default()).await.unwrap();
        assert_eq!(out.data, Some(Value::from("replaced")));
    }

    #[test]
    fn test_context_hook_extend() {
        let mut base = Context::new();
        base.insert("user".into(), Value::from("anon"));
        let mut ctx = ContextHookContext::new("op-1", base);
        let mut ext = Context::new();
        ext.insert("user".into(), Value::from("alice"));
        ext.insert("locale".into(), Value::from("en"));
        ctx.extend_context(ext);
        assert_eq!(ctx.context().get("user"), Some(&Value::from("alice")));
        assert_eq!(ctx.context().len(), 2);
        assert_eq!(ctx.operation_id(), "op-1");
    }

    #[test]
    fn test_validation_outcome_validity() {
        assert!(ValidationOutcome::default().is_valid());
        let invalid = ValidationOutcome {
            errors: vec![GraphError::new("Unknown field")],
        };
        assert!(!invalid.is_valid());
    }
}
