//! Per-operation phase dispatch.
//!
//! An [`Operation`] runs the phases of one request against the shared
//! plugin registry. Every phase follows the same sequence:
//!
//! 1. Before-hooks run one at a time in registration order. A failing hook
//!    aborts the phase; later hooks do not run and the after-hooks collected
//!    so far are dropped without being called.
//! 2. The underlying operation runs (engine parse/validate, the installed
//!    executor or subscriber) unless a hook supplied the output directly.
//! 3. After-hooks unwind in reverse registration order.
//!
//! Dropping a phase future part-way abandons it: after-hooks not yet reached
//! never run. Dropping the [`Operation`] itself always fires the document
//! release hooks for every document it parsed.

use std::sync::Arc;

use futures::StreamExt;

use super::after_chain::AfterChain;
use super::orchestrator::OrchestratorInner;
use crate::core::document::{Document, DocumentId, Source};
use crate::core::engine::{ExecuteFn, SubscribeFn};
use crate::core::execution::{
    Context, ExecutionArgs, ExecutionResult, GraphError, SubscriptionResult,
};
use crate::core::schema::Schema;
use crate::error::{PipelineError, PipelineResult};
use crate::plugin_system::{
    ContextHookContext, ExecuteHookContext, HookEntry, ParseHookContext, Phase, ResultHook,
    SubscribeHookContext, ValidateHookContext, ValidationOutcome,
};

/// Handle for running the phases of a single request.
pub struct Operation {
    id: String,
    inner: Arc<OrchestratorInner>,
    context: Context,
    parsed: Vec<DocumentId>,
}

impl Operation {
    pub(crate) fn new(inner: Arc<OrchestratorInner>, context: Context) -> Self {
        let id = inner.id_generator.next_id();
        Self {
            id,
            inner,
            context,
            parsed: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Context as it stands after the last context-building phase.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn schema(&self) -> PipelineResult<Schema> {
        self.inner.schema.clone().ok_or(PipelineError::MissingSchema)
    }

    /// Run the parse phase. Syntax errors surface as [`PipelineError::Syntax`].
    pub async fn parse(&mut self, source: impl Into<Source>) -> PipelineResult<Arc<Document>> {
        let source = source.into();
        let hooks = self.inner.registry.parse_hooks();
        self.trace_dispatch(Phase::Parse, hooks.len());

        let mut chain = AfterChain::new(Phase::Parse);
        let mut ctx = ParseHookContext::new(&self.id, &source, &self.context);
        for entry in hooks {
            let after = entry
                .handler
                .on_parse(&mut ctx)
                .await
                .map_err(|e| PipelineError::hook(&entry.plugin_id, Phase::Parse, e))?;
            chain.push(&entry.plugin_id, after);
        }
        let injected = ctx.parsed_document.take();

        let outcome = match injected {
            Some(document) => Ok(document),
            None => self
                .inner
                .engine
                .parse(&source)
                .map(|ast| Arc::new(Document::new(ast))),
        };

        // Tracked before unwinding so a failing after-hook still releases it.
        if let Ok(document) = &outcome {
            self.parsed.push(document.id());
        }

        match chain.unwind(outcome).await? {
            Ok(document) => {
                if !self.parsed.contains(&document.id()) {
                    self.parsed.push(document.id());
                }
                Ok(document)
            }
            Err(error) => Err(PipelineError::Syntax(error)),
        }
    }

    /// Run the validate phase and return the validation errors.
    pub async fn validate(
        &mut self,
        schema: &Schema,
        document: &Arc<Document>,
    ) -> PipelineResult<Vec<GraphError>> {
        let hooks = self.inner.registry.validate_hooks();
        self.trace_dispatch(Phase::Validate, hooks.len());

        let mut chain = AfterChain::new(Phase::Validate);
        let mut ctx = ValidateHookContext::new(&self.id, schema, document, &self.context);
        for entry in hooks {
            let after = entry
                .handler
                .on_validate(&mut ctx)
                .await
                .map_err(|e| PipelineError::hook(&entry.plugin_id, Phase::Validate, e))?;
            chain.push(&entry.plugin_id, after);
        }
        let preset = ctx.result.take();

        let errors = match preset {
            Some(errors) => errors,
            None => self.inner.engine.validate(schema, document),
        };
        let outcome = chain.unwind(ValidationOutcome { errors }).await?;
        Ok(outcome.errors)
    }

    /// Run the context-building phase, merging `extra` into the operation's
    /// context first. The resulting context is kept on the operation.
    pub async fn build_context(&mut self, extra: Context) -> PipelineResult<Context> {
        let hooks = self.inner.registry.context_hooks();
        self.trace_dispatch(Phase::ContextBuilding, hooks.len());

        let mut initial = self.context.clone();
        initial.extend(extra);

        let mut chain = AfterChain::new(Phase::ContextBuilding);
        let mut ctx = ContextHookContext::new(&self.id, initial);
        for entry in hooks {
            let after = entry
                .handler
                .on_context_building(&mut ctx)
                .await
                .map_err(|e| PipelineError::hook(&entry.plugin_id, Phase::ContextBuilding, e))?;
            chain.push(&entry.plugin_id, after);
        }
        let built = ctx.context;

        let context = chain.unwind(built).await?;
        self.context = context.clone();
        Ok(context)
    }

    /// Run the execute phase with whichever executor the hooks left installed.
    pub async fn execute(&mut self, args: ExecutionArgs) -> PipelineResult<ExecutionResult> {
        let hooks = self.inner.registry.execute_hooks();
        self.trace_dispatch(Phase::Execute, hooks.len());

        let default = ExecuteFn::from_engine(Arc::clone(&self.inner.engine));
        let mut chain = AfterChain::new(Phase::Execute);
        let mut ctx = ExecuteHookContext::new(&self.id, args, default);
        for entry in hooks {
            ctx.execute_fn.begin_hook(&entry.plugin_id);
            let after = entry
                .handler
                .on_execute(&mut ctx)
                .await
                .map_err(|e| PipelineError::hook(&entry.plugin_id, Phase::Execute, e))?;
            chain.push(&entry.plugin_id, after);
        }
        let ExecuteHookContext {
            args,
            execute_fn,
            early_result,
            ..
        } = ctx;

        let result_hooks = self.inner.registry.result_hooks();
        let retained = (!result_hooks.is_empty()).then(|| args.clone());
        let result = match early_result {
            Some(result) => result,
            None => {
                tracing::trace!(
                    operation_id = %self.id,
                    installed_by = execute_fn.installed_by().unwrap_or("engine"),
                    layers = execute_fn.layers(),
                    "invoking executor"
                );
                execute_fn.into_current().call(args).await?
            }
        };

        let mut result = chain.unwind(result).await?;
        if let Some(args) = retained {
            apply_result_hooks(result_hooks, &args, &mut result).await?;
        }
        Ok(result)
    }

    /// Run the subscribe phase with whichever subscriber the hooks left
    /// installed. Result hooks are applied to every streamed event.
    pub async fn subscribe(&mut self, args: ExecutionArgs) -> PipelineResult<SubscriptionResult> {
        let hooks = self.inner.registry.subscribe_hooks();
        self.trace_dispatch(Phase::Subscribe, hooks.len());

        let default = SubscribeFn::from_engine(Arc::clone(&self.inner.engine));
        let mut chain = AfterChain::new(Phase::Subscribe);
        let mut ctx = SubscribeHookContext::new(&self.id, args, default);
        for entry in hooks {
            ctx.subscribe_fn.begin_hook(&entry.plugin_id);
            let after = entry
                .handler
                .on_subscribe(&mut ctx)
                .await
                .map_err(|e| PipelineError::hook(&entry.plugin_id, Phase::Subscribe, e))?;
            chain.push(&entry.plugin_id, after);
        }
        let SubscribeHookContext {
            args, subscribe_fn, ..
        } = ctx;

        let result_hooks = self.inner.registry.result_hooks();
        let retained = (!result_hooks.is_empty()).then(|| args.clone());
        let subscription = subscribe_fn.into_current().call(args).await?;
        let subscription = chain.unwind(subscription).await?;

        let Some(args) = retained else {
            return Ok(subscription);
        };
        match subscription {
            SubscriptionResult::Single(mut result) => {
                apply_result_hooks(result_hooks, &args, &mut result).await?;
                Ok(SubscriptionResult::Single(result))
            }
            SubscriptionResult::Stream(events) => {
                let hooks: Arc<[HookEntry<dyn ResultHook>]> = Arc::from(result_hooks.to_vec());
                let args = Arc::new(args);
                let operation_id: Arc<str> = Arc::from(self.id.as_str());
                let events = events.then(move |mut event| {
                    let hooks = Arc::clone(&hooks);
                    let args = Arc::clone(&args);
                    let operation_id = Arc::clone(&operation_id);
                    async move {
                        for entry in hooks.iter() {
                            // A stream cannot propagate errors; fold them into the event.
                            if let Err(error) = entry.handler.on_result(&args, &mut event).await {
                                tracing::warn!(
                                    operation_id = %operation_id,
                                    plugin_id = %entry.plugin_id,
                                    error = %error,
                                    "result hook failed on subscription event"
                                );
                                event.errors.push(GraphError::new(error.to_string()));
                            }
                        }
                        event
                    }
                });
                Ok(SubscriptionResult::Stream(events.boxed()))
            }
        }
    }

    fn trace_dispatch(&self, phase: Phase, hooks: usize) {
        tracing::debug!(operation_id = %self.id, phase = %phase, hooks, "dispatching phase");
    }
}

impl Drop for Operation {
    fn drop(&mut self) {
        let release_hooks = self.inner.registry.document_release_hooks();
        for document_id in self.parsed.drain(..) {
            for entry in release_hooks {
                entry.handler.on_document_release(document_id);
            }
        }
    }
}

async fn apply_result_hooks(
    hooks: &[HookEntry<dyn ResultHook>],
    args: &ExecutionArgs,
    result: &mut ExecutionResult,
) -> PipelineResult<()> {
    for entry in hooks {
        entry
            .handler
            .on_result(args, result)
            .await
            .map_err(|e| PipelineError::hook(&entry.plugin_id, Phase::Result, e))?;
    }
    Ok(())
}
