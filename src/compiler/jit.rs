//! Executor substitution backed by compiled artifacts.
//!
//! The plugin remembers the source text of every successfully parsed
//! document, then replaces the execute and subscribe implementations with
//! ones that look the artifact up by that text, compiling on a miss.
//! Documents that were never seen by the parse phase are compiled every time
//! and not cached.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::cache::{JitCache, LruTtlCache};
use super::compiled_query::{CompiledQuery, CompilerOptions};
use super::config::JitConfig;
use super::query_compiler::QueryCompiler;
use crate::core::document::DocumentId;
use crate::core::engine::{ExecuteFn, SubscribeFn};
use crate::core::execution::{ExecutionArgs, ExecutionResult, SubscriptionResult};
use crate::plugin_system::{
    AfterHook, DocumentReleaseHook, ExecuteHook, ExecuteHookContext, HookOutcome, ParseHook,
    ParseHookContext, ParseOutcome, Plugin, PluginContext, PluginError, PluginMetadata,
    SubscribeHook, SubscribeHookContext,
};

/// Decides per operation whether the compiled executor is installed.
#[async_trait]
pub trait ActivationPredicate: Send + Sync {
    async fn is_enabled(&self, args: &ExecutionArgs) -> Result<bool, PluginError>;
}

/// Adapter turning a synchronous closure into an [`ActivationPredicate`].
pub struct FnPredicate<F>(pub F);

#[async_trait]
impl<F> ActivationPredicate for FnPredicate<F>
where
    F: Fn(&ExecutionArgs) -> bool + Send + Sync,
{
    async fn is_enabled(&self, args: &ExecutionArgs) -> Result<bool, PluginError> {
        Ok((self.0)(args))
    }
}

/// Receives the failure result whenever compilation fails.
pub type OnCompileError = Arc<dyn Fn(&ExecutionResult) + Send + Sync>;

/// Programmatic configuration for [`JitPlugin`].
#[derive(Clone, Default)]
pub struct JitOptions {
    pub compiler_options: CompilerOptions,
    pub enable_if: Option<Arc<dyn ActivationPredicate>>,
    pub on_error: Option<OnCompileError>,
    pub cache: Option<Arc<dyn JitCache>>,
}

impl JitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiler options plus an [`LruTtlCache`] sized from `config.cache`.
    pub fn from_config(config: JitConfig) -> Self {
        Self {
            compiler_options: config.compiler_options,
            cache: Some(Arc::new(LruTtlCache::new(config.cache))),
            ..Self::default()
        }
    }

    pub fn compiler_options(mut self, options: CompilerOptions) -> Self {
        self.compiler_options = options;
        self
    }

    pub fn enable_if(mut self, predicate: Arc<dyn ActivationPredicate>) -> Self {
        self.enable_if = Some(predicate);
        self
    }

    pub fn enable_when<F>(self, predicate: F) -> Self
    where
        F: Fn(&ExecutionArgs) -> bool + Send + Sync + 'static,
    {
        self.enable_if(Arc::new(FnPredicate(predicate)))
    }

    pub fn on_error(mut self, callback: OnCompileError) -> Self {
        self.on_error = Some(callback);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn JitCache>) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl fmt::Debug for JitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JitOptions")
            .field("compiler_options", &self.compiler_options)
            .field("enable_if", &self.enable_if.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

/// Compiled-artifact cache plugin.
pub struct JitPlugin {
    metadata: PluginMetadata,
    hooks: Arc<JitHooks>,
}

struct JitHooks {
    inner: Arc<JitInner>,
}

struct JitInner {
    compiler: Arc<dyn QueryCompiler>,
    compiler_options: CompilerOptions,
    enable_if: Option<Arc<dyn ActivationPredicate>>,
    on_error: Option<OnCompileError>,
    cache: Arc<dyn JitCache>,
    document_sources: Arc<DashMap<DocumentId, Arc<str>>>,
}

impl JitPlugin {
    pub fn new(compiler: Arc<dyn QueryCompiler>, options: JitOptions) -> Self {
        let JitOptions {
            compiler_options,
            enable_if,
            on_error,
            cache,
        } = options;
        let cache = cache.unwrap_or_else(|| Arc::new(LruTtlCache::default()));
        Self {
            metadata: PluginMetadata::new("jit", "JIT Executor")
                .with_description("Executes operations through cached compiled artifacts"),
            hooks: Arc::new(JitHooks {
                inner: Arc::new(JitInner {
                    compiler,
                    compiler_options,
                    enable_if,
                    on_error,
                    cache,
                    document_sources: Arc::new(DashMap::new()),
                }),
            }),
        }
    }

    pub fn cache(&self) -> Arc<dyn JitCache> {
        Arc::clone(&self.hooks.inner.cache)
    }

    /// Number of documents whose source text is currently remembered.
    pub fn tracked_documents(&self) -> usize {
        self.hooks.inner.document_sources.len()
    }
}

impl Plugin for JitPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn register(&self, context: &mut PluginContext<'_>) -> Result<(), PluginError> {
        context.on_parse(self.hooks.clone())?;
        context.on_execute(self.hooks.clone())?;
        context.on_subscribe(self.hooks.clone())?;
        context.on_document_release(self.hooks.clone())?;
        Ok(())
    }
}

impl JitInner {
    async fn is_enabled(&self, args: &ExecutionArgs) -> Result<bool, PluginError> {
        match &self.enable_if {
            Some(predicate) => predicate.is_enabled(args).await,
            None => Ok(true),
        }
    }

    /// Cached artifact for the operation's document, compiling on a miss.
    async fn resolve(&self, args: &ExecutionArgs) -> CompiledQuery {
        let document_id = args.document.id();
        let source = self
            .document_sources
            .get(&document_id)
            .map(|entry| Arc::clone(entry.value()));

        if let Some(key) = &source {
            if let Some(compiled) = self.cache.get(key) {
                tracing::trace!(document_id = %document_id, "compiled query cache hit");
                return compiled;
            }
        }

        let compiled = match self
            .compiler
            .compile(
                &args.schema,
                &args.document,
                args.operation_name.as_deref(),
                &self.compiler_options,
            )
            .await
        {
            Ok(compiled) => compiled,
            Err(failure) => {
                match &self.on_error {
                    Some(on_error) => on_error(&failure),
                    None => tracing::error!(
                        document_id = %document_id,
                        errors = ?failure.errors,
                        "query compilation failed"
                    ),
                }
                CompiledQuery::failed(failure)
            }
        };

        if let Some(key) = source {
            self.cache.set(&key, compiled.clone());
        }
        compiled
    }
}

#[async_trait]
impl ParseHook for JitHooks {
    async fn on_parse(&self, ctx: &mut ParseHookContext<'_>) -> HookOutcome<ParseOutcome> {
        let body: Arc<str> = Arc::from(ctx.source().body.as_str());
        let sources = Arc::clone(&self.inner.document_sources);
        Ok(Some(AfterHook::observe(move |outcome: &mut ParseOutcome| {
            if let Ok(document) = outcome {
                sources.insert(document.id(), body);
            }
        })))
    }
}

#[async_trait]
impl ExecuteHook for JitHooks {
    async fn on_execute(&self, ctx: &mut ExecuteHookContext<'_>) -> HookOutcome<ExecutionResult> {
        if !self.inner.is_enabled(ctx.args()).await? {
            return Ok(None);
        }
        let inner = Arc::clone(&self.inner);
        ctx.set_execute_fn(move |_previous| {
            ExecuteFn::new(move |args: ExecutionArgs| {
                let inner = Arc::clone(&inner);
                async move {
                    let compiled = inner.resolve(&args).await;
                    Ok(compiled
                        .query(args.root_value, args.context_value, args.variable_values)
                        .await)
                }
            })
        })?;
        Ok(None)
    }
}

#[async_trait]
impl SubscribeHook for JitHooks {
    async fn on_subscribe(
        &self,
        ctx: &mut SubscribeHookContext<'_>,
    ) -> HookOutcome<SubscriptionResult> {
        if !self.inner.is_enabled(ctx.args()).await? {
            return Ok(None);
        }
        let inner = Arc::clone(&self.inner);
        ctx.set_subscribe_fn(move |_previous| {
            SubscribeFn::new(move |args: ExecutionArgs| {
                let inner = Arc::clone(&inner);
                async move {
                    let compiled = inner.resolve(&args).await;
                    Ok(compiled
                        .subscribe(args.root_value, args.context_value, args.variable_values)
                        .await)
                }
            })
        })?;
        Ok(None)
    }
}

impl DocumentReleaseHook for JitHooks {
    fn on_document_release(&self, document_id: DocumentId) {
        self.inner.document_sources.remove(&document_id);
    }
}
