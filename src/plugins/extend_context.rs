use std::sync::Arc;

use async_trait::async_trait;

use crate::core::execution::Context;
use crate::plugin_system::{
    ContextHook, ContextHookContext, HookOutcome, Plugin, PluginContext, PluginError,
    PluginMetadata,
};

type ExtendFn = dyn Fn(&Context) -> Result<Context, PluginError> + Send + Sync;

/// Merges extra fields into the context while it is being built.
pub struct ExtendContextPlugin {
    metadata: PluginMetadata,
    hook: Arc<ExtendContextHook>,
}

struct ExtendContextHook {
    extend: Box<ExtendFn>,
}

impl ExtendContextPlugin {
    /// `extend` sees the context built so far and returns the fields to merge.
    pub fn new<F>(extend: F) -> Self
    where
        F: Fn(&Context) -> Result<Context, PluginError> + Send + Sync + 'static,
    {
        Self {
            metadata: PluginMetadata::new("extend-context", "Extend Context"),
            hook: Arc::new(ExtendContextHook {
                extend: Box::new(extend),
            }),
        }
    }

    /// Merge a fixed set of fields.
    pub fn with_fields(fields: Context) -> Self {
        Self::new(move |_| Ok(fields.clone()))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.id = id.into();
        self
    }
}

impl Plugin for ExtendContextPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn register(&self, context: &mut PluginContext<'_>) -> Result<(), PluginError> {
        context.on_context_building(self.hook.clone())
    }
}

#[async_trait]
impl ContextHook for ExtendContextHook {
    async fn on_context_building(&self, ctx: &mut ContextHookContext<'_>) -> HookOutcome<Context> {
        let extension = (self.extend)(ctx.context())?;
        ctx.extend_context(extension);
        Ok(None)
    }
}
