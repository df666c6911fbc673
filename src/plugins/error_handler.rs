use std::sync::Arc;

use async_trait::async_trait;

use crate::core::execution::{ExecutionArgs, ExecutionResult, GraphError};
use crate::plugin_system::{Plugin, PluginContext, PluginError, PluginMetadata, ResultHook};

type ErrorCallback = dyn Fn(&[GraphError], &ExecutionArgs) + Send + Sync;

/// Invokes a callback for every result that carries errors, including each
/// erroneous subscription event.
pub struct ErrorHandlerPlugin {
    metadata: PluginMetadata,
    hook: Arc<ErrorHandlerHook>,
}

struct ErrorHandlerHook {
    callback: Box<ErrorCallback>,
}

impl ErrorHandlerPlugin {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&[GraphError], &ExecutionArgs) + Send + Sync + 'static,
    {
        Self {
            metadata: PluginMetadata::new("error-handler", "Error Handler"),
            hook: Arc::new(ErrorHandlerHook {
                callback: Box::new(callback),
            }),
        }
    }
}

impl Plugin for ErrorHandlerPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn register(&self, context: &mut PluginContext<'_>) -> Result<(), PluginError> {
        context.on_result(self.hook.clone())
    }
}

#[async_trait]
impl ResultHook for ErrorHandlerHook {
    async fn on_result(
        &self,
        args: &ExecutionArgs,
        result: &mut ExecutionResult,
    ) -> Result<(), PluginError> {
        if result.has_errors() {
            (self.callback)(result.errors.as_slice(), args);
        }
        Ok(())
    }
}
