use std::sync::Arc;

use crate::error::{PipelineError, PipelineResult};
use crate::plugin_system::{AfterHook, Phase};

/// After-hooks collected while one phase was dispatched.
///
/// Callbacks are pushed in registration order and unwound in reverse, so
/// the first-registered plugin sees the final output last.
pub struct AfterChain<T> {
    phase: Phase,
    callbacks: Vec<(Arc<str>, AfterHook<T>)>,
}

impl<T: Send + 'static> AfterChain<T> {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            callbacks: Vec::new(),
        }
    }

    pub fn push(&mut self, plugin_id: &Arc<str>, callback: Option<AfterHook<T>>) {
        if let Some(callback) = callback {
            self.callbacks.push((Arc::clone(plugin_id), callback));
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run every callback, last-pushed first. A failing callback stops the
    /// unwind; the remaining ones never run.
    pub async fn unwind(self, mut value: T) -> PipelineResult<T> {
        let phase = self.phase;
        for (plugin_id, callback) in self.callbacks.into_iter().rev() {
            value = callback
                .call(value)
                .await
                .map_err(|source| PipelineError::after_hook(&plugin_id, phase, source))?;
        }
        Ok(value)
    }
}
