use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use super::context::PluginContext;
use super::error::PluginError;
use super::hooks::{
    ContextHook, DocumentReleaseHook, ExecuteHook, ParseHook, Phase, ResultHook, SubscribeHook,
    ValidateHook,
};
use super::traits::{Plugin, PluginMetadata};
use crate::core::schema::Schema;

/// A hook handler tagged with the id of the plugin that registered it.
pub struct HookEntry<H: ?Sized> {
    pub(crate) plugin_id: Arc<str>,
    pub(crate) handler: Arc<H>,
}

impl<H: ?Sized> HookEntry<H> {
    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }
}

impl<H: ?Sized> Clone for HookEntry<H> {
    fn clone(&self) -> Self {
        Self {
            plugin_id: Arc::clone(&self.plugin_id),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<H: ?Sized> fmt::Debug for HookEntry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookEntry")
            .field("plugin_id", &self.plugin_id)
            .finish()
    }
}

#[derive(Default)]
pub(crate) struct PluginRegistryInner {
    pub(crate) parse: Vec<HookEntry<dyn ParseHook>>,
    pub(crate) validate: Vec<HookEntry<dyn ValidateHook>>,
    pub(crate) context_building: Vec<HookEntry<dyn ContextHook>>,
    pub(crate) execute: Vec<HookEntry<dyn ExecuteHook>>,
    pub(crate) subscribe: Vec<HookEntry<dyn SubscribeHook>>,
    pub(crate) result: Vec<HookEntry<dyn ResultHook>>,
    pub(crate) document_release: Vec<HookEntry<dyn DocumentReleaseHook>>,
    pub(crate) schema: Option<Schema>,
}

/// Ordered set of registered plugins and their per-phase handlers.
///
/// Handlers for each phase are kept in plugin registration order; that order
/// is the dispatch order.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
    plugin_ids: HashSet<String>,
    inner: PluginRegistryInner,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `plugins` in order. Plugins added by another plugin during
    /// registration are registered immediately after it.
    pub fn register_all(&mut self, plugins: Vec<Arc<dyn Plugin>>) -> Result<(), PluginError> {
        let mut queue: VecDeque<Arc<dyn Plugin>> = plugins.into();
        while let Some(plugin) = queue.pop_front() {
            let added = self.register_plugin(plugin)?;
            for extra in added.into_iter().rev() {
                queue.push_front(extra);
            }
        }
        Ok(())
    }

    pub fn plugin_metadata(&self) -> Vec<PluginMetadata> {
        self.plugins
            .iter()
            .map(|plugin| plugin.metadata().clone())
            .collect()
    }

    /// Number of plugins with a handler for `phase`.
    pub fn hook_count(&self, phase: Phase) -> usize {
        match phase {
            Phase::Parse => self.inner.parse.len(),
            Phase::Validate => self.inner.validate.len(),
            Phase::ContextBuilding => self.inner.context_building.len(),
            Phase::Execute => self.inner.execute.len(),
            Phase::Subscribe => self.inner.subscribe.len(),
            Phase::Result => self.inner.result.len(),
        }
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.inner.schema.as_ref()
    }

    pub(crate) fn parse_hooks(&self) -> &[HookEntry<dyn ParseHook>] {
        &self.inner.parse
    }

    pub(crate) fn validate_hooks(&self) -> &[HookEntry<dyn ValidateHook>] {
        &self.inner.validate
    }

    pub(crate) fn context_hooks(&self) -> &[HookEntry<dyn ContextHook>] {
        &self.inner.context_building
    }

    pub(crate) fn execute_hooks(&self) -> &[HookEntry<dyn ExecuteHook>] {
        &self.inner.execute
    }

    pub(crate) fn subscribe_hooks(&self) -> &[HookEntry<dyn SubscribeHook>] {
        &self.inner.subscribe
    }

    pub(crate) fn result_hooks(&self) -> &[HookEntry<dyn ResultHook>] {
        &self.inner.result
    }

    pub(crate) fn document_release_hooks(&self) -> &[HookEntry<dyn DocumentReleaseHook>] {
        &self.inner.document_release
    }

    fn register_plugin(
        &mut self,
        plugin: Arc<dyn Plugin>,
    ) -> Result<Vec<Arc<dyn Plugin>>, PluginError> {
        let metadata = plugin.metadata().clone();
        if self.plugin_ids.contains(&metadata.id) {
            return Err(PluginError::ConflictError(format!(
                "Plugin '{}' already registered",
                metadata.id
            )));
        }

        let mut context = PluginContext::new(&mut self.inner, Arc::from(metadata.id.as_str()));
        plugin.register(&mut context)?;
        let added = context.into_added();

        tracing::debug!(
            plugin_id = %metadata.id,
            plugin_name = %metadata.name,
            added = added.len(),
            "plugin registered"
        );
        self.plugin_ids.insert(metadata.id);
        self.plugins.push(plugin);
        Ok(added)
    }
}
