//! Plugin context provided to plugins during registration.

use std::sync::Arc;

use super::error::PluginError;
use super::hooks::{
    ContextHook, DocumentReleaseHook, ExecuteHook, ParseHook, Phase, ResultHook, SubscribeHook,
    ValidateHook,
};
use super::registry::{HookEntry, PluginRegistryInner};
use super::traits::Plugin;
use crate::core::schema::Schema;

/// Mutable context passed to [`Plugin::register()`](super::Plugin::register).
///
/// Provides methods for registering one handler per phase, setting the
/// schema and adding further plugins.
pub struct PluginContext<'a> {
    registry_inner: &'a mut PluginRegistryInner,
    plugin_id: Arc<str>,
    added: Vec<Arc<dyn Plugin>>,
}

impl<'a> PluginContext<'a> {
    pub(crate) fn new(registry_inner: &'a mut PluginRegistryInner, plugin_id: Arc<str>) -> Self {
        Self {
            registry_inner,
            plugin_id,
            added: Vec::new(),
        }
    }

    /// Return the id of the plugin currently being registered.
    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// Emit a structured log line tagged with the plugin id.
    pub fn log(&self, level: tracing::Level, message: &str) {
        match level {
            tracing::Level::TRACE => tracing::trace!(plugin_id = %self.plugin_id, message = %message),
            tracing::Level::DEBUG => tracing::debug!(plugin_id = %self.plugin_id, message = %message),
            tracing::Level::INFO => tracing::info!(plugin_id = %self.plugin_id, message = %message),
            tracing::Level::WARN => tracing::warn!(plugin_id = %self.plugin_id, message = %message),
            tracing::Level::ERROR => tracing::error!(plugin_id = %self.plugin_id, message = %message),
        }
    }

    pub fn on_parse(&mut self, handler: Arc<dyn ParseHook>) -> Result<(), PluginError> {
        let entry = self.entry(handler);
        push_unique(&mut self.registry_inner.parse, entry, Phase::Parse)
    }

    pub fn on_validate(&mut self, handler: Arc<dyn ValidateHook>) -> Result<(), PluginError> {
        let entry = self.entry(handler);
        push_unique(&mut self.registry_inner.validate, entry, Phase::Validate)
    }

    pub fn on_context_building(&mut self, handler: Arc<dyn ContextHook>) -> Result<(), PluginError> {
        let entry = self.entry(handler);
        push_unique(
            &mut self.registry_inner.context_building,
            entry,
            Phase::ContextBuilding,
        )
    }

    pub fn on_execute(&mut self, handler: Arc<dyn ExecuteHook>) -> Result<(), PluginError> {
        let entry = self.entry(handler);
        push_unique(&mut self.registry_inner.execute, entry, Phase::Execute)
    }

    pub fn on_subscribe(&mut self, handler: Arc<dyn SubscribeHook>) -> Result<(), PluginError> {
        let entry = self.entry(handler);
        push_unique(&mut self.registry_inner.subscribe, entry, Phase::Subscribe)
    }

    pub fn on_result(&mut self, handler: Arc<dyn ResultHook>) -> Result<(), PluginError> {
        let entry = self.entry(handler);
        push_unique(&mut self.registry_inner.result, entry, Phase::Result)
    }

    pub fn on_document_release(
        &mut self,
        handler: Arc<dyn DocumentReleaseHook>,
    ) -> Result<(), PluginError> {
        if self
            .registry_inner
            .document_release
            .iter()
            .any(|existing| existing.plugin_id == self.plugin_id)
        {
            return Err(PluginError::ConflictError(format!(
                "Plugin '{}' already registered a document release hook",
                self.plugin_id
            )));
        }
        let entry = self.entry(handler);
        self.registry_inner.document_release.push(entry);
        Ok(())
    }

    /// Set the schema operations run against. Later plugins override earlier
    /// ones.
    pub fn set_schema(&mut self, schema: Schema) {
        self.registry_inner.schema = Some(schema);
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.registry_inner.schema.as_ref()
    }

    /// Register `plugin` right after the plugin currently being registered.
    pub fn add_plugin(&mut self, plugin: Arc<dyn Plugin>) {
        self.added.push(plugin);
    }

    pub(crate) fn into_added(self) -> Vec<Arc<dyn Plugin>> {
        self.added
    }

    fn entry<H: ?Sized>(&self, handler: Arc<H>) -> HookEntry<H> {
        HookEntry {
            plugin_id: Arc::clone(&self.plugin_id),
            handler,
        }
    }
}

fn push_unique<H: ?Sized>(
    hooks: &mut Vec<HookEntry<H>>,
    entry: HookEntry<H>,
    phase: Phase,
) -> Result<(), PluginError> {
    if hooks.iter().any(|existing| existing.plugin_id == entry.plugin_id) {
        return Err(PluginError::ConflictError(format!(
            "Plugin '{}' already registered a {} hook",
            entry.plugin_id, phase
        )));
    }
    hooks.push(entry);
    Ok(())
}
