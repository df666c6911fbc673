use crate::core::schema::Schema;
use crate::plugin_system::{Plugin, PluginContext, PluginError, PluginMetadata};

/// Sets the schema every operation runs against.
///
/// A schema set this way overrides the builder default; when several schema
/// plugins are registered the last one wins.
pub struct SchemaPlugin {
    metadata: PluginMetadata,
    schema: Schema,
}

impl SchemaPlugin {
    pub fn new(schema: Schema) -> Self {
        Self {
            metadata: PluginMetadata::new("schema", "Schema")
                .with_description("Provides the operation schema"),
            schema,
        }
    }

    /// Use a distinct plugin id, needed when registering more than one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.id = id.into();
        self
    }
}

impl Plugin for SchemaPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn register(&self, context: &mut PluginContext<'_>) -> Result<(), PluginError> {
        context.set_schema(self.schema.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin_system::PluginRegistry;
    use std::sync::Arc;

    #[test]
    fn test_last_schema_plugin_wins() {
        let first = Schema::new(serde_json::json!({"v": 1}));
        let second = Schema::new(serde_json::json!({"v": 2}));
        let mut registry = PluginRegistry::new();
        registry
            .register_all(vec![
                Arc::new(SchemaPlugin::new(first)),
                Arc::new(SchemaPlugin::new(second.clone()).with_id("schema-2")),
            ])
            .unwrap();
        assert!(registry.schema().unwrap().ptr_eq(&second));
    }
}
