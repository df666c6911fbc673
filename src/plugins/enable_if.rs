use std::sync::Arc;

use crate::plugin_system::Plugin;

/// Build the plugin only when `condition` holds.
///
/// The result plugs straight into
/// [`OrchestratorBuilder::optional_plugin`](crate::pipeline::OrchestratorBuilder::optional_plugin).
pub fn enable_if<P, F>(condition: bool, factory: F) -> Option<Arc<dyn Plugin>>
where
    P: Plugin + 'static,
    F: FnOnce() -> P,
{
    if condition {
        Some(Arc::new(factory()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::Schema;
    use crate::plugins::SchemaPlugin;

    #[test]
    fn test_enable_if() {
        let mut built = 0;
        let off = enable_if(false, || {
            built += 1;
            SchemaPlugin::new(Schema::new(serde_json::Value::Null))
        });
        assert!(off.is_none());
        assert_eq!(built, 0);

        let on = enable_if(true, || SchemaPlugin::new(Schema::new(serde_json::Value::Null)));
        assert_eq!(on.unwrap().metadata().id, "schema");
    }
}
