use std::sync::Arc;

use serde_json::Value;

/// Shared handle to the schema an operation runs against.
///
/// The definition is opaque to the orchestrator and only forwarded to the
/// engine and the compiler. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Schema {
    definition: Arc<Value>,
}

impl Schema {
    pub fn new(definition: Value) -> Self {
        Self {
            definition: Arc::new(definition),
        }
    }

    pub fn definition(&self) -> &Value {
        &self.definition
    }

    /// True when both handles point at the same schema instance.
    pub fn ptr_eq(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.definition, &other.definition)
    }
}
