use super::context::PluginContext;
use super::error::PluginError;

/// 插件元数据
#[derive(Debug, Clone)]
pub struct PluginMetadata {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
}

impl PluginMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: String::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// 统一插件接口
///
/// A plugin declares which phases it participates in by registering hook
/// handlers on the [`PluginContext`]; phases it leaves alone cost nothing at
/// dispatch time.
pub trait Plugin: Send + Sync {
    fn metadata(&self) -> &PluginMetadata;

    fn register(&self, context: &mut PluginContext<'_>) -> Result<(), PluginError>;
}
