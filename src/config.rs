//! Loading serde configuration from JSON or YAML text.

use serde::de::DeserializeOwned;

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Guess the format from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            _ => None,
        }
    }
}

pub fn load_config<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> PipelineResult<T> {
    match format {
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| PipelineError::Config(format!("JSON parse error: {}", e))),
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| PipelineError::Config(format!("YAML parse error: {}", e))),
    }
}
