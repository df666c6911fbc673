//! Orchestrator-level error types.

use thiserror::Error;

use crate::core::execution::GraphError;
use crate::plugin_system::{Phase, PluginError};

/// Errors surfaced to the caller of an [`Operation`](crate::pipeline::Operation).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Hook failed: plugin={plugin}, phase={phase}, error={source}")]
    HookFailed {
        plugin: String,
        phase: Phase,
        #[source]
        source: PluginError,
    },
    #[error("After hook failed: plugin={plugin}, phase={phase}, error={source}")]
    AfterHookFailed {
        plugin: String,
        phase: Phase,
        #[source]
        source: PluginError,
    },
    #[error("Syntax error: {0}")]
    Syntax(GraphError),
    #[error("Schema not set")]
    MissingSchema,
    #[error("Execution error: {0}")]
    Execution(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),
}

impl PipelineError {
    pub(crate) fn hook(plugin: &str, phase: Phase, source: PluginError) -> Self {
        PipelineError::HookFailed {
            plugin: plugin.to_string(),
            phase,
            source,
        }
    }

    pub(crate) fn after_hook(plugin: &str, phase: Phase, source: PluginError) -> Self {
        PipelineError::AfterHookFailed {
            plugin: plugin.to_string(),
            phase,
            source,
        }
    }

    /// Name of the plugin whose hook failed, if any.
    pub fn plugin(&self) -> Option<&str> {
        match self {
            PipelineError::HookFailed { plugin, .. }
            | PipelineError::AfterHookFailed { plugin, .. } => Some(plugin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::hook(
            "auth",
            Phase::Execute,
            PluginError::HookFailed("denied".into()),
        );
        assert_eq!(
            err.to_string(),
            "Hook failed: plugin=auth, phase=execute, error=Hook failed: denied"
        );
        assert_eq!(err.plugin(), Some("auth"));

        assert_eq!(PipelineError::MissingSchema.to_string(), "Schema not set");
        assert_eq!(
            PipelineError::Syntax(GraphError::new("Unexpected <EOF>")).to_string(),
            "Syntax error: Unexpected <EOF>"
        );
        assert!(PipelineError::Execution("x".into()).plugin().is_none());
    }

    #[test]
    fn test_after_hook_error_carries_phase() {
        let err = PipelineError::after_hook(
            "timing",
            Phase::Parse,
            PluginError::HookFailed("clock".into()),
        );
        match err {
            PipelineError::AfterHookFailed { plugin, phase, .. } => {
                assert_eq!(plugin, "timing");
                assert_eq!(phase, Phase::Parse);
            }
            other => panic!("Expected AfterHookFailed, got {:?}", other),
        }
    }
}
