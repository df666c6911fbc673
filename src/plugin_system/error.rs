//! Error types for the plugin system.

use thiserror::Error;

/// Errors raised by plugins during registration or while a hook runs.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Plugin conflict: {0}")]
    ConflictError(String),
    #[error("Hook failed: {0}")]
    HookFailed(String),
    #[error("Substitution rejected: {0}")]
    SubstitutionRejected(String),
    #[error("Activation predicate failed: {0}")]
    PredicateFailed(String),
    #[error("Register error: {0}")]
    RegisterError(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_error_display() {
        assert!(PluginError::InvalidConfig("bad".into()).to_string().contains("bad"));
        assert!(PluginError::ConflictError("dup".into()).to_string().contains("dup"));
        assert!(PluginError::HookFailed("boom".into()).to_string().contains("boom"));
        assert!(PluginError::SubstitutionRejected("twice".into())
            .to_string()
            .contains("twice"));
        assert!(PluginError::PredicateFailed("nope".into()).to_string().contains("nope"));
        assert!(PluginError::RegisterError("err".into()).to_string().contains("err"));
    }

    #[test]
    fn test_plugin_error_from_anyhow() {
        let err: PluginError = anyhow::anyhow!("upstream unavailable").into();
        assert_eq!(err.to_string(), "upstream unavailable");
    }
}
