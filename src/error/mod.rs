//! Error types for the orchestrator.
//!
//! - [`PipelineError`] — Errors surfaced to the caller of an operation.
//! - [`PluginError`](crate::plugin_system::PluginError) — Errors raised by
//!   plugins, wrapped into [`PipelineError`] with the plugin id and phase.

pub mod pipeline_error;

pub use pipeline_error::PipelineError;

/// Convenience alias for orchestrator-level results.
pub type PipelineResult<T> = Result<T, PipelineError>;
