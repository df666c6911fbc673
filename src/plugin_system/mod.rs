//! Plugin contract for the orchestrator.
//!
//! Plugins register per-phase hook handlers through a [`PluginContext`]
//! while the [`PluginRegistry`] is built. A handler runs before the phase's
//! underlying operation and may return an [`AfterHook`] that sees the
//! operation's output. Execute and subscribe handlers may also replace the
//! executor through an [`FnSlot`].
//!
//! See [`Plugin`] for the trait every plugin implements and [`Phase`] for the
//! dispatch points.

pub mod context;
pub mod error;
pub mod hooks;
pub mod registry;
pub mod substitution;
pub mod traits;

pub use context::PluginContext;
pub use error::PluginError;
pub use hooks::{
    AfterHook, ContextHook, ContextHookContext, DocumentReleaseHook, ExecuteHook,
    ExecuteHookContext, HookOutcome, ParseHook, ParseHookContext, ParseOutcome, Phase, ResultHook,
    SubscribeHook, SubscribeHookContext, ValidateHook, ValidateHookContext, ValidationOutcome,
};
pub use registry::{HookEntry, PluginRegistry};
pub use substitution::FnSlot;
pub use traits::{Plugin, PluginMetadata};
