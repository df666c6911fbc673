//! # Hookline — plugin hooks for query pipelines
//!
//! `hookline` runs a query operation through a fixed sequence of phases
//! (parse, validate, context building, execute or subscribe, result) and lets
//! an ordered list of plugins observe and rewrite each one:
//!
//! - **Ordered dispatch**: before-hooks run in registration order, the
//!   after-hooks they return unwind in reverse.
//! - **Executor substitution**: execute and subscribe hooks can layer a new
//!   implementation over the one currently installed.
//! - **Compiled-artifact cache**: the `jit` feature adds a plugin that runs
//!   operations through compiled artifacts cached by source text, with LRU
//!   and TTL eviction.
//! - **Ready-made plugins**: schema, logging, timing, error reporting and
//!   context extension.
//!
//! The parser, validator, executor and compiler are supplied by the caller
//! through [`QueryEngine`] and [`QueryCompiler`](compiler::QueryCompiler).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hookline::{Orchestrator, OperationRequest, QueryEngine, Schema};
//! use hookline::plugins::LoggerPlugin;
//!
//! # async fn demo(engine: Arc<dyn QueryEngine>) -> hookline::PipelineResult<()> {
//! let orchestrator = Orchestrator::builder(engine)
//!     .schema(Schema::new(serde_json::json!({"query": "Query"})))
//!     .plugin(LoggerPlugin::new())
//!     .build()?;
//! let result = orchestrator.run(OperationRequest::new("{ hello }")).await?;
//! println!("{:?}", result.data);
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `jit` (default) | Compiled-artifact cache plugin and its LRU/TTL cache |

pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod plugin_system;
pub mod plugins;

#[cfg(feature = "jit")]
pub mod compiler;

pub use crate::config::{load_config, ConfigFormat};
pub use crate::core::{
    Context, Document, DocumentId, ExecuteFn, ExecutionArgs, ExecutionResult, FakeIdGenerator,
    FakeTimeProvider, GraphError, IdGenerator, QueryEngine, RealIdGenerator, RealTimeProvider,
    Schema, Source, SubscribeFn, SubscriptionResult, TimeProvider, Variables,
};
pub use crate::error::{PipelineError, PipelineResult};
pub use crate::pipeline::{Operation, OperationRequest, Orchestrator, OrchestratorBuilder};
pub use crate::plugin_system::{
    AfterHook, HookOutcome, Phase, Plugin, PluginContext, PluginError, PluginMetadata,
    PluginRegistry,
};

#[cfg(feature = "jit")]
pub use crate::compiler::{
    CacheConfig, CompiledQuery, JitCache, JitConfig, JitOptions, JitPlugin, LruTtlCache,
    QueryCompiler,
};
