//! Compiled-artifact execution: the compiler boundary, the artifact cache
//! and the plugin that substitutes the executor.

pub mod cache;
pub mod compiled_query;
pub mod config;
pub mod jit;
pub mod query_compiler;

pub use cache::{
    CacheConfig, CacheStats, JitCache, LruTtlCache, DEFAULT_MAX_ENTRIES, DEFAULT_TTL_MS,
};
pub use compiled_query::{CompiledQuery, CompilerOptions};
pub use config::JitConfig;
pub use jit::{
    ActivationPredicate, FnPredicate, JitOptions, JitPlugin, OnCompileError,
};
pub use query_compiler::QueryCompiler;
