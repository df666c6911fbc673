use serde::{Deserialize, Serialize};

use super::cache::CacheConfig;
use super::compiled_query::CompilerOptions;

/// Declarative part of the JIT plugin setup, loadable with
/// [`load_config`](crate::config::load_config).
///
/// ```yaml
/// compiler_options:
///   custom_json_serializer: true
/// cache:
///   max_entries: 500
///   ttl_ms: 60000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitConfig {
    pub compiler_options: CompilerOptions,
    pub cache: CacheConfig,
}
