use async_trait::async_trait;

use super::compiled_query::{CompiledQuery, CompilerOptions};
use crate::core::document::Document;
use crate::core::execution::ExecutionResult;
use crate::core::schema::Schema;

/// Turns a document into a [`CompiledQuery`].
///
/// A compilation failure is reported as the result the failed operation
/// should produce, typically one carrying only errors.
#[async_trait]
pub trait QueryCompiler: Send + Sync {
    async fn compile(
        &self,
        schema: &Schema,
        document: &Document,
        operation_name: Option<&str>,
        options: &CompilerOptions,
    ) -> Result<CompiledQuery, ExecutionResult>;
}
