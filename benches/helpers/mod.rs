use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::runtime::Runtime;

use hookline::compiler::CompilerOptions;
use hookline::{
    CompiledQuery, Document, ExecutionArgs, ExecutionResult, FakeIdGenerator, GraphError,
    OrchestratorBuilder, Orchestrator, PipelineResult, QueryCompiler, QueryEngine, Schema, Source,
};

pub struct BenchEngine;

#[async_trait]
impl QueryEngine for BenchEngine {
    fn parse(&self, source: &Source) -> Result<Value, GraphError> {
        Ok(Value::String(source.body.clone()))
    }

    fn validate(&self, _schema: &Schema, _document: &Document) -> Vec<GraphError> {
        Vec::new()
    }

    async fn execute(&self, args: ExecutionArgs) -> PipelineResult<ExecutionResult> {
        Ok(ExecutionResult::from_data(args.document.ast().clone()))
    }
}

pub struct BenchCompiler;

#[async_trait]
impl QueryCompiler for BenchCompiler {
    async fn compile(
        &self,
        _schema: &Schema,
        document: &Document,
        _operation_name: Option<&str>,
        _options: &CompilerOptions,
    ) -> Result<CompiledQuery, ExecutionResult> {
        let ast = document.ast().clone();
        Ok(CompiledQuery::new(move |_, _, _| {
            let data = ast.clone();
            async move { ExecutionResult::from_data(data) }
        }))
    }
}

pub fn bench_builder() -> OrchestratorBuilder {
    Orchestrator::builder(Arc::new(BenchEngine))
        .schema(Schema::new(json!({"query": "Query"})))
        .id_generator(Arc::new(FakeIdGenerator::new("bench")))
}

pub fn bench_runtime() -> Runtime {
    Runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build runtime")
}
