//! The query engine boundary and the substitutable executor functions.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use super::document::{Document, Source};
use super::execution::{ExecutionArgs, ExecutionResult, GraphError, SubscriptionResult};
use super::schema::Schema;
use crate::error::PipelineResult;

/// Parser, validator and executor supplied by the caller.
///
/// The orchestrator never interprets documents itself; every phase's
/// underlying operation is delegated here.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Parse source text into an AST.
    fn parse(&self, source: &Source) -> Result<Value, GraphError>;

    /// Validate a document against a schema; an empty list means valid.
    fn validate(&self, schema: &Schema, document: &Document) -> Vec<GraphError>;

    async fn execute(&self, args: ExecutionArgs) -> PipelineResult<ExecutionResult>;

    async fn subscribe(&self, args: ExecutionArgs) -> PipelineResult<SubscriptionResult> {
        self.execute(args).await.map(SubscriptionResult::Single)
    }
}

type ExecuteFuture = BoxFuture<'static, PipelineResult<ExecutionResult>>;
type SubscribeFuture = BoxFuture<'static, PipelineResult<SubscriptionResult>>;

/// Executor implementation installed for an operation.
#[derive(Clone)]
pub struct ExecuteFn(Arc<dyn Fn(ExecutionArgs) -> ExecuteFuture + Send + Sync>);

impl ExecuteFn {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(ExecutionArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PipelineResult<ExecutionResult>> + Send + 'static,
    {
        Self(Arc::new(move |args| f(args).boxed()))
    }

    /// The engine's ordinary executor.
    pub fn from_engine(engine: Arc<dyn QueryEngine>) -> Self {
        Self::new(move |args| {
            let engine = Arc::clone(&engine);
            async move { engine.execute(args).await }
        })
    }

    pub async fn call(&self, args: ExecutionArgs) -> PipelineResult<ExecutionResult> {
        (self.0)(args).await
    }
}

impl fmt::Debug for ExecuteFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExecuteFn")
    }
}

/// Subscriber implementation installed for an operation.
#[derive(Clone)]
pub struct SubscribeFn(Arc<dyn Fn(ExecutionArgs) -> SubscribeFuture + Send + Sync>);

impl SubscribeFn {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(ExecutionArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PipelineResult<SubscriptionResult>> + Send + 'static,
    {
        Self(Arc::new(move |args| f(args).boxed()))
    }

    /// The engine's ordinary subscriber.
    pub fn from_engine(engine: Arc<dyn QueryEngine>) -> Self {
        Self::new(move |args| {
            let engine = Arc::clone(&engine);
            async move { engine.subscribe(args).await }
        })
    }

    pub async fn call(&self, args: ExecutionArgs) -> PipelineResult<SubscriptionResult> {
        (self.0)(args).await
    }
}

impl fmt::Debug for SubscribeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SubscribeFn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoEngine;

    #[async_trait]
    impl QueryEngine for EchoEngine {
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

    fn args_for(body: &str) -> ExecutionArgs {
        ExecutionArgs::new(
            Schema::new(Value::Null),
            Arc::new(Document::new(Value::String(body.into()))),
        )
    }

    #[tokio::test]
    async fn test_execute_fn_from_engine() {
        let execute = ExecuteFn::from_engine(Arc::new(EchoEngine));
        let result = execute.call(args_for("{ a }")).await.unwrap();
        assert_eq!(result.data, Some(Value::String("{ a }".into())));
    }

    #[tokio::test]
    async fn test_default_subscribe_wraps_execute() {
        let subscribe = SubscribeFn::from_engine(Arc::new(EchoEngine));
        match subscribe.call(args_for("subscription { a }")).await.unwrap() {
            SubscriptionResult::Single(result) => {
                assert_eq!(result.data, Some(Value::String("subscription { a }".into())));
            }
            other => panic!("Expected Single, got {:?}", other),
        }
    }
}
