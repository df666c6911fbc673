use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use serde_json::{Map, Value};

use crate::core::execution::{Context, ExecutionResult, SubscriptionResult, Variables};

/// Options forwarded verbatim to the compiler.
pub type CompilerOptions = Map<String, Value>;

type QueryFn = dyn Fn(Value, Context, Variables) -> BoxFuture<'static, ExecutionResult> + Send + Sync;
type SubscribeQueryFn =
    dyn Fn(Value, Context, Variables) -> BoxFuture<'static, SubscriptionResult> + Send + Sync;

/// Compiled artifact for one operation document.
///
/// Cloning shares the underlying functions, so a clone handed out by the
/// cache is the same artifact.
#[derive(Clone)]
pub struct CompiledQuery {
    query: Arc<QueryFn>,
    subscribe: Option<Arc<SubscribeQueryFn>>,
}

impl CompiledQuery {
    pub fn new<F, Fut>(query: F) -> Self
    where
        F: Fn(Value, Context, Variables) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ExecutionResult> + Send + 'static,
    {
        Self {
            query: Arc::new(move |root, context, variables| {
                query(root, context, variables).boxed()
            }),
            subscribe: None,
        }
    }

    pub fn with_subscribe<F, Fut>(mut self, subscribe: F) -> Self
    where
        F: Fn(Value, Context, Variables) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SubscriptionResult> + Send + 'static,
    {
        self.subscribe = Some(Arc::new(move |root, context, variables| {
            subscribe(root, context, variables).boxed()
        }));
        self
    }

    /// Artifact standing in for a failed compilation: every call yields
    /// `failure` again.
    pub fn failed(failure: ExecutionResult) -> Self {
        Self::new(move |_, _, _| future::ready(failure.clone()))
    }

    pub fn has_subscribe(&self) -> bool {
        self.subscribe.is_some()
    }

    pub async fn query(&self, root: Value, context: Context, variables: Variables) -> ExecutionResult {
        (self.query)(root, context, variables).await
    }

    /// Run the subscription entry point, falling back to `query` when the
    /// artifact has none.
    pub async fn subscribe(
        &self,
        root: Value,
        context: Context,
        variables: Variables,
    ) -> SubscriptionResult {
        match &self.subscribe {
            Some(subscribe) => subscribe(root, context, variables).await,
            None => SubscriptionResult::Single(self.query(root, context, variables).await),
        }
    }

    /// True when both handles share the same compiled functions.
    pub fn ptr_eq(&self, other: &CompiledQuery) -> bool {
        Arc::ptr_eq(&self.query, &other.query)
    }
}

impl fmt::Debug for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledQuery")
            .field("has_subscribe", &self.has_subscribe())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::execution::GraphError;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_failed_artifact_replays_failure() {
        let failure = ExecutionResult::from_errors(vec![GraphError::new("Unknown field")]);
        let compiled = CompiledQuery::failed(failure.clone());
        assert_eq!(
            compiled.query(Value::Null, Context::new(), Variables::new()).await,
            failure
        );
        assert_eq!(
            compiled.query(Value::Null, Context::new(), Variables::new()).await,
            failure
        );
    }

    #[tokio::test]
    async fn test_subscribe_falls_back_to_query() {
        let compiled = CompiledQuery::new(|root, _, _| async move { ExecutionResult::from_data(root) });
        assert!(!compiled.has_subscribe());
        match compiled
            .subscribe(Value::from(5), Context::new(), Variables::new())
            .await
        {
            SubscriptionResult::Single(result) => assert_eq!(result.data, Some(Value::from(5))),
            other => panic!("Expected Single, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_subscribe_entry_point_used_when_present() {
        let compiled = CompiledQuery::new(|_, _, _| async { ExecutionResult::default() })
            .with_subscribe(|_, _, _| async {
                SubscriptionResult::Stream(
                    futures::stream::iter(vec![
                        ExecutionResult::from_data(Value::from(1)),
                        ExecutionResult::from_data(Value::from(2)),
                    ])
                    .boxed(),
                )
            });
        let events: Vec<_> = compiled
            .subscribe(Value::Null, Context::new(), Variables::new())
            .await
            .into_stream()
            .collect()
            .await;
        assert_eq!(events.len(), 2);

        let clone = compiled.clone();
        assert!(clone.ptr_eq(&compiled));
    }
}
