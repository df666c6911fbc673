use std::sync::Arc;

use serde_json::Value;

use super::operation::Operation;
use crate::core::document::Source;
use crate::core::engine::QueryEngine;
use crate::core::execution::{
    Context, ExecutionArgs, ExecutionResult, SubscriptionResult, Variables,
};
use crate::core::runtime_context::{IdGenerator, RealIdGenerator};
use crate::core::schema::Schema;
use crate::error::{PipelineError, PipelineResult};
use crate::plugin_system::{Phase, Plugin, PluginMetadata, PluginRegistry};

pub(crate) struct OrchestratorInner {
    pub(crate) engine: Arc<dyn QueryEngine>,
    pub(crate) registry: PluginRegistry,
    pub(crate) schema: Option<Schema>,
    pub(crate) id_generator: Arc<dyn IdGenerator>,
}

/// Plugin hook orchestrator for one engine and one ordered plugin list.
///
/// Cloning is cheap; every clone shares the same registry.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<OrchestratorInner>,
}

impl Orchestrator {
    pub fn builder(engine: Arc<dyn QueryEngine>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            engine,
            plugins: Vec::new(),
            schema: None,
            id_generator: None,
        }
    }

    /// Start a new operation with an empty context.
    pub fn operation(&self) -> Operation {
        self.operation_with_context(Context::new())
    }

    pub fn operation_with_context(&self, context: Context) -> Operation {
        Operation::new(Arc::clone(&self.inner), context)
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.inner.schema.as_ref()
    }

    pub fn plugin_metadata(&self) -> Vec<PluginMetadata> {
        self.inner.registry.plugin_metadata()
    }

    pub fn hook_count(&self, phase: Phase) -> usize {
        self.inner.registry.hook_count(phase)
    }

    /// Drive parse, validate, context building and execute for `request`.
    ///
    /// Syntax and validation errors are returned as result errors; hook
    /// failures and executor failures are returned as `Err`.
    pub async fn run(&self, request: OperationRequest) -> PipelineResult<ExecutionResult> {
        let mut operation = self.operation();
        let args = match prepare(&mut operation, request).await? {
            Prepared::Ready(args) => args,
            Prepared::Rejected(result) => return Ok(result),
        };
        operation.execute(args).await
    }

    /// Same as [`run`](Self::run) but ends in the subscribe phase.
    pub async fn run_subscription(
        &self,
        request: OperationRequest,
    ) -> PipelineResult<SubscriptionResult> {
        let mut operation = self.operation();
        let args = match prepare(&mut operation, request).await? {
            Prepared::Ready(args) => args,
            Prepared::Rejected(result) => return Ok(SubscriptionResult::Single(result)),
        };
        operation.subscribe(args).await
    }
}

enum Prepared {
    Ready(ExecutionArgs),
    Rejected(ExecutionResult),
}

async fn prepare(operation: &mut Operation, request: OperationRequest) -> PipelineResult<Prepared> {
    let OperationRequest {
        source,
        operation_name,
        variables,
        root_value,
        context,
    } = request;

    let schema = operation.schema()?;
    let document = match operation.parse(source).await {
        Ok(document) => document,
        Err(PipelineError::Syntax(error)) => {
            return Ok(Prepared::Rejected(ExecutionResult::from_errors(vec![error])))
        }
        Err(other) => return Err(other),
    };

    let errors = operation.validate(&schema, &document).await?;
    if !errors.is_empty() {
        return Ok(Prepared::Rejected(ExecutionResult::from_errors(errors)));
    }

    let context = operation.build_context(context).await?;
    let args = ExecutionArgs::new(schema, document)
        .with_operation_name(operation_name)
        .with_root_value(root_value)
        .with_context(context)
        .with_variables(variables);
    Ok(Prepared::Ready(args))
}

pub struct OrchestratorBuilder {
    engine: Arc<dyn QueryEngine>,
    plugins: Vec<Arc<dyn Plugin>>,
    schema: Option<Schema>,
    id_generator: Option<Arc<dyn IdGenerator>>,
}

impl OrchestratorBuilder {
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    pub fn plugin_arc(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn plugins(mut self, plugins: impl IntoIterator<Item = Arc<dyn Plugin>>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    /// Accept the output of [`enable_if`](crate::plugins::enable_if); `None`
    /// is skipped.
    pub fn optional_plugin(mut self, plugin: Option<Arc<dyn Plugin>>) -> Self {
        self.plugins.extend(plugin);
        self
    }

    /// Default schema; a schema set by a plugin takes precedence.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(id_generator);
        self
    }

    pub fn build(self) -> PipelineResult<Orchestrator> {
        let mut registry = PluginRegistry::new();
        registry.register_all(self.plugins)?;

        let schema = registry.schema().cloned().or(self.schema);
        tracing::debug!(
            plugins = registry.plugin_metadata().len(),
            has_schema = schema.is_some(),
            "orchestrator built"
        );

        Ok(Orchestrator {
            inner: Arc::new(OrchestratorInner {
                engine: self.engine,
                registry,
                schema,
                id_generator: self
                    .id_generator
                    .unwrap_or_else(|| Arc::new(RealIdGenerator)),
            }),
        })
    }
}

/// A whole request for [`Orchestrator::run`].
#[derive(Debug, Clone)]
pub struct OperationRequest {
    pub source: Source,
    pub operation_name: Option<String>,
    pub variables: Variables,
    pub root_value: Value,
    pub context: Context,
}

impl OperationRequest {
    pub fn new(source: impl Into<Source>) -> Self {
        Self {
            source: source.into(),
            operation_name: None,
            variables: Variables::new(),
            root_value: Value::Null,
            context: Context::new(),
        }
    }

    pub fn with_operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_root_value(mut self, root_value: Value) -> Self {
        self.root_value = root_value;
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }
}
