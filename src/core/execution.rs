//! Execution arguments and results flowing through the pipeline.

use std::fmt;
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::Document;
use super::schema::Schema;

/// Per-operation context object shared with the executor.
pub type Context = Map<String, Value>;

/// Variable values supplied with an operation.
pub type Variables = Map<String, Value>;

/// Error entry carried inside an [`ExecutionResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl GraphError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            extensions: None,
        }
    }

    pub fn with_path(mut self, path: Vec<Value>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of executing an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphError>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl ExecutionResult {
    pub fn from_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn from_errors(errors: Vec<GraphError>) -> Self {
        Self {
            errors,
            ..Default::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Arguments for the execute and subscribe phases.
///
/// Before-hooks may rewrite any field in place; the executor receives the
/// value as it stands once every hook has run.
#[derive(Debug, Clone)]
pub struct ExecutionArgs {
    pub schema: Schema,
    pub document: Arc<Document>,
    pub operation_name: Option<String>,
    pub root_value: Value,
    pub context_value: Context,
    pub variable_values: Variables,
}

impl ExecutionArgs {
    pub fn new(schema: Schema, document: Arc<Document>) -> Self {
        Self {
            schema,
            document,
            operation_name: None,
            root_value: Value::Null,
            context_value: Context::new(),
            variable_values: Variables::new(),
        }
    }

    pub fn with_operation_name(mut self, operation_name: Option<String>) -> Self {
        self.operation_name = operation_name;
        self
    }

    pub fn with_root_value(mut self, root_value: Value) -> Self {
        self.root_value = root_value;
        self
    }

    pub fn with_context(mut self, context_value: Context) -> Self {
        self.context_value = context_value;
        self
    }

    pub fn with_variables(mut self, variable_values: Variables) -> Self {
        self.variable_values = variable_values;
        self
    }
}

/// Outcome of the subscribe phase: an event stream, or a single result when
/// the subscription could not be established.
pub enum SubscriptionResult {
    Stream(BoxStream<'static, ExecutionResult>),
    Single(ExecutionResult),
}

impl SubscriptionResult {
    pub fn is_stream(&self) -> bool {
        matches!(self, SubscriptionResult::Stream(_))
    }

    /// Flatten into a stream; a single result becomes a one-item stream.
    pub fn into_stream(self) -> BoxStream<'static, ExecutionResult> {
        match self {
            SubscriptionResult::Stream(events) => events,
            SubscriptionResult::Single(result) => stream::once(async move { result }).boxed(),
        }
    }
}

impl fmt::Debug for SubscriptionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionResult::Stream(_) => f.write_str("SubscriptionResult::Stream(..)"),
            SubscriptionResult::Single(result) => f
                .debug_tuple("SubscriptionResult::Single")
                .field(result)
                .finish(),
        }
    }
}
