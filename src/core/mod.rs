pub mod document;
pub mod engine;
pub mod execution;
pub mod runtime_context;
pub mod schema;

pub use document::{Document, DocumentId, Source};
pub use engine::{ExecuteFn, QueryEngine, SubscribeFn};
pub use execution::{
    Context, ExecutionArgs, ExecutionResult, GraphError, SubscriptionResult, Variables,
};
pub use runtime_context::{
    FakeIdGenerator, FakeTimeProvider, IdGenerator, RealIdGenerator, RealTimeProvider,
    TimeProvider,
};
pub use schema::Schema;
