//! Ready-made plugins.

pub mod enable_if;
pub mod error_handler;
pub mod extend_context;
pub mod logger;
pub mod schema;
pub mod timing;

pub use enable_if::enable_if;
pub use error_handler::ErrorHandlerPlugin;
pub use extend_context::ExtendContextPlugin;
pub use logger::{LogFn, LoggerPlugin};
pub use schema::SchemaPlugin;
pub use timing::{TimingCallback, TimingPlugin};
