//! Phase dispatch: the orchestrator, per-operation handles and after-hook
//! unwinding.

pub mod after_chain;
pub mod operation;
pub mod orchestrator;

pub use after_chain::AfterChain;
pub use operation::Operation;
pub use orchestrator::{Orchestrator, OrchestratorBuilder, OperationRequest};
