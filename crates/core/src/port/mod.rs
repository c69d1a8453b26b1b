// Port Layer - Interfaces for external dependencies

pub mod execution_backend;
pub mod time_provider;
pub mod tool_probe;

// Re-exports
pub use execution_backend::{
    ExecutionBackend, ExecutionError, ExecutionResult, ExecutionStatus, Invocation,
    PendingExecution,
};
pub use time_provider::TimeProvider;
pub use tool_probe::{ToolAvailability, ToolProbe};
