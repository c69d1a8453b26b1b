// Application Layer - Use Cases

pub mod args;
pub mod dispatcher;
pub mod hooks;
pub mod plink;
pub mod probe;

// Re-exports
pub use args::{process_task_args, NormalizedArgs, TaskArgs};
pub use dispatcher::{Dispatcher, TaskHandle};
pub use hooks::{ArtifactCheck, ResultHook, TaskHooks};
pub use plink::{PlinkTasks, DEFAULT_FAM_PLACEHOLDER};
pub use probe::{probe_toolset, ToolReport};
