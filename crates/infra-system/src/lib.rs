// Genotask Infrastructure - System Adapters
// Implements: ExecutionBackend, ToolProbe

pub mod subprocess_backend;
pub mod which_probe;

pub use subprocess_backend::SubprocessBackend;
pub use which_probe::WhichProbe;
