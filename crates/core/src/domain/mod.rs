// Domain Layer - Pure task model, commands, identities and file sets

pub mod command;
pub mod fileset;
pub mod identity;
pub mod operation;
pub mod paths;
pub mod task;
pub mod toolset;

// Re-exports
pub use command::{CliOption, CommandLine, OptionValue, RenderStyle};
pub use fileset::{plink_fileset, FileSet};
pub use identity::{ArgsSignature, LogPathTemplate, TaskIdentity};
pub use operation::Operation;
pub use task::{ArrayMember, ArrayTask, ExecutionMode, Task, VerificationPolicy};
pub use toolset::Toolset;
