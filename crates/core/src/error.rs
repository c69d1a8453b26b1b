// Central Error Type for the Application

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// A required input file or directory is absent or unreadable
    #[error("Missing input: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Mismatched input/output list lengths: {inputs} inputs, {outputs} outputs")]
    MismatchedLength { inputs: usize, outputs: usize },

    /// Expected artifacts were not produced by the external tool
    #[error("Missing output: {}", format_paths(.0))]
    MissingOutput(Vec<PathBuf>),

    #[error("Execution error: {0}")]
    Execution(#[from] crate::port::ExecutionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
