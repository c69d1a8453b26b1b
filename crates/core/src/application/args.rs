// Argument Normalizer - validates inputs and resolves task directories

use crate::domain::paths::to_absolute;
use crate::domain::{ExecutionMode, VerificationPolicy};
use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Caller-supplied arguments shared by every operation
#[derive(Debug, Clone)]
pub struct TaskArgs {
    /// Directory the external tool runs in; relative paths resolve against it
    pub work_dir: PathBuf,
    /// Where task logs go (defaults to `work_dir`)
    pub log_dir: Option<PathBuf>,
    pub mode: ExecutionMode,
    pub verification: VerificationPolicy,
}

impl TaskArgs {
    pub fn new(
        work_dir: impl Into<PathBuf>,
        mode: ExecutionMode,
        verification: VerificationPolicy,
    ) -> Self {
        Self {
            work_dir: work_dir.into(),
            log_dir: None,
            mode,
            verification,
        }
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }
}

/// Task arguments after validation, all directories absolute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedArgs {
    pub work_dir: PathBuf,
    pub log_dir: PathBuf,
    pub mode: ExecutionMode,
    pub verification: VerificationPolicy,
}

impl NormalizedArgs {
    /// Resolve a possibly relative path against the working directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        to_absolute(path, &self.work_dir)
    }

    /// Fail with `MissingInput` unless every path (resolved against the working
    /// directory) can be read
    pub fn require_inputs<P: AsRef<Path>>(&self, paths: &[P]) -> Result<()> {
        for path in paths {
            check_readable(&self.resolve(path.as_ref()))?;
        }
        Ok(())
    }
}

/// Validate the working and log directories
///
/// A relative working directory resolves against the process's current directory,
/// a relative log directory against the working directory.
pub fn process_task_args(args: &TaskArgs) -> Result<NormalizedArgs> {
    let work_dir = if args.work_dir.is_absolute() {
        args.work_dir.clone()
    } else {
        std::env::current_dir()?.join(&args.work_dir)
    };
    check_readable(&work_dir)?;

    let log_dir = match &args.log_dir {
        Some(dir) => {
            let dir = to_absolute(dir, &work_dir);
            check_readable(&dir)?;
            dir
        }
        None => work_dir.clone(),
    };

    Ok(NormalizedArgs {
        work_dir,
        log_dir,
        mode: args.mode,
        verification: args.verification,
    })
}

/// Files must open for reading, directories must list
fn check_readable(path: &Path) -> Result<()> {
    let readable = match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => std::fs::read_dir(path).map(|_| ()),
        Ok(_) => std::fs::File::open(path).map(|_| ()),
        Err(e) => Err(e),
    };
    readable.map_err(|e| {
        debug!(path = %path.display(), error = %e, "Input not readable");
        AppError::MissingInput(path.to_path_buf())
    })
}
