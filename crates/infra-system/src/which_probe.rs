// PATH-based tool probe
// reason: which for cross-platform executable lookup
use std::ffi::OsString;
use tracing::debug;

use genotask_core::port::tool_probe::{ToolAvailability, ToolProbe};

/// Looks programs up the way a shell would, on PATH or a given search path
#[derive(Debug, Clone, Default)]
pub struct WhichProbe {
    search_path: Option<OsString>,
}

impl WhichProbe {
    /// Probe against the process's PATH
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe against an explicit search path (same syntax as PATH)
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }
}

impl ToolProbe for WhichProbe {
    fn probe(&self, program: &str) -> ToolAvailability {
        let lookup = match &self.search_path {
            Some(paths) => match std::env::current_dir() {
                Ok(cwd) => which::which_in(program, Some(paths), cwd),
                Err(e) => return ToolAvailability::ProbeFailed(e.to_string()),
            },
            None => which::which(program),
        };

        let availability = match lookup {
            Ok(path) => ToolAvailability::Available(path),
            Err(
                which::Error::CannotFindBinaryPath
                | which::Error::BadAbsolutePath
                | which::Error::BadRelativePath,
            ) => ToolAvailability::NotFound,
            Err(e) => ToolAvailability::ProbeFailed(e.to_string()),
        };
        debug!(program, availability = ?availability, "Probed tool");
        availability
    }
}
