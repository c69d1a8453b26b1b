// Tool capability probe port

use std::path::PathBuf;

/// Outcome of looking up an external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolAvailability {
    /// Resolved to an executable at this path
    Available(PathBuf),
    NotFound,
    /// The lookup itself failed (unreadable PATH entry, bad encoding, ...)
    ProbeFailed(String),
}

impl ToolAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, ToolAvailability::Available(_))
    }
}

/// Checks whether a program can be executed
pub trait ToolProbe: Send + Sync {
    fn probe(&self, program: &str) -> ToolAvailability;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;

    /// Mock ToolProbe answering from a fixed table; unknown programs are NotFound
    #[derive(Default)]
    pub struct MockToolProbe {
        answers: HashMap<String, ToolAvailability>,
    }
    impl MockToolProbe {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn with(mut self, program: impl Into<String>, answer: ToolAvailability) -> Self {
            self.answers.insert(program.into(), answer);
            self
        }
    }
    impl ToolProbe for MockToolProbe {
        fn probe(&self, program: &str) -> ToolAvailability {
            self.answers
                .get(program)
                .cloned()
                .unwrap_or(ToolAvailability::NotFound)
        }
    }
}
