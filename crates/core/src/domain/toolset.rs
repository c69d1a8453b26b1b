// Toolset - names of the external executables each operation invokes

use serde::{Deserialize, Serialize};

pub const DEFAULT_PLINK: &str = "plink";
pub const DEFAULT_PLINK_MERGE: &str = "merge_bed.py";
pub const DEFAULT_UPDATE_ANNOTATION: &str = "update_plink_annotation.pl";

/// Injected tool configuration (programs are names looked up on PATH, or paths)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolset {
    /// Transposer
    pub plink: String,
    /// File-set merger
    pub plink_merge: String,
    /// Annotation updater
    pub update_annotation: String,
}

impl Default for Toolset {
    fn default() -> Self {
        Self {
            plink: DEFAULT_PLINK.to_string(),
            plink_merge: DEFAULT_PLINK_MERGE.to_string(),
            update_annotation: DEFAULT_UPDATE_ANNOTATION.to_string(),
        }
    }
}

impl Toolset {
    /// (role, program) pairs, for availability reports
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("plink", self.plink.as_str()),
            ("plink_merge", self.plink_merge.as_str()),
            ("update_annotation", self.update_annotation.as_str()),
        ]
    }
}
