// Operation Domain Model

use serde::{Deserialize, Serialize};

/// Operations that dispatch an external genotyping tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    MergeBed,
    TransposeBed,
    TransposeBedArray,
    UpdateAnnotation,
}

impl Operation {
    /// Stable name used in task identities and log file names
    pub fn name(&self) -> &'static str {
        match self {
            Operation::MergeBed => "merge_bed",
            Operation::TransposeBed => "transpose_bed",
            Operation::TransposeBedArray => "transpose_bed_array",
            Operation::UpdateAnnotation => "update_annotation",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
