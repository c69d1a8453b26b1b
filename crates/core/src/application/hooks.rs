// Post-execution and result hooks
//
// Each task owns its hooks by value; array members get their own copies.

use crate::domain::VerificationPolicy;
use crate::error::{AppError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Post-hook: checks that every expected artifact exists on disk
#[derive(Debug, Clone)]
pub struct ArtifactCheck {
    expected: Vec<PathBuf>,
    policy: VerificationPolicy,
}

impl ArtifactCheck {
    pub fn new(expected: Vec<PathBuf>, policy: VerificationPolicy) -> Self {
        Self { expected, policy }
    }

    pub fn expected(&self) -> &[PathBuf] {
        &self.expected
    }

    /// Expected paths that do not exist, in declaration order
    pub fn missing(&self) -> Vec<PathBuf> {
        self.expected
            .iter()
            .filter(|p| !p.exists())
            .cloned()
            .collect()
    }

    /// Strict: fail with `MissingOutput`. Best-effort: warn and succeed.
    pub fn run(&self, task_id: &str) -> Result<()> {
        let missing = self.missing();
        if missing.is_empty() {
            debug!(task_id = %task_id, artifacts = self.expected.len(), "All artifacts present");
            return Ok(());
        }
        match self.policy {
            VerificationPolicy::Strict => Err(AppError::MissingOutput(missing)),
            VerificationPolicy::BestEffort => {
                warn!(
                    task_id = %task_id,
                    missing = ?missing,
                    "Expected artifacts missing (best-effort verification)"
                );
                Ok(())
            }
        }
    }
}

/// Result hook: picks the caller-visible value once artifacts are checked
#[derive(Debug, Clone)]
pub enum ResultHook {
    /// First expected artifact of the task (the primary file)
    FirstExpected,
    /// Entry `index` of the array's per-member output list
    Indexed {
        index: usize,
        outputs: Arc<[PathBuf]>,
    },
}

impl ResultHook {
    pub fn resolve(&self, check: &ArtifactCheck) -> Result<PathBuf> {
        match self {
            ResultHook::FirstExpected => check
                .expected()
                .first()
                .cloned()
                .ok_or_else(|| AppError::Internal("task declared no expected artifacts".into())),
            ResultHook::Indexed { index, outputs } => {
                outputs.get(*index).cloned().ok_or_else(|| {
                    AppError::Internal(format!(
                        "array result index {} out of range ({} outputs)",
                        index,
                        outputs.len()
                    ))
                })
            }
        }
    }
}

/// Both hooks of one task
#[derive(Debug, Clone)]
pub struct TaskHooks {
    pub post: ArtifactCheck,
    pub result: ResultHook,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_reports_all_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let bed = tmp.path().join("x.bed");
        std::fs::write(&bed, b"").unwrap();
        let bim = tmp.path().join("x.bim");
        let fam = tmp.path().join("x.fam");

        let check = ArtifactCheck::new(
            vec![bed, bim.clone(), fam.clone()],
            VerificationPolicy::Strict,
        );
        match check.run("t").unwrap_err() {
            AppError::MissingOutput(paths) => assert_eq!(paths, vec![bim, fam]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_best_effort_absorbs_missing() {
        let check = ArtifactCheck::new(
            vec![PathBuf::from("/nonexistent/x.bed")],
            VerificationPolicy::BestEffort,
        );
        assert!(check.run("t").is_ok());
        assert_eq!(check.missing().len(), 1);
    }

    #[test]
    fn test_result_hooks() {
        let check = ArtifactCheck::new(
            vec![PathBuf::from("/d/o.bed"), PathBuf::from("/d/o.bim")],
            VerificationPolicy::BestEffort,
        );
        assert_eq!(
            ResultHook::FirstExpected.resolve(&check).unwrap(),
            PathBuf::from("/d/o.bed")
        );

        let outputs: Arc<[PathBuf]> = vec![PathBuf::from("a.bed"), PathBuf::from("b.bed")].into();
        let hook = ResultHook::Indexed { index: 1, outputs: outputs.clone() };
        assert_eq!(hook.resolve(&check).unwrap(), PathBuf::from("b.bed"));

        let out_of_range = ResultHook::Indexed { index: 2, outputs };
        assert!(matches!(out_of_range.resolve(&check), Err(AppError::Internal(_))));
    }

    #[test]
    fn test_first_expected_requires_artifacts() {
        let check = ArtifactCheck::new(vec![], VerificationPolicy::Strict);
        assert!(ResultHook::FirstExpected.resolve(&check).is_err());
    }
}
