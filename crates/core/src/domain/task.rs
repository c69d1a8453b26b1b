// Task Domain Model

use super::command::CommandLine;
use super::identity::{ArgsSignature, LogPathTemplate, TaskIdentity};
use super::operation::Operation;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the caller waits for a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionMode {
    /// Wait for the process and hooks before returning
    Sync,
    /// Return a pending handle immediately
    Async,
}

/// What happens when expected artifacts are missing after the process exits.
/// Deliberately has no `Default`: every caller picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationPolicy {
    /// Missing artifacts fail the task
    Strict,
    /// Missing artifacts are logged, the result is still produced
    BestEffort,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Sync => write!(f, "SYNC"),
            ExecutionMode::Async => write!(f, "ASYNC"),
        }
    }
}

impl std::fmt::Display for VerificationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationPolicy::Strict => write!(f, "STRICT"),
            VerificationPolicy::BestEffort => write!(f, "BEST_EFFORT"),
        }
    }
}

/// One external tool invocation, built once and submitted once
#[derive(Debug, Clone)]
pub struct Task {
    pub identity: TaskIdentity,
    pub operation: Operation,
    pub signature: ArgsSignature,
    pub command: CommandLine,
    pub work_dir: PathBuf,
    pub log_path: PathBuf,
    /// Absolute paths that must exist after execution, primary first
    pub expected: Vec<PathBuf>,
}

impl Task {
    /// Single task logging to `<log_dir>/<identity>.log`
    pub fn new(
        operation: Operation,
        signature: ArgsSignature,
        command: CommandLine,
        work_dir: PathBuf,
        log_dir: &std::path::Path,
        expected: Vec<PathBuf>,
    ) -> Self {
        let identity = TaskIdentity::derive(operation, &signature);
        let log_path = LogPathTemplate::new(log_dir, identity.clone()).single();
        Self {
            identity,
            operation,
            signature,
            command,
            work_dir,
            log_path,
            expected,
        }
    }
}

/// Member arguments of an array submission
#[derive(Debug, Clone)]
pub struct ArrayMember {
    pub signature: serde_json::Value,
    pub command: CommandLine,
    pub expected: Vec<PathBuf>,
}

/// Sibling tasks sharing one identity prefix and an index-parameterized log path
#[derive(Debug, Clone)]
pub struct ArrayTask {
    pub identity: TaskIdentity,
    pub members: Vec<Task>,
    /// Per-index results, `outputs[i]` for member `i`
    pub outputs: Vec<PathBuf>,
}

impl ArrayTask {
    pub fn new(
        operation: Operation,
        work_dir: PathBuf,
        log_dir: &std::path::Path,
        members: Vec<ArrayMember>,
        outputs: Vec<PathBuf>,
    ) -> Self {
        let indexed: Vec<ArgsSignature> = members
            .iter()
            .enumerate()
            .map(|(i, m)| ArgsSignature::indexed(i, m.signature.clone()))
            .collect();
        let array_signature = ArgsSignature::new(serde_json::Value::Array(
            indexed.iter().map(|s| s.as_value().clone()).collect(),
        ));
        let identity = TaskIdentity::derive(operation, &array_signature);
        let template = LogPathTemplate::new(log_dir, identity.clone());

        let members = members
            .into_iter()
            .zip(indexed)
            .enumerate()
            .map(|(i, (member, signature))| Task {
                identity: identity.member(i),
                operation,
                signature,
                command: member.command,
                work_dir: work_dir.clone(),
                log_path: template.member(i),
                expected: member.expected,
            })
            .collect();

        Self {
            identity,
            members,
            outputs,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::{CliOption, RenderStyle};
    use serde_json::json;
    use std::path::Path;

    fn member(name: &str) -> ArrayMember {
        ArrayMember {
            signature: json!(["/work", name]),
            command: CommandLine::build(
                "plink",
                &[CliOption::scalar("bfile", name)],
                &RenderStyle::default(),
            ),
            expected: vec![PathBuf::from(format!("/work/{}.bed", name))],
        }
    }

    #[test]
    fn test_task_log_path_uses_identity() {
        let task = Task::new(
            Operation::TransposeBed,
            ArgsSignature::new(json!(["in.bed"])),
            CommandLine::build("plink", &[], &RenderStyle::default()),
            PathBuf::from("/work"),
            Path::new("/logs"),
            vec![],
        );
        assert_eq!(
            task.log_path,
            PathBuf::from(format!("/logs/{}.log", task.identity))
        );
    }

    #[test]
    fn test_array_members_share_prefix_and_index_logs() {
        let array = ArrayTask::new(
            Operation::TransposeBedArray,
            PathBuf::from("/work"),
            Path::new("/logs"),
            vec![member("a"), member("b")],
            vec![PathBuf::from("/work/oa.bed"), PathBuf::from("/work/ob.bed")],
        );
        assert_eq!(array.len(), 2);
        for (i, task) in array.members.iter().enumerate() {
            assert!(task.identity.as_str().starts_with(array.identity.as_str()));
            assert_eq!(
                task.log_path,
                PathBuf::from(format!("/logs/{}.{}.log", array.identity, i))
            );
        }
        assert_ne!(array.members[0].identity, array.members[1].identity);
    }

    #[test]
    fn test_identical_members_still_distinct_by_index() {
        let array = ArrayTask::new(
            Operation::TransposeBedArray,
            PathBuf::from("/work"),
            Path::new("/logs"),
            vec![member("a"), member("a")],
            vec![PathBuf::from("/work/o.bed"), PathBuf::from("/work/o.bed")],
        );
        assert_ne!(array.members[0].signature, array.members[1].signature);
    }
}
