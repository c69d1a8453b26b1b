// Task Identity - deterministic keys derived from operation + arguments

use super::operation::Operation;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Hex characters of the digest kept in the identity
const IDENTITY_HASH_LEN: usize = 16;

/// Structured argument tuple an identity is derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgsSignature(serde_json::Value);

impl ArgsSignature {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Signature of one array member: its index prepended to its own arguments
    pub fn indexed(index: usize, member: serde_json::Value) -> Self {
        Self(serde_json::json!([index, member]))
    }
}

/// Stable task key: `<operation>.<hash prefix>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaskIdentity(String);

impl TaskIdentity {
    pub fn derive(operation: Operation, signature: &ArgsSignature) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(operation.name().as_bytes());
        hasher.update([0u8]);
        // Value's Display is compact JSON; object keys are sorted
        hasher.update(signature.as_value().to_string().as_bytes());
        let digest = hex::encode(hasher.finalize());
        Self(format!("{}.{}", operation.name(), &digest[..IDENTITY_HASH_LEN]))
    }

    /// Identity of array member `index`
    pub fn member(&self, index: usize) -> Self {
        Self(format!("{}.{}", self.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Log destinations for a task or an array of tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPathTemplate {
    log_dir: PathBuf,
    identity: TaskIdentity,
}

impl LogPathTemplate {
    pub fn new(log_dir: &Path, identity: TaskIdentity) -> Self {
        Self {
            log_dir: log_dir.to_path_buf(),
            identity,
        }
    }

    /// `<log_dir>/<identity>.log`
    pub fn single(&self) -> PathBuf {
        self.log_dir.join(format!("{}.log", self.identity))
    }

    /// `<log_dir>/<identity>.<index>.log`
    pub fn member(&self, index: usize) -> PathBuf {
        self.log_dir.join(format!("{}.{}.log", self.identity, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_is_deterministic() {
        let sig = ArgsSignature::new(json!(["/d/in.bed", "/work", "/d/out.bed"]));
        let a = TaskIdentity::derive(Operation::TransposeBed, &sig);
        let b = TaskIdentity::derive(Operation::TransposeBed, &sig.clone());
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("transpose_bed."));
        assert_eq!(a.as_str().len(), "transpose_bed.".len() + IDENTITY_HASH_LEN);
    }

    #[test]
    fn test_identity_changes_with_any_argument() {
        let base = TaskIdentity::derive(
            Operation::TransposeBed,
            &ArgsSignature::new(json!(["/d/in.bed", "/work", "/d/out.bed"])),
        );
        let other_output = TaskIdentity::derive(
            Operation::TransposeBed,
            &ArgsSignature::new(json!(["/d/in.bed", "/work", "/d/out2.bed"])),
        );
        let other_op = TaskIdentity::derive(
            Operation::MergeBed,
            &ArgsSignature::new(json!(["/d/in.bed", "/work", "/d/out.bed"])),
        );
        assert_ne!(base, other_output);
        assert_ne!(base, other_op);
    }

    #[test]
    fn test_identity_changes_with_index() {
        let member = json!(["/work", {"bfile": "a"}]);
        let first = TaskIdentity::derive(
            Operation::TransposeBedArray,
            &ArgsSignature::indexed(0, member.clone()),
        );
        let second = TaskIdentity::derive(
            Operation::TransposeBedArray,
            &ArgsSignature::indexed(1, member),
        );
        assert_ne!(first, second);
    }

    #[test]
    fn test_structured_encoding_avoids_concatenation_collisions() {
        let joined = TaskIdentity::derive(
            Operation::MergeBed,
            &ArgsSignature::new(json!(["a b"])),
        );
        let split = TaskIdentity::derive(
            Operation::MergeBed,
            &ArgsSignature::new(json!(["a", "b"])),
        );
        assert_ne!(joined, split);
    }

    #[test]
    fn test_log_paths() {
        let id = TaskIdentity("merge_bed.0123456789abcdef".to_string());
        let template = LogPathTemplate::new(Path::new("/logs"), id.clone());
        assert_eq!(
            template.single(),
            PathBuf::from("/logs/merge_bed.0123456789abcdef.log")
        );
        assert_eq!(
            template.member(2),
            PathBuf::from("/logs/merge_bed.0123456789abcdef.2.log")
        );
        assert_eq!(id.member(2).as_str(), "merge_bed.0123456789abcdef.2");
    }
}
