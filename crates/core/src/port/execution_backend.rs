// Execution Backend Port
// Abstraction over whatever actually runs the external tool processes

use crate::domain::Task;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::path::PathBuf;
use thiserror::Error;

/// Everything a backend needs to run one command
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub task_id: String,
    /// Argument tuple the identity was derived from (for backend-side dedup)
    pub signature: serde_json::Value,
    pub program: String,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
    /// stdout and stderr are captured here
    pub log_path: PathBuf,
}

impl Invocation {
    pub fn from_task(task: &Task) -> Self {
        Self {
            task_id: task.identity.to_string(),
            signature: task.signature.as_value().clone(),
            program: task.command.program().to_string(),
            args: task.command.args().to_vec(),
            work_dir: task.work_dir.clone(),
            log_path: task.log_path.clone(),
        }
    }
}

/// Result of a process that reached a terminal exit
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub duration_ms: i64,
    pub exit_code: Option<i32>,
}

/// Exit status as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failed,
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process timeout after {0}ms")]
    Timeout(i64),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Log file error: {0}")]
    LogFile(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Completion of a submitted process. Polling it never starts the process;
/// the backend has already started it by the time `submit` returns.
pub type PendingExecution = BoxFuture<'static, Result<ExecutionResult, ExecutionError>>;

/// Execution backend trait
///
/// Implementations:
/// - SubprocessBackend: tokio child processes with log capture
/// - MockBackend: in-memory, for tests
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Start one command and return its completion future
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the process cannot be started
    /// - ExecutionError::LogFile if the log destination cannot be opened
    async fn submit(&self, invocation: Invocation) -> Result<PendingExecution, ExecutionError>;

    /// Start every member of an array submission
    ///
    /// Members are independent: each returned future completes on its own, and
    /// a member that fails to start does not stop the members after it. Entry `i`
    /// belongs to `invocations[i]`.
    async fn submit_array(
        &self,
        invocations: Vec<Invocation>,
    ) -> Vec<Result<PendingExecution, ExecutionError>> {
        let mut pending = Vec::with_capacity(invocations.len());
        for invocation in invocations {
            pending.push(self.submit(invocation).await);
        }
        pending
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    /// Side effect run when a mock process "exits", e.g. touching output files
    pub type MockEffect = Arc<dyn Fn(&Invocation) + Send + Sync>;

    /// Mock backend behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit 0 immediately
        Success,
        /// Exit with the given non-zero code
        ExitCode(i32),
        /// Refuse to start
        SpawnFail(String),
        /// Exit 0 only once `release(n)` is called for the n-th submission
        Gated,
    }

    /// Mock Execution Backend for testing
    pub struct MockBackend {
        behavior: MockBehavior,
        effect: Option<MockEffect>,
        fail_on: Option<usize>,
        attempts: AtomicUsize,
        submitted: Arc<Mutex<Vec<Invocation>>>,
        gates: Arc<Mutex<Vec<Option<oneshot::Sender<()>>>>>,
    }

    impl MockBackend {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                effect: None,
                fail_on: None,
                attempts: AtomicUsize::new(0),
                submitted: Arc::new(Mutex::new(Vec::new())),
                gates: Arc::new(Mutex::new(Vec::new())),
            }
        }
        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }
        pub fn new_gated() -> Self {
            Self::new(MockBehavior::Gated)
        }
        pub fn with_effect(mut self, effect: impl Fn(&Invocation) + Send + Sync + 'static) -> Self {
            self.effect = Some(Arc::new(effect));
            self
        }
        /// Refuse to start the n-th submission attempt only
        pub fn with_spawn_failure_on(mut self, n: usize) -> Self {
            self.fail_on = Some(n);
            self
        }
        /// Invocations in submission order
        pub fn submitted(&self) -> Vec<Invocation> {
            self.submitted.lock().unwrap().clone()
        }
        pub fn submit_count(&self) -> usize {
            self.submitted.lock().unwrap().len()
        }
        /// Let the n-th gated submission exit
        pub fn release(&self, n: usize) {
            if let Some(tx) = self.gates.lock().unwrap().get_mut(n).and_then(Option::take) {
                let _ = tx.send(());
            }
        }
        /// Drop the n-th gate so that submission never reaches an exit
        pub fn cancel(&self, n: usize) {
            if let Some(slot) = self.gates.lock().unwrap().get_mut(n) {
                slot.take();
            }
        }
    }

    #[async_trait]
    impl ExecutionBackend for MockBackend {
        async fn submit(&self, invocation: Invocation) -> Result<PendingExecution, ExecutionError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if let MockBehavior::SpawnFail(msg) = &self.behavior {
                return Err(ExecutionError::SpawnFailed(msg.clone()));
            }
            if self.fail_on == Some(attempt) {
                return Err(ExecutionError::SpawnFailed(format!(
                    "{}: attempt {} refused",
                    invocation.program, attempt
                )));
            }
            self.submitted.lock().unwrap().push(invocation.clone());

            let gate = match self.behavior {
                MockBehavior::Gated => {
                    let (tx, rx) = oneshot::channel();
                    self.gates.lock().unwrap().push(Some(tx));
                    Some(rx)
                }
                _ => None,
            };
            let exit_code = match self.behavior {
                MockBehavior::ExitCode(code) => code,
                _ => 0,
            };
            let effect = self.effect.clone();

            Ok(Box::pin(async move {
                if let Some(rx) = gate {
                    rx.await.map_err(|_| {
                        ExecutionError::Cancelled(format!("{} never exited", invocation.task_id))
                    })?;
                }
                if let Some(effect) = effect {
                    effect(&invocation);
                }
                Ok(ExecutionResult {
                    status: if exit_code == 0 {
                        ExecutionStatus::Success
                    } else {
                        ExecutionStatus::Failed
                    },
                    duration_ms: 10,
                    exit_code: Some(exit_code),
                })
            }))
        }
    }
}
