// Subprocess execution backend
// reason: tokio for async process management, one log file per task
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs::File;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{info, warn};

use genotask_core::port::execution_backend::{
    ExecutionBackend, ExecutionError, ExecutionResult, ExecutionStatus, Invocation,
    PendingExecution,
};
use genotask_core::port::TimeProvider;

/// Environment variables passed through when no allowlist is given
pub const DEFAULT_ENV_ALLOWLIST: &[&str] = &["PATH", "HOME", "USER"];

/// Subprocess backend
/// Starts each command as a child process with an allowlisted environment,
/// capturing stdout and stderr into the task's log file
pub struct SubprocessBackend {
    time_provider: Arc<dyn TimeProvider>,
    env_allowlist: Vec<String>,
    timeout: Option<Duration>,
}

impl SubprocessBackend {
    /// Create a new subprocess backend
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for duration tracking
    /// * `env_allowlist` - Environment variables inherited by the tools
    ///
    /// # Example
    /// ```ignore
    /// let backend = SubprocessBackend::new(
    ///     Arc::new(SystemTimeProvider),
    ///     vec!["PATH".to_string(), "HOME".to_string()],
    /// );
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>, env_allowlist: Vec<String>) -> Self {
        Self {
            time_provider,
            env_allowlist,
            timeout: None,
        }
    }

    /// Kill and fail tasks that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Current process environment restricted to the allowlist
    fn filter_env(&self, env: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
        env.filter(|(k, _)| self.env_allowlist.contains(k)).collect()
    }

    /// stdout and stderr handles sharing one truncated log file
    fn open_log(invocation: &Invocation) -> Result<(Stdio, Stdio), ExecutionError> {
        let log_err = |e: std::io::Error| {
            ExecutionError::LogFile(format!("{}: {}", invocation.log_path.display(), e))
        };
        let stdout = File::create(&invocation.log_path).map_err(log_err)?;
        let stderr = stdout.try_clone().map_err(log_err)?;
        Ok((Stdio::from(stdout), Stdio::from(stderr)))
    }

    fn spawn(&self, invocation: &Invocation) -> Result<Child, ExecutionError> {
        let (stdout, stderr) = Self::open_log(invocation)?;
        let env = self.filter_env(std::env::vars());

        Command::new(&invocation.program)
            .args(&invocation.args)
            .env_clear()
            .envs(&env)
            .current_dir(&invocation.work_dir)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", invocation.program, e)))
    }
}

/// Wait for the child, enforcing the optional timeout
async fn wait_for_exit(
    mut child: Child,
    task_id: String,
    limit: Option<Duration>,
    time_provider: Arc<dyn TimeProvider>,
    start_time: i64,
) -> Result<ExecutionResult, ExecutionError> {
    let waited = match limit {
        Some(limit) => match timeout(limit, child.wait()).await {
            Ok(waited) => waited,
            Err(_) => {
                warn!(task_id = %task_id, timeout_ms = limit.as_millis() as u64, "Task timed out, killing process");
                if let Err(e) = child.kill().await {
                    warn!(task_id = %task_id, error = %e, "Failed to kill timed out process");
                }
                return Err(ExecutionError::Timeout(limit.as_millis() as i64));
            }
        },
        None => child.wait().await,
    };
    let status = waited.map_err(|e| ExecutionError::IoError(e.to_string()))?;

    let duration_ms = time_provider.elapsed_millis(start_time);
    let result = ExecutionResult {
        status: if status.success() {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        },
        duration_ms,
        exit_code: status.code(),
    };

    info!(
        task_id = %task_id,
        duration_ms = %duration_ms,
        exit_code = ?result.exit_code,
        status = ?result.status,
        "Subprocess execution completed"
    );

    Ok(result)
}

#[async_trait]
impl ExecutionBackend for SubprocessBackend {
    async fn submit(&self, invocation: Invocation) -> Result<PendingExecution, ExecutionError> {
        let start_time = self.time_provider.now_millis();

        info!(
            task_id = %invocation.task_id,
            program = %invocation.program,
            args = ?invocation.args,
            work_dir = %invocation.work_dir.display(),
            log_path = %invocation.log_path.display(),
            timeout = ?self.timeout,
            "Starting subprocess execution"
        );

        let child = self.spawn(&invocation)?;

        // Reaping runs on the runtime even if the caller never resolves its handle
        let waiter = tokio::spawn(wait_for_exit(
            child,
            invocation.task_id.clone(),
            self.timeout,
            Arc::clone(&self.time_provider),
            start_time,
        ));

        let task_id = invocation.task_id;
        Ok(Box::pin(async move {
            match waiter.await {
                Ok(result) => result,
                Err(join_err) => Err(ExecutionError::Cancelled(format!(
                    "{}: {}",
                    task_id, join_err
                ))),
            }
        }))
    }
}
