// Async Dispatcher - submits tasks to the execution backend and wraps their
// completion in handles that verify artifacts before yielding a result

use super::hooks::{ArtifactCheck, ResultHook, TaskHooks};
use crate::domain::{ArrayTask, ExecutionMode, Task, TaskIdentity, VerificationPolicy};
use crate::error::Result;
use crate::port::{ExecutionBackend, ExecutionStatus, Invocation, PendingExecution};
use futures::future::{self, join_all, BoxFuture};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Caller's view of one submitted task
///
/// Resolving consumes the handle, so the backend wait and both hooks run once.
pub struct TaskHandle {
    task_id: TaskIdentity,
    log_path: PathBuf,
    state: HandleState,
}

enum HandleState {
    Ready(Result<PathBuf>),
    Pending(BoxFuture<'static, Result<PathBuf>>),
}

impl TaskHandle {
    fn ready(task_id: TaskIdentity, log_path: PathBuf, result: Result<PathBuf>) -> Self {
        Self {
            task_id,
            log_path,
            state: HandleState::Ready(result),
        }
    }

    fn pending(
        task_id: TaskIdentity,
        log_path: PathBuf,
        future: BoxFuture<'static, Result<PathBuf>>,
    ) -> Self {
        Self {
            task_id,
            log_path,
            state: HandleState::Pending(future),
        }
    }

    pub fn task_id(&self) -> &TaskIdentity {
        &self.task_id
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// True for synchronous submissions, whose result is already known
    pub fn is_ready(&self) -> bool {
        matches!(self.state, HandleState::Ready(_))
    }

    /// Wait for the process, verify artifacts, return the result path
    pub async fn resolve(self) -> Result<PathBuf> {
        match self.state {
            HandleState::Ready(result) => result,
            HandleState::Pending(future) => future.await,
        }
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("task_id", &self.task_id)
            .field("log_path", &self.log_path)
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Submits single and array tasks to an execution backend
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn ExecutionBackend>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn ExecutionBackend>) -> Self {
        Self { backend }
    }

    /// Submit one task
    ///
    /// Sync mode waits for completion and returns a resolved handle; async mode
    /// returns as soon as the backend has accepted the command.
    pub async fn submit(
        &self,
        task: Task,
        hooks: TaskHooks,
        mode: ExecutionMode,
    ) -> Result<TaskHandle> {
        info!(
            task_id = %task.identity,
            command = %task.command,
            work_dir = %task.work_dir.display(),
            log_path = %task.log_path.display(),
            mode = %mode,
            "Submitting task"
        );

        let pending = self.backend.submit(Invocation::from_task(&task)).await?;
        let completion = complete(task.identity.clone(), pending, hooks);

        Ok(match mode {
            ExecutionMode::Sync => {
                TaskHandle::ready(task.identity, task.log_path, completion.await)
            }
            ExecutionMode::Async => {
                TaskHandle::pending(task.identity, task.log_path, Box::pin(completion))
            }
        })
    }

    /// Submit every member of an array task
    ///
    /// Member `i` verifies its own expected artifacts and resolves to
    /// `array.outputs[i]`; no member waits on another. A member the backend could
    /// not start gets a handle that resolves to its execution error, so members
    /// already running keep their handles and hooks.
    pub async fn submit_array(
        &self,
        array: ArrayTask,
        policy: VerificationPolicy,
        mode: ExecutionMode,
    ) -> Result<Vec<TaskHandle>> {
        info!(
            task_id = %array.identity,
            members = array.len(),
            mode = %mode,
            "Submitting array task"
        );

        let invocations = array.members.iter().map(Invocation::from_task).collect();
        let pending = self.backend.submit_array(invocations).await;

        let outputs: Arc<[PathBuf]> = array.outputs.into();
        let completions: Vec<_> = array
            .members
            .into_iter()
            .zip(pending)
            .enumerate()
            .map(|(index, (task, pending))| {
                let completion: BoxFuture<'static, Result<PathBuf>> = match pending {
                    Ok(pending) => {
                        let hooks = TaskHooks {
                            post: ArtifactCheck::new(task.expected, policy),
                            result: ResultHook::Indexed {
                                index,
                                outputs: Arc::clone(&outputs),
                            },
                        };
                        Box::pin(complete(task.identity.clone(), pending, hooks))
                    }
                    Err(e) => {
                        warn!(task_id = %task.identity, error = %e, "Array member failed to start");
                        let failed: Result<PathBuf> = Err(e.into());
                        Box::pin(future::ready(failed))
                    }
                };
                (task.identity, task.log_path, completion)
            })
            .collect();

        Ok(match mode {
            ExecutionMode::Sync => {
                let (ids, futures): (Vec<_>, Vec<_>) = completions
                    .into_iter()
                    .map(|(id, log, completion)| ((id, log), completion))
                    .unzip();
                let results = join_all(futures).await;
                ids.into_iter()
                    .zip(results)
                    .map(|((id, log), result)| TaskHandle::ready(id, log, result))
                    .collect()
            }
            ExecutionMode::Async => completions
                .into_iter()
                .map(|(id, log, completion)| TaskHandle::pending(id, log, completion))
                .collect(),
        })
    }
}

/// Backend wait, then post-hook, then result hook. A backend error (including
/// cancellation) short-circuits before either hook runs.
async fn complete(
    task_id: TaskIdentity,
    pending: PendingExecution,
    hooks: TaskHooks,
) -> Result<PathBuf> {
    let outcome = pending.await?;

    match outcome.status {
        ExecutionStatus::Success => info!(
            task_id = %task_id,
            duration_ms = outcome.duration_ms,
            "Task process exited"
        ),
        ExecutionStatus::Failed => warn!(
            task_id = %task_id,
            exit_code = ?outcome.exit_code,
            duration_ms = outcome.duration_ms,
            "Task process exited with failure; checking artifacts anyway"
        ),
    }

    hooks.post.run(task_id.as_str())?;
    hooks.result.resolve(&hooks.post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ArgsSignature, ArrayMember, CliOption, CommandLine, FileSet, Operation, RenderStyle,
    };
    use crate::error::AppError;
    use crate::port::execution_backend::mocks::{MockBackend, MockBehavior};
    use crate::port::ExecutionError;
    use serde_json::json;
    use tokio_test::{assert_pending, assert_ready};

    fn transpose_task(dir: &Path, name: &str) -> Task {
        let stem = dir.join(name);
        Task::new(
            Operation::TransposeBed,
            ArgsSignature::new(json!([name])),
            CommandLine::build(
                "plink",
                &[CliOption::path("out", &stem)],
                &RenderStyle::default(),
            ),
            dir.to_path_buf(),
            dir,
            FileSet::from_stem(&stem).into_paths(),
        )
    }

    fn hooks(task: &Task, policy: VerificationPolicy) -> TaskHooks {
        TaskHooks {
            post: ArtifactCheck::new(task.expected.clone(), policy),
            result: ResultHook::FirstExpected,
        }
    }

    fn touch_all(paths: &[PathBuf]) {
        for p in paths {
            std::fs::write(p, b"").unwrap();
        }
    }

    #[tokio::test]
    async fn test_sync_submit_returns_resolved_handle() {
        let tmp = tempfile::tempdir().unwrap();
        let task = transpose_task(tmp.path(), "out");
        touch_all(&task.expected);

        let backend = Arc::new(MockBackend::new_success());
        let dispatcher = Dispatcher::new(backend.clone());
        let h = hooks(&task, VerificationPolicy::Strict);
        let handle = dispatcher.submit(task, h, ExecutionMode::Sync).await.unwrap();

        assert!(handle.is_ready());
        assert_eq!(handle.resolve().await.unwrap(), tmp.path().join("out.bed"));
        assert_eq!(backend.submit_count(), 1);
    }

    #[tokio::test]
    async fn test_post_hook_runs_after_process_exit() {
        let tmp = tempfile::tempdir().unwrap();
        let task = transpose_task(tmp.path(), "out");
        let expected = task.expected.clone();

        // Outputs only appear when the mock process exits
        let backend = Arc::new(
            MockBackend::new_gated().with_effect(move |_| touch_all(&expected)),
        );
        let dispatcher = Dispatcher::new(backend.clone());
        let h = hooks(&task, VerificationPolicy::Strict);
        let handle = dispatcher.submit(task, h, ExecutionMode::Async).await.unwrap();
        assert!(!handle.is_ready());

        backend.release(0);
        assert_eq!(handle.resolve().await.unwrap(), tmp.path().join("out.bed"));
    }

    #[tokio::test]
    async fn test_strict_missing_output_fails_on_resolve() {
        let tmp = tempfile::tempdir().unwrap();
        let task = transpose_task(tmp.path(), "out");
        touch_all(&task.expected[..2]);

        let dispatcher = Dispatcher::new(Arc::new(MockBackend::new_success()));
        let h = hooks(&task, VerificationPolicy::Strict);
        let handle = dispatcher.submit(task, h, ExecutionMode::Async).await.unwrap();

        match handle.resolve().await.unwrap_err() {
            AppError::MissingOutput(paths) => {
                assert_eq!(paths, vec![tmp.path().join("out.fam")])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_judged_by_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let task = transpose_task(tmp.path(), "out");
        touch_all(&task.expected);

        let dispatcher = Dispatcher::new(Arc::new(MockBackend::new(MockBehavior::ExitCode(2))));
        let h = hooks(&task, VerificationPolicy::Strict);
        let handle = dispatcher.submit(task, h, ExecutionMode::Sync).await.unwrap();
        assert!(handle.resolve().await.is_ok());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_synchronous() {
        let tmp = tempfile::tempdir().unwrap();
        let task = transpose_task(tmp.path(), "out");
        let dispatcher = Dispatcher::new(Arc::new(MockBackend::new(MockBehavior::SpawnFail(
            "no such binary".into(),
        ))));
        let h = hooks(&task, VerificationPolicy::BestEffort);
        let err = dispatcher
            .submit(task, h, ExecutionMode::Async)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Execution(ExecutionError::SpawnFailed(_))));
    }

    #[tokio::test]
    async fn test_cancelled_task_skips_hooks() {
        let tmp = tempfile::tempdir().unwrap();
        let task = transpose_task(tmp.path(), "out");
        let expected = task.expected.clone();
        let backend = Arc::new(
            MockBackend::new_gated().with_effect(move |_| touch_all(&expected)),
        );
        let dispatcher = Dispatcher::new(backend.clone());
        // Best-effort would succeed if the hooks ran
        let h = hooks(&task, VerificationPolicy::BestEffort);
        let handle = dispatcher.submit(task, h, ExecutionMode::Async).await.unwrap();

        backend.cancel(0);
        let err = handle.resolve().await.unwrap_err();
        assert!(matches!(err, AppError::Execution(ExecutionError::Cancelled(_))));
        assert!(!tmp.path().join("out.bed").exists());
    }

    #[tokio::test]
    async fn test_array_members_resolve_independently() {
        let tmp = tempfile::tempdir().unwrap();
        let members: Vec<ArrayMember> = ["oa", "ob"]
            .iter()
            .map(|name| {
                let t = transpose_task(tmp.path(), name);
                ArrayMember {
                    signature: json!([name]),
                    command: t.command,
                    expected: t.expected,
                }
            })
            .collect();
        let outputs = vec![tmp.path().join("oa.bed"), tmp.path().join("ob.bed")];
        for m in &members {
            touch_all(&m.expected);
        }
        let array = ArrayTask::new(
            Operation::TransposeBedArray,
            tmp.path().to_path_buf(),
            tmp.path(),
            members,
            outputs,
        );

        let backend = Arc::new(MockBackend::new_gated());
        let dispatcher = Dispatcher::new(backend.clone());
        let mut handles = dispatcher
            .submit_array(array, VerificationPolicy::Strict, ExecutionMode::Async)
            .await
            .unwrap();
        assert_eq!(backend.submit_count(), 2);

        let second = handles.pop().unwrap();
        let first = handles.pop().unwrap();
        let mut first = tokio_test::task::spawn(first.resolve());
        assert_pending!(first.poll());

        backend.release(1);
        assert_eq!(second.resolve().await.unwrap(), tmp.path().join("ob.bed"));
        assert_pending!(first.poll());

        backend.release(0);
        let result = assert_ready!(first.poll());
        assert_eq!(result.unwrap(), tmp.path().join("oa.bed"));
    }

    fn two_member_array(dir: &Path) -> ArrayTask {
        let members: Vec<ArrayMember> = ["oa", "ob"]
            .iter()
            .map(|name| {
                let t = transpose_task(dir, name);
                ArrayMember {
                    signature: json!([name]),
                    command: t.command,
                    expected: t.expected,
                }
            })
            .collect();
        let outputs = vec![dir.join("oa.bed"), dir.join("ob.bed")];
        ArrayTask::new(
            Operation::TransposeBedArray,
            dir.to_path_buf(),
            dir,
            members,
            outputs,
        )
    }

    #[tokio::test]
    async fn test_array_member_that_fails_to_start_keeps_others() {
        let tmp = tempfile::tempdir().unwrap();
        let array = two_member_array(tmp.path());
        for m in &array.members {
            touch_all(&m.expected);
        }

        let backend = Arc::new(MockBackend::new_success().with_spawn_failure_on(0));
        let dispatcher = Dispatcher::new(backend.clone());
        let handles = dispatcher
            .submit_array(array, VerificationPolicy::Strict, ExecutionMode::Async)
            .await
            .unwrap();
        assert_eq!(handles.len(), 2);
        // Only the second member reached the backend
        assert_eq!(backend.submit_count(), 1);

        let mut handles = handles.into_iter();
        let first = handles.next().unwrap();
        let second = handles.next().unwrap();
        assert!(matches!(
            first.resolve().await,
            Err(AppError::Execution(ExecutionError::SpawnFailed(_)))
        ));
        assert_eq!(second.resolve().await.unwrap(), tmp.path().join("ob.bed"));
    }

    #[tokio::test]
    async fn test_sync_array_handles_are_resolved() {
        let tmp = tempfile::tempdir().unwrap();
        let array = two_member_array(tmp.path());
        touch_all(&array.members[0].expected);
        touch_all(&array.members[1].expected[..1]);

        let dispatcher = Dispatcher::new(Arc::new(MockBackend::new_success()));
        let handles = dispatcher
            .submit_array(array, VerificationPolicy::Strict, ExecutionMode::Sync)
            .await
            .unwrap();
        assert!(handles.iter().all(TaskHandle::is_ready));

        let mut handles = handles.into_iter();
        let first = handles.next().unwrap();
        let second = handles.next().unwrap();
        assert_eq!(first.resolve().await.unwrap(), tmp.path().join("oa.bed"));
        match second.resolve().await.unwrap_err() {
            AppError::MissingOutput(paths) => assert_eq!(
                paths,
                vec![tmp.path().join("ob.bim"), tmp.path().join("ob.fam")]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }
}
