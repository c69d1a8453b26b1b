// Plink Task Service - one entry point per external genotyping operation

pub mod annotation;
pub mod manifest;
pub mod merge;
pub mod transpose;

pub use annotation::DEFAULT_FAM_PLACEHOLDER;
pub use manifest::MergeManifest;
pub use merge::MergePlan;

use super::args::{process_task_args, TaskArgs};
use super::dispatcher::{Dispatcher, TaskHandle};
use super::hooks::{ArtifactCheck, ResultHook, TaskHooks};
use crate::domain::{ArrayTask, Task, Toolset, VerificationPolicy};
use crate::error::Result;
use crate::port::ExecutionBackend;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Builds tool commands and dispatches them through an execution backend
pub struct PlinkTasks {
    dispatcher: Dispatcher,
    tools: Toolset,
}

impl PlinkTasks {
    pub fn new(backend: Arc<dyn ExecutionBackend>, tools: Toolset) -> Self {
        Self {
            dispatcher: Dispatcher::new(backend),
            tools,
        }
    }

    pub fn toolset(&self) -> &Toolset {
        &self.tools
    }

    /// Validate and build a merge without writing the manifest or submitting
    pub fn plan_merge_bed(
        &self,
        bed_files: &[PathBuf],
        output: &Path,
        args: &TaskArgs,
    ) -> Result<MergePlan> {
        let args = process_task_args(args)?;
        merge::plan(&self.tools, bed_files, output, &args)
    }

    /// Merge `bed_files` into `output`; resolves to the merged `.bed` path
    pub async fn merge_bed(
        &self,
        bed_files: &[PathBuf],
        output: &Path,
        args: &TaskArgs,
    ) -> Result<TaskHandle> {
        let plan = self.plan_merge_bed(bed_files, output, args)?;
        // Fully on disk before the merge tool can start
        plan.manifest.write()?;
        self.submit_single(plan.task, args).await
    }

    pub fn plan_transpose_bed(&self, bed_file: &Path, output: &Path, args: &TaskArgs) -> Result<Task> {
        let args = process_task_args(args)?;
        transpose::plan_single(&self.tools, bed_file, output, &args)
    }

    /// Transpose one file set; resolves to the output `.bed` path
    pub async fn transpose_bed(
        &self,
        bed_file: &Path,
        output: &Path,
        args: &TaskArgs,
    ) -> Result<TaskHandle> {
        let task = self.plan_transpose_bed(bed_file, output, args)?;
        self.submit_single(task, args).await
    }

    pub fn plan_transpose_bed_array(
        &self,
        inputs: &[PathBuf],
        outputs: &[PathBuf],
        args: &TaskArgs,
    ) -> Result<ArrayTask> {
        // Length mismatch wins over every other validation
        transpose::check_lengths(inputs, outputs)?;
        let args = process_task_args(args)?;
        transpose::plan_array(&self.tools, inputs, outputs, &args)
    }

    /// Transpose each `inputs[i]` into `outputs[i]`; handle `i` resolves to output `i`
    pub async fn transpose_bed_array(
        &self,
        inputs: &[PathBuf],
        outputs: &[PathBuf],
        args: &TaskArgs,
    ) -> Result<Vec<TaskHandle>> {
        let array = self.plan_transpose_bed_array(inputs, outputs, args)?;
        if array.is_empty() {
            debug!("Empty transpose array, nothing to submit");
            return Ok(Vec::new());
        }
        self.dispatcher
            .submit_array(array, args.verification, args.mode)
            .await
    }

    pub fn plan_update_annotation(
        &self,
        bed_file: &Path,
        sample_json: &Path,
        snp_json: &Path,
        placeholder: i32,
        args: &TaskArgs,
    ) -> Result<Task> {
        let args = process_task_args(args)?;
        annotation::plan(&self.tools, bed_file, sample_json, snp_json, placeholder, &args)
    }

    /// Rewrite annotation of `bed_file` in place; resolves to its absolute path
    pub async fn update_annotation(
        &self,
        bed_file: &Path,
        sample_json: &Path,
        snp_json: &Path,
        placeholder: i32,
        args: &TaskArgs,
    ) -> Result<TaskHandle> {
        let task =
            self.plan_update_annotation(bed_file, sample_json, snp_json, placeholder, args)?;
        self.submit_single(task, args).await
    }

    async fn submit_single(&self, task: Task, args: &TaskArgs) -> Result<TaskHandle> {
        let hooks = single_hooks(&task, args.verification);
        self.dispatcher.submit(task, hooks, args.mode).await
    }
}

fn single_hooks(task: &Task, policy: VerificationPolicy) -> TaskHooks {
    TaskHooks {
        post: ArtifactCheck::new(task.expected.clone(), policy),
        result: ResultHook::FirstExpected,
    }
}
