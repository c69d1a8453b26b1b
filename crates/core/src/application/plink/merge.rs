// Merge use case: many file sets into one via the merge tool

use super::manifest::MergeManifest;
use crate::application::args::NormalizedArgs;
use crate::domain::fileset::BED_EXTENSION;
use crate::domain::paths::{lossy, strip_extension};
use crate::domain::{
    ArgsSignature, CliOption, CommandLine, FileSet, Operation, RenderStyle, Task, Toolset,
};
use crate::error::{AppError, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

/// A merge task plus the manifest it reads
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub task: Task,
    pub manifest: MergeManifest,
}

/// Build the merge task without touching the filesystem beyond input checks
///
/// # Arguments
/// * `bed_files` - input `.bed` files, relative paths resolve against the working dir
/// * `output` - merged `.bed` path (or bare stem)
pub fn plan(
    tools: &Toolset,
    bed_files: &[PathBuf],
    output: &Path,
    args: &NormalizedArgs,
) -> Result<MergePlan> {
    if bed_files.is_empty() {
        return Err(AppError::InvalidArgument(
            "merge_bed needs at least one input file set".to_string(),
        ));
    }
    args.require_inputs(bed_files)?;

    let inputs: Vec<PathBuf> = bed_files.iter().map(|p| args.resolve(p)).collect();
    let output_stem = args.resolve(&strip_extension(output, BED_EXTENSION));
    let stems: Vec<String> = inputs
        .iter()
        .map(|p| lossy(&strip_extension(p, BED_EXTENSION)))
        .collect();
    let manifest = MergeManifest::for_output(&output_stem, stems);

    let command = CommandLine::build(
        tools.plink_merge.as_str(),
        &[
            CliOption::path("list", &manifest.path),
            CliOption::path("out", &output_stem),
        ],
        &RenderStyle::default(),
    );
    let input_strs: Vec<String> = inputs.iter().map(|p| lossy(p)).collect();
    let signature = ArgsSignature::new(json!([
        input_strs,
        lossy(&args.work_dir),
        lossy(&output_stem)
    ]));
    let task = Task::new(
        Operation::MergeBed,
        signature,
        command,
        args.work_dir.clone(),
        &args.log_dir,
        FileSet::from_stem(&output_stem).into_paths(),
    );

    Ok(MergePlan { task, manifest })
}
