// Transpose use cases: SNP-major <-> sample-major, single and array

use crate::application::args::NormalizedArgs;
use crate::domain::fileset::BED_EXTENSION;
use crate::domain::paths::{lossy, strip_extension};
use crate::domain::{
    ArgsSignature, ArrayMember, ArrayTask, CliOption, CommandLine, FileSet, Operation,
    RenderStyle, Task, Toolset,
};
use crate::error::{AppError, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Array inputs and outputs pair up by index
pub fn check_lengths(inputs: &[PathBuf], outputs: &[PathBuf]) -> Result<()> {
    if inputs.len() != outputs.len() {
        return Err(AppError::MismatchedLength {
            inputs: inputs.len(),
            outputs: outputs.len(),
        });
    }
    Ok(())
}

fn transpose_command(tools: &Toolset, input_stem: &Path, output_stem: &Path) -> CommandLine {
    CommandLine::build(
        tools.plink.as_str(),
        &[
            CliOption::flag("noweb"),
            CliOption::flag("make_bed"),
            CliOption::path("bfile", input_stem),
            CliOption::flag("recode"),
            CliOption::flag("transpose"),
            CliOption::path("out", output_stem),
        ],
        &RenderStyle::default(),
    )
}

/// Resolved (input, output) pair plus its command and expected artifacts
struct Resolved {
    input: PathBuf,
    output: PathBuf,
    /// Output `.bed` whatever extension the caller gave; `o` and `o.bed` agree
    primary: PathBuf,
    command: CommandLine,
    expected: Vec<PathBuf>,
}

fn resolve_pair(tools: &Toolset, input: &Path, output: &Path, args: &NormalizedArgs) -> Resolved {
    let input = args.resolve(input);
    let output = args.resolve(output);
    let input_stem = strip_extension(&input, BED_EXTENSION);
    let output_set = FileSet::from_primary(&output);
    let command = transpose_command(tools, &input_stem, &output_set.stem());
    Resolved {
        input,
        output,
        primary: output_set.bed.clone(),
        command,
        expected: output_set.into_paths(),
    }
}

pub fn plan_single(
    tools: &Toolset,
    bed_file: &Path,
    output: &Path,
    args: &NormalizedArgs,
) -> Result<Task> {
    args.require_inputs(&[bed_file])?;
    let pair = resolve_pair(tools, bed_file, output, args);
    let signature = ArgsSignature::new(json!([
        lossy(&pair.input),
        lossy(&args.work_dir),
        lossy(&pair.primary)
    ]));
    Ok(Task::new(
        Operation::TransposeBed,
        signature,
        pair.command,
        args.work_dir.clone(),
        &args.log_dir,
        pair.expected,
    ))
}

/// One transpose per (input, output) pair; member `i` resolves to `outputs[i]`
/// made absolute
pub fn plan_array(
    tools: &Toolset,
    inputs: &[PathBuf],
    outputs: &[PathBuf],
    args: &NormalizedArgs,
) -> Result<ArrayTask> {
    check_lengths(inputs, outputs)?;
    args.require_inputs(inputs)?;

    let mut members = Vec::with_capacity(inputs.len());
    let mut out_paths = Vec::with_capacity(outputs.len());
    for (input, output) in inputs.iter().zip(outputs) {
        let pair = resolve_pair(tools, input, output, args);
        members.push(ArrayMember {
            signature: json!([
                lossy(&args.work_dir),
                lossy(&pair.input),
                lossy(&pair.primary)
            ]),
            command: pair.command,
            expected: pair.expected,
        });
        out_paths.push(pair.output);
    }

    Ok(ArrayTask::new(
        Operation::TransposeBedArray,
        args.work_dir.clone(),
        &args.log_dir,
        members,
        out_paths,
    ))
}
