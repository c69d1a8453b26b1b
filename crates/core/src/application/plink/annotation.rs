// Annotation use case: rewrite .bim/.fam from sample and SNP JSON

use crate::application::args::NormalizedArgs;
use crate::domain::paths::lossy;
use crate::domain::{
    plink_fileset, ArgsSignature, CliOption, CommandLine, Operation, RenderStyle, Task, Toolset,
};
use crate::error::Result;
use serde_json::json;
use std::path::Path;

/// Value written into .fam fields the sample JSON does not provide
pub const DEFAULT_FAM_PLACEHOLDER: i32 = -9;

pub fn plan(
    tools: &Toolset,
    bed_file: &Path,
    sample_json: &Path,
    snp_json: &Path,
    placeholder: i32,
    args: &NormalizedArgs,
) -> Result<Task> {
    args.require_inputs(&[bed_file, sample_json, snp_json])?;

    let bed = args.resolve(bed_file);
    let samples = args.resolve(sample_json);
    let snps = args.resolve(snp_json);

    // Option names go through as-is
    let command = CommandLine::build(
        tools.update_annotation.as_str(),
        &[
            CliOption::path("bed", &bed),
            CliOption::path("samples", &samples),
            CliOption::path("snps", &snps),
            CliOption::scalar("placeholder", placeholder.to_string()),
        ],
        &RenderStyle::verbatim(),
    );
    let signature = ArgsSignature::new(json!([
        lossy(&bed),
        lossy(&samples),
        lossy(&snps),
        lossy(&args.work_dir),
        placeholder
    ]));

    Ok(Task::new(
        Operation::UpdateAnnotation,
        signature,
        command,
        args.work_dir.clone(),
        &args.log_dir,
        plink_fileset(&bed),
    ))
}
