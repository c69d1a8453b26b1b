//! genotask CLI - dispatch PLINK genotyping tools and verify their outputs

mod logging;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};
use tracing::info;

use genotask_core::application::{
    probe_toolset, PlinkTasks, TaskArgs, TaskHandle, DEFAULT_FAM_PLACEHOLDER,
};
use genotask_core::domain::toolset::{DEFAULT_PLINK, DEFAULT_PLINK_MERGE, DEFAULT_UPDATE_ANNOTATION};
use genotask_core::domain::{ExecutionMode, Task, Toolset, VerificationPolicy};
use genotask_core::port::time_provider::SystemTimeProvider;
use genotask_core::port::ToolAvailability;
use genotask_infra_system::subprocess_backend::DEFAULT_ENV_ALLOWLIST;
use genotask_infra_system::{SubprocessBackend, WhichProbe};

#[derive(Parser)]
#[command(name = "genotask")]
#[command(about = "Dispatch genotyping tool tasks and verify their outputs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory the tools run in; relative paths resolve against it
    #[arg(long, env = "GENOTASK_WORK_DIR", default_value = ".", global = true)]
    work_dir: PathBuf,

    /// Directory for task logs (defaults to the working directory)
    #[arg(long, env = "GENOTASK_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Kill tasks running longer than this many seconds
    #[arg(long, env = "GENOTASK_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    tools: ToolArgs,
}

/// External tool programs
#[derive(Args)]
struct ToolArgs {
    /// PLINK executable (transpose)
    #[arg(long, env = "GENOTASK_PLINK", default_value = DEFAULT_PLINK, global = true)]
    plink: String,

    /// File-set merge script
    #[arg(long, env = "GENOTASK_PLINK_MERGE", default_value = DEFAULT_PLINK_MERGE, global = true)]
    plink_merge: String,

    /// Annotation update script
    #[arg(long, env = "GENOTASK_UPDATE_ANNOTATION", default_value = DEFAULT_UPDATE_ANNOTATION, global = true)]
    update_annotation: String,
}

impl ToolArgs {
    fn toolset(&self) -> Toolset {
        Toolset {
            plink: self.plink.clone(),
            plink_merge: self.plink_merge.clone(),
            update_annotation: self.update_annotation.clone(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Verify {
    /// Fail when any expected output is missing
    Strict,
    /// Warn about missing outputs but still report the result
    BestEffort,
}

impl From<Verify> for VerificationPolicy {
    fn from(v: Verify) -> Self {
        match v {
            Verify::Strict => VerificationPolicy::Strict,
            Verify::BestEffort => VerificationPolicy::BestEffort,
        }
    }
}

/// Options shared by every operation
#[derive(Args)]
struct RunArgs {
    /// Output verification policy (required, no default)
    #[arg(long, value_enum, env = "GENOTASK_VERIFY")]
    verify: Verify,

    /// Print the commands without running them
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge several .bed file sets into one
    MergeBed {
        /// Merged .bed output
        #[arg(short, long)]
        output: PathBuf,

        /// Input .bed files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Transpose one .bed file set
    TransposeBed {
        input: PathBuf,
        output: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Transpose many .bed file sets in parallel (pairs by position)
    TransposeBedArray {
        #[arg(long = "input", required = true)]
        inputs: Vec<PathBuf>,

        #[arg(long = "output", required = true)]
        outputs: Vec<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Rewrite .bim/.fam annotation from sample and SNP JSON
    UpdateAnnotation {
        bed: PathBuf,

        #[arg(long)]
        samples: PathBuf,

        #[arg(long)]
        snps: PathBuf,

        /// Value for .fam fields without sample data
        #[arg(long, default_value_t = DEFAULT_FAM_PLACEHOLDER, allow_hyphen_values = true)]
        placeholder: i32,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Check that the configured tools can be found
    Tools,
}

#[derive(Serialize, Tabled)]
struct TaskOutcome {
    index: usize,
    task_id: String,
    status: String,
    result: String,
}

#[derive(Tabled)]
struct ToolRow {
    role: String,
    program: String,
    status: String,
    path: String,
}

impl Cli {
    fn task_args(&self, run: &RunArgs, mode: ExecutionMode) -> TaskArgs {
        let args = TaskArgs::new(&self.work_dir, mode, run.verify.into());
        match &self.log_dir {
            Some(dir) => args.with_log_dir(dir),
            None => args,
        }
    }

    fn plink_tasks(&self) -> PlinkTasks {
        let mut backend = SubprocessBackend::new(
            Arc::new(SystemTimeProvider),
            DEFAULT_ENV_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
        );
        if let Some(secs) = self.timeout_secs {
            backend = backend.with_timeout(Duration::from_secs(secs));
        }
        PlinkTasks::new(Arc::new(backend), self.tools.toolset())
    }
}

fn print_plan(tasks: &[&Task]) {
    println!("{}", "Dry run, nothing submitted".yellow().bold());
    for task in tasks {
        println!("  {} {}", task.identity.to_string().cyan(), task.command);
        println!("    {} {}", "log:".bold(), task.log_path.display());
    }
}

/// Resolve handles in order, collecting one outcome each
async fn resolve_all(handles: Vec<TaskHandle>) -> (Vec<TaskOutcome>, usize) {
    let mut outcomes = Vec::with_capacity(handles.len());
    let mut failures = 0;
    for (index, handle) in handles.into_iter().enumerate() {
        let task_id = handle.task_id().to_string();
        let log_path = handle.log_path().to_path_buf();
        match handle.resolve().await {
            Ok(path) => outcomes.push(TaskOutcome {
                index,
                task_id,
                status: "DONE".to_string(),
                result: path.display().to_string(),
            }),
            Err(e) => {
                failures += 1;
                outcomes.push(TaskOutcome {
                    index,
                    task_id,
                    status: "FAILED".to_string(),
                    result: format!("{} (log: {})", e, log_path.display()),
                });
            }
        }
    }
    (outcomes, failures)
}

fn report(outcomes: &[TaskOutcome], failures: usize, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcomes)?);
    } else if outcomes.len() == 1 {
        let outcome = &outcomes[0];
        if failures == 0 {
            println!("{} {}", "✓".green().bold(), outcome.result);
        } else {
            println!("{} {}", "✗".red().bold(), outcome.result);
        }
    } else {
        println!("{}", Table::new(outcomes));
    }

    if failures > 0 {
        anyhow::bail!("{} of {} task(s) failed", failures, outcomes.len());
    }
    Ok(())
}

fn report_tools(cli: &Cli) -> Result<()> {
    let reports = probe_toolset(&WhichProbe::new(), &cli.tools.toolset());
    let missing = reports.iter().filter(|r| !r.availability.is_available()).count();

    let rows: Vec<ToolRow> = reports
        .into_iter()
        .map(|r| {
            let (status, path) = match r.availability {
                ToolAvailability::Available(path) => {
                    ("AVAILABLE".green().to_string(), path.display().to_string())
                }
                ToolAvailability::NotFound => ("NOT FOUND".red().to_string(), String::new()),
                ToolAvailability::ProbeFailed(reason) => ("PROBE FAILED".yellow().to_string(), reason),
            };
            ToolRow {
                role: r.role.to_string(),
                program: r.program,
                status,
                path,
            }
        })
        .collect();
    println!("{}", Table::new(rows));

    if missing > 0 {
        anyhow::bail!("{} tool(s) unavailable", missing);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;
    let cli = Cli::parse();
    info!("genotask v{} starting", genotask_core::VERSION);
    let tasks = cli.plink_tasks();

    let handles = match &cli.command {
        Commands::MergeBed { output, inputs, run } => {
            let args = cli.task_args(run, ExecutionMode::Sync);
            if run.dry_run {
                let plan = tasks.plan_merge_bed(inputs, output, &args)?;
                print_plan(&[&plan.task]);
                println!("    {} {}", "manifest:".bold(), plan.manifest.path.display());
                return Ok(());
            }
            vec![tasks
                .merge_bed(inputs, output, &args)
                .await
                .context("Failed to submit merge")?]
        }

        Commands::TransposeBed { input, output, run } => {
            let args = cli.task_args(run, ExecutionMode::Sync);
            if run.dry_run {
                print_plan(&[&tasks.plan_transpose_bed(input, output, &args)?]);
                return Ok(());
            }
            vec![tasks
                .transpose_bed(input, output, &args)
                .await
                .context("Failed to submit transpose")?]
        }

        Commands::TransposeBedArray { inputs, outputs, run } => {
            let args = cli.task_args(run, ExecutionMode::Async);
            if run.dry_run {
                let array = tasks.plan_transpose_bed_array(inputs, outputs, &args)?;
                print_plan(&array.members.iter().collect::<Vec<_>>());
                return Ok(());
            }
            tasks
                .transpose_bed_array(inputs, outputs, &args)
                .await
                .context("Failed to submit transpose array")?
        }

        Commands::UpdateAnnotation {
            bed,
            samples,
            snps,
            placeholder,
            run,
        } => {
            let args = cli.task_args(run, ExecutionMode::Sync);
            if run.dry_run {
                print_plan(&[&tasks.plan_update_annotation(bed, samples, snps, *placeholder, &args)?]);
                return Ok(());
            }
            vec![tasks
                .update_annotation(bed, samples, snps, *placeholder, &args)
                .await
                .context("Failed to submit annotation update")?]
        }

        Commands::Tools => return report_tools(&cli),
    };

    let (outcomes, failures) = resolve_all(handles).await;
    report(&outcomes, failures, cli.json)
}
