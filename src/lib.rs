// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod findings;
pub mod logging;
pub mod shardlog;
pub mod stamp;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command, RunArgs, StampArgs, WorkdirArgs};
use crate::config::{ChecksetPlan, ConfigFile, ConfigSection, load_and_validate};
use crate::dag::RunResult;
use crate::engine::{Checkset, Runtime, RuntimeOptions};
use crate::exec::{Check, CommandCheck, StampedCheck};
use crate::shardlog::{LogMirror, ShardLogger, style};
use crate::stamp::StampCache;

/// File name of the run log while the run is in progress (in the tools dir).
pub const TEMP_LOG_NAME: &str = "checkset_tempout.log";

/// File name of the run log once the run has finished (in the findings dir).
pub const WORKFLOW_LOG_NAME: &str = "ChecksetWorkflowOutput.log";

/// Filesystem layout of one project, resolved against its workdir.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub workdir: PathBuf,
    pub tools_dir: PathBuf,
    pub findings_dir: PathBuf,
}

impl Workspace {
    pub fn new(workdir: impl Into<PathBuf>, config: &ConfigSection) -> Self {
        let workdir = workdir.into();
        Self {
            tools_dir: workdir.join(&config.tools_dir),
            findings_dir: workdir.join(&config.findings_dir),
            workdir,
        }
    }

    pub fn stamps(&self) -> StampCache {
        StampCache::new(&self.tools_dir)
    }

    pub fn temp_log_path(&self) -> PathBuf {
        self.tools_dir.join(TEMP_LOG_NAME)
    }

    pub fn workflow_log_path(&self) -> PathBuf {
        self.findings_dir.join(WORKFLOW_LOG_NAME)
    }
}

/// High-level entry point used by `main.rs`.
///
/// The `run` subcommand does not return once checks have started: its
/// verdict exits the process through [`ShardLogger::check_passed`] /
/// [`ShardLogger::check_failed`].
pub async fn run(args: CliArgs) -> Result<ExitCode> {
    match args.command {
        Command::Run(run_args) => run_command(run_args).await,
        Command::Findings(location) => findings_command(&location),
        Command::Stamp(stamp_args) => stamp_command(&stamp_args),
    }
}

/// Load and validate the config file selected by `location`.
pub fn load_config(location: &WorkdirArgs) -> crate::errors::Result<ConfigFile> {
    let path = location.config_path();
    debug!(path = %path.display(), "loading config");
    load_and_validate(path)
}

async fn run_command(args: RunArgs) -> Result<ExitCode> {
    let cfg = load_config(&args.location)?;
    let plan = cfg.plan(&args.checkset)?;
    let workspace = Workspace::new(&args.location.workdir, &cfg.config);

    if args.dry_run {
        print_dry_run(&plan, &workspace);
        return Ok(ExitCode::SUCCESS);
    }

    let options = RuntimeOptions {
        max_workers: args.max_workers.or(cfg.config.max_workers),
    };
    let checkset = build_checkset(&plan, &workspace, args.verbose, args.suppress);
    let logger = Arc::new(open_logger(&plan.name, &workspace)?);

    match run_checkset(checkset, &workspace, Arc::clone(&logger), options).await {
        Ok(result) if result.passed() => logger.check_passed(),
        Ok(_) => logger.check_failed(),
        Err(e) => {
            logger.log_main(style::task_failed_message(logger.check_name(), &format!("{e:#}")));
            logger.check_failed()
        }
    }
}

/// Shard logger for a run of checkset `name`, mirrored into the tools dir.
pub fn open_logger(name: &str, workspace: &Workspace) -> crate::errors::Result<ShardLogger> {
    let mirror = LogMirror::create(workspace.temp_log_path())?;
    Ok(ShardLogger::new(format!("checkset:{name}")).with_mirror(mirror))
}

/// Turn a resolved plan into runnable checks.
///
/// Commands run from the workdir; stamped checks share the tools-dir stamp
/// store.
pub fn build_checkset(
    plan: &ChecksetPlan,
    workspace: &Workspace,
    verbose: bool,
    suppress: bool,
) -> Checkset {
    let stamps = workspace.stamps();
    let mut checkset = Checkset::new(&plan.name).with_params(plan.params.clone());

    for (name, task) in &plan.tasks {
        let command = CommandCheck::new(task.invocation.clone())
            .in_dir(&workspace.workdir)
            .verbose(verbose)
            .suppress(suppress);

        let check: Arc<dyn Check> = match &task.stamp {
            Some(id) => Arc::new(StampedCheck::new(id, stamps.clone(), Arc::new(command))),
            None => Arc::new(command),
        };
        checkset.insert(name.clone(), task.deps.iter().cloned(), check);
    }

    checkset
}

/// Run `checkset` to completion and file the run log under the findings dir.
///
/// A passing run also marks the log itself as an ok finding.
pub async fn run_checkset(
    checkset: Checkset,
    workspace: &Workspace,
    logger: Arc<ShardLogger>,
    options: RuntimeOptions,
) -> crate::errors::Result<RunResult> {
    let result = Runtime::new(checkset, Arc::clone(&logger), options)
        .run()
        .await?;

    let log_path = workspace.workflow_log_path();
    logger.relocate(&log_path)?;
    if result.passed() {
        workspace.stamps().mark_finding_ok(&log_path)?;
    }
    info!(path = %log_path.display(), passed = result.passed(), "run log filed");

    Ok(result)
}

/// Print the resolved checkset without executing anything.
pub fn print_dry_run(plan: &ChecksetPlan, workspace: &Workspace) {
    println!("checkset dry-run: {}", plan.name);
    println!("  workdir      = {}", workspace.workdir.display());
    println!("  tools_dir    = {}", workspace.tools_dir.display());
    println!("  findings_dir = {}", workspace.findings_dir.display());
    if !plan.params.is_empty() {
        println!("  with         = {:?}", plan.params);
    }
    println!();

    println!("tasks ({}):", plan.tasks.len());
    for (name, task) in &plan.tasks {
        println!("  - {name}");
        println!("      cmd: {}", task.invocation.display());
        if !task.deps.is_empty() {
            println!("      after: {:?}", task.deps);
        }
        if let Some(stamp) = &task.stamp {
            println!("      stamp: {stamp}");
        }
    }

    let graph = plan.graph();
    let cyclic = graph.cyclic_tasks();
    if !cyclic.is_empty() {
        println!();
        println!("in a dependency cycle (will never run): {cyclic:?}");
    }
    for task in graph.tasks() {
        let missing = graph.missing_dependencies_of(task);
        if !missing.is_empty() {
            println!("{task} waits for undefined chains: {missing:?}");
        }
    }

    debug!("dry-run complete (no execution)");
}

fn findings_command(location: &WorkdirArgs) -> Result<ExitCode> {
    let cfg = load_config(location)?;
    let workspace = Workspace::new(&location.workdir, &cfg.config);
    let found = findings::collect(&workspace.findings_dir, &workspace.stamps())?;

    report_findings(&found);
    Ok(if findings::all_ok(&found) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print one `ok` / `NOT OK` line per finding.
pub fn report_findings(found: &[findings::Finding]) {
    for finding in found {
        if finding.ok {
            println!("ok {}", finding.name);
        } else {
            println!("NOT OK {}", finding.name);
        }
    }
}

fn stamp_command(args: &StampArgs) -> Result<ExitCode> {
    let cfg = load_config(&args.location)?;
    let stamps = Workspace::new(&args.location.workdir, &cfg.config).stamps();

    if args.check {
        let fresh = stamps.is_fresh(&args.id);
        debug!(id = %args.id, fresh, "stamp queried");
        return Ok(if fresh {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    stamps.stamp(&args.id)?;
    Ok(ExitCode::SUCCESS)
}
