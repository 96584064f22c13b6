// tests/commands_and_findings.rs

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::tempdir;

use checkset::config::{ConfigSection, substitute};
use checkset::engine::{RuntimeOptions, TaskOutcome};
use checkset::exec::{Check, CheckContext, CommandCheck, format_cmd_for_printing};
use checkset::shardlog::{LogMirror, ShardLogger};
use checkset::stamp::StampCache;
use checkset::{Workspace, build_checkset, findings, run_checkset};
use checkset_test_utils::builders::{CheckConfigBuilder, ChecksetConfigBuilder, ConfigFileBuilder};
use checkset_test_utils::console::SharedConsole;
use checkset_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn execute(check: &dyn Check, console: &SharedConsole) -> TaskOutcome {
    let logger = ShardLogger::new("checkset:test").with_console(console.sink());
    let params = BTreeMap::new();
    let ctx = CheckContext {
        task: "cmd",
        logger: &logger,
        params: &params,
    };
    check.execute(&ctx)
}

#[test]
fn printing_quotes_arguments_a_shell_would_split() {
    let argv: Vec<String> = ["cc", "-o", "out dir/a", "f(x)", "a^b", "plain"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(
        format_cmd_for_printing(&argv),
        "cc -o 'out dir/a' 'f(x)' 'a^b' plain"
    );
}

#[cfg(unix)]
#[test]
fn successful_command_passes_and_shows_output() {
    let console = SharedConsole::new();
    let outcome = execute(&CommandCheck::shell("echo visible"), &console);

    assert_eq!(outcome, TaskOutcome::Success);
    assert!(console.contents().contains("visible"));
}

#[cfg(unix)]
#[test]
fn suppressed_output_is_hidden_on_success() {
    let console = SharedConsole::new();
    let check = CommandCheck::shell("echo hidden").suppress(true).verbose(true);
    let outcome = execute(&check, &console);

    assert_eq!(outcome, TaskOutcome::Success);
    let out = console.contents();
    assert!(out.contains("Running command `echo hidden`."), "{out}");
    assert!(!out.lines().any(|l| l.ends_with(" hidden")), "{out}");
}

#[cfg(unix)]
#[test]
fn failing_command_reports_exit_code_and_output() {
    let console = SharedConsole::new();
    let check = CommandCheck::shell("echo to-stdout; echo to-stderr >&2; exit 3").suppress(true);
    let outcome = execute(&check, &console);

    match outcome {
        TaskOutcome::Failed(diagnostic) => assert!(diagnostic.contains("exited with 3"), "{diagnostic}"),
        other => panic!("exit 3 must fail, got {other:?}"),
    }
    let out = console.contents();
    assert!(out.contains("Tool invocation failed with stdout:"), "{out}");
    assert!(out.contains("to-stdout"), "{out}");
    assert!(out.contains("... and stderr:"), "{out}");
    assert!(out.contains("to-stderr"), "{out}");
    assert!(out.contains("failed with exit code 3."), "{out}");
}

#[cfg(unix)]
#[test]
fn escaped_placeholder_reaches_the_shell_unexpanded() {
    let params = BTreeMap::from([("HOME".to_string(), "from-params".to_string())]);
    let cmd = substitute(r"echo \${HOME}", &params);

    let console = SharedConsole::new();
    let outcome = execute(&CommandCheck::shell(cmd), &console);

    assert_eq!(outcome, TaskOutcome::Success);
    let out = console.contents();
    assert!(out.lines().any(|l| l.ends_with(" ${HOME}")), "{out}");
    assert!(!out.contains("from-params"), "{out}");
}

#[cfg(unix)]
#[test]
fn argv_runs_without_a_shell_in_the_workdir() -> TestResult {
    let dir = tempdir()?;
    let console = SharedConsole::new();
    let check = CommandCheck::argv(["touch", "marker"]).in_dir(dir.path());

    assert_eq!(execute(&check, &console), TaskOutcome::Success);
    assert!(dir.path().join("marker").exists());
    Ok(())
}

#[test]
fn unspawnable_command_fails() {
    let console = SharedConsole::new();
    let check = CommandCheck::argv(["./definitely-not-a-program-on-path"]);

    match execute(&check, &console) {
        TaskOutcome::Failed(diagnostic) => assert!(diagnostic.contains("could not start")),
        other => panic!("missing program must fail, got {other:?}"),
    }
}

#[test]
fn findings_are_listed_sorted_with_their_status() -> TestResult {
    let dir = tempdir()?;
    let stamps = StampCache::new(dir.path().join("tools"));
    let findings_dir = dir.path().join("findings");

    assert!(findings::collect(&findings_dir, &stamps)?.is_empty());

    fs::create_dir_all(findings_dir.join("subdir"))?;
    fs::write(findings_dir.join("b-lint.txt"), "warnings")?;
    fs::write(findings_dir.join("a-build.log"), "ok")?;
    stamps.mark_finding_ok(&findings_dir.join("a-build.log"))?;

    let found = findings::collect(&findings_dir, &stamps)?;
    let summary: Vec<(&str, bool)> = found.iter().map(|f| (f.name.as_str(), f.ok)).collect();
    assert_eq!(summary, vec![("a-build.log", true), ("b-lint.txt", false)]);
    assert!(!findings::all_ok(&found));
    assert!(findings::all_ok(&found[..1]));
    Ok(())
}

fn workspace(root: &Path) -> Workspace {
    Workspace::new(root, &ConfigSection::default())
}

#[cfg(unix)]
async fn run_config(
    root: &Path,
    failing: bool,
) -> Result<checkset::dag::RunResult, Box<dyn Error>> {
    let cfg = ConfigFileBuilder::new()
        .with_check("prepare", CheckConfigBuilder::cmd("echo prepared > prepared.txt").build())
        .with_check(
            "verify",
            CheckConfigBuilder::cmd(if failing { "exit 1" } else { "test -f prepared.txt" }).build(),
        )
        .with_checkset(
            "ci",
            ChecksetConfigBuilder::new()
                .chain("prepare", &[])
                .chain("verify", &["prepare"])
                .build(),
        )
        .build();

    let ws = workspace(root);
    let plan = cfg.plan("ci")?;
    let checkset = build_checkset(&plan, &ws, false, false);
    let logger = Arc::new(
        ShardLogger::new("checkset:ci")
            .with_console(SharedConsole::new().sink())
            .with_mirror(LogMirror::create(ws.temp_log_path())?),
    );

    let result = with_timeout(run_checkset(checkset, &ws, logger, RuntimeOptions::default())).await?;
    Ok(result)
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn passing_run_files_the_log_as_an_ok_finding() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let result = run_config(dir.path(), false).await?;
    assert!(result.passed(), "{result:?}");

    let ws = workspace(dir.path());
    assert!(!ws.temp_log_path().exists());
    let log = fs::read_to_string(ws.workflow_log_path())?;
    assert!(log.contains("Running prepare."), "{log}");
    assert!(log.contains("Running verify."), "{log}");
    assert!(ws.stamps().is_finding_ok(&ws.workflow_log_path()));
    Ok(())
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failing_run_files_the_log_without_marking_it() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let result = run_config(dir.path(), true).await?;
    assert!(!result.passed());
    assert!(result.failed.contains("verify"));

    let ws = workspace(dir.path());
    assert!(ws.workflow_log_path().exists());
    assert!(!ws.stamps().is_finding_ok(&ws.workflow_log_path()));

    let found = findings::collect(&ws.findings_dir, &ws.stamps())?;
    assert_eq!(found.len(), 1);
    assert!(!found[0].ok);
    Ok(())
}
