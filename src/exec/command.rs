// src/exec/command.rs

//! External command checks.

use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tracing::{debug, info};

use crate::engine::TaskOutcome;
use crate::exec::check::{Check, CheckContext};
use crate::shardlog::ShardLogger;

/// How a command is spelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Passed to the platform shell (`sh -c` / `cmd /C`).
    Shell(String),
    /// Program followed by its arguments, no shell involved.
    Argv(Vec<String>),
}

impl Invocation {
    /// Render for log lines.
    pub fn display(&self) -> String {
        match self {
            Invocation::Shell(cmd) => cmd.clone(),
            Invocation::Argv(argv) => format_cmd_for_printing(argv),
        }
    }

    fn to_command(&self) -> Option<Command> {
        match self {
            Invocation::Shell(cmd) => {
                let mut c = if cfg!(windows) {
                    let mut c = Command::new("cmd");
                    c.arg("/C");
                    c
                } else {
                    let mut c = Command::new("sh");
                    c.arg("-c");
                    c
                };
                c.arg(cmd);
                Some(c)
            }
            Invocation::Argv(argv) => {
                let (program, args) = argv.split_first()?;
                let mut c = Command::new(program);
                c.args(args);
                Some(c)
            }
        }
    }
}

/// Join an argv for printing, quoting arguments a shell would split or
/// interpret.
pub fn format_cmd_for_printing(argv: &[String]) -> String {
    argv.iter()
        .map(|a| {
            if a.contains([' ', '(', ')', '^']) {
                format!("'{a}'")
            } else {
                a.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check that runs an external command and passes iff it exits with 0.
#[derive(Debug, Clone)]
pub struct CommandCheck {
    invocation: Invocation,
    workdir: Option<PathBuf>,
    verbose: bool,
    suppress: bool,
}

impl CommandCheck {
    pub fn new(invocation: Invocation) -> Self {
        Self {
            invocation,
            workdir: None,
            verbose: false,
            suppress: false,
        }
    }

    pub fn shell(cmd: impl Into<String>) -> Self {
        Self::new(Invocation::Shell(cmd.into()))
    }

    pub fn argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Invocation::Argv(argv.into_iter().map(Into::into).collect()))
    }

    /// Run the command from `dir` instead of the current directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Log the command line before running it.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Only log command output when the command fails.
    pub fn suppress(mut self, suppress: bool) -> Self {
        self.suppress = suppress;
        self
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }
}

impl Check for CommandCheck {
    fn execute(&self, ctx: &CheckContext<'_>) -> TaskOutcome {
        let shown = self.invocation.display();
        if self.verbose {
            ctx.logger.log(format!("Running command `{shown}`."));
        }

        let Some(mut cmd) = self.invocation.to_command() else {
            return TaskOutcome::failed("empty command");
        };
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());

        debug!(task = ctx.task, cmd = %shown, "spawning check process");
        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) => {
                return TaskOutcome::failed(format!("could not start `{shown}`: {e}"));
            }
        };

        let code = output
            .status
            .code()
            .map_or_else(|| "a signal".to_string(), |c| c.to_string());
        info!(
            task = ctx.task,
            exit = %code,
            success = output.status.success(),
            "check process exited"
        );

        if output.status.success() {
            if !self.suppress {
                log_stream(ctx.logger, &output.stdout);
                log_stream(ctx.logger, &output.stderr);
            }
            TaskOutcome::Success
        } else {
            log_invocation_failed(ctx.logger, &output);
            ctx.logger
                .log(format!("Command `{shown}` failed with exit code {code}."));
            TaskOutcome::failed(format!("`{shown}` exited with {code}"))
        }
    }

    fn describe(&self) -> String {
        self.invocation.display()
    }
}

fn log_stream(logger: &ShardLogger, bytes: &[u8]) {
    for line in String::from_utf8_lossy(bytes).lines() {
        logger.log(line);
    }
}

fn log_invocation_failed(logger: &ShardLogger, output: &Output) {
    if output.stdout.is_empty() {
        logger.log("Tool invocation failed with stdout: [empty]");
    } else {
        logger.log("Tool invocation failed with stdout:");
        log_stream(logger, &output.stdout);
    }

    if output.stderr.is_empty() {
        logger.log("... and stderr: [empty]");
    } else {
        logger.log("... and stderr:");
        log_stream(logger, &output.stderr);
    }
}
