// src/shardlog/style.rs

//! Console styling for shard log lines, and the inverse for the plain-text
//! mirror.

use std::panic::Location;
use std::path::Path;
use std::sync::LazyLock;

use colored::Colorize;
use regex::Regex;

use super::shard::Shard;

static ANSI_SGR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("ANSI SGR pattern is valid"));

/// Remove ANSI colour/style sequences.
pub fn strip_ansi(s: &str) -> String {
    ANSI_SGR.replace_all(s, "").into_owned()
}

/// Render one console line: caller location, shard label, message.
pub fn render_line(location: &Location<'_>, shard: Shard, message: &str) -> String {
    let file = Path::new(location.file())
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| location.file().into());
    let loc = format!("[{}:{}]", file, location.line());
    let label = format!("[{shard}]");

    format!(
        "{} {} {}",
        format!("{loc:<23}").cyan().bold(),
        format!("{label:<16}").truecolor(255, 135, 0).bold(),
        message
    )
}

/// Terminal status line for the overall run.
pub fn status_message(passed: bool, check_name: &str) -> String {
    let verdict = if passed {
        "Passed".green().italic()
    } else {
        "Failed".red().italic()
    };
    format!("{} {}", verdict, format!("{check_name}.").bold().italic())
}

/// Message for a single check that failed.
pub fn task_failed_message(task: &str, diagnostic: &str) -> String {
    format!("{} {}: {}", "Failed".red().italic(), task.bold(), diagnostic)
}

/// Highlighted summary heading (skips, unreachable tasks).
pub fn warning(message: &str) -> String {
    message.yellow().bold().to_string()
}
