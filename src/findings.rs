// src/findings.rs

//! Summary of the artifacts checks leave in the findings directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::errors::Result;
use crate::stamp::StampCache;

/// One file in the findings directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub name: String,
    pub path: PathBuf,
    /// Whether the run that produced it marked it as passing.
    pub ok: bool,
}

/// List the regular files of `dir`, sorted by name, with their ok status.
///
/// A missing directory has no findings.
pub fn collect(dir: &Path, stamps: &StampCache) -> Result<Vec<Finding>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("listing findings in {}", dir.display()))
                .into());
        }
    };

    let mut findings = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing findings in {}", dir.display()))?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        findings.push(Finding {
            name: entry.file_name().to_string_lossy().into_owned(),
            ok: stamps.is_finding_ok(&path),
            path,
        });
    }

    findings.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(findings)
}

/// `true` when every finding is ok (vacuously for none).
pub fn all_ok(findings: &[Finding]) -> bool {
    findings.iter().all(|f| f.ok)
}
