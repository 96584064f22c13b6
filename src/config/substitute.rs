// src/config/substitute.rs

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\?\$\{([^}]*)\}").expect("placeholder pattern is valid"));

/// Replace `${key}` with `params[key]`.
///
/// An escaped `\${key}` is not replaced and keeps its backslash, so a shell
/// running the result sees the escape too. Placeholders naming an unknown
/// key are left as they are.
pub fn substitute(template: &str, params: &BTreeMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let whole = &caps[0];
            if whole.starts_with('\\') {
                return whole.to_string();
            }
            params
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| whole.to_string())
        })
        .into_owned()
}
