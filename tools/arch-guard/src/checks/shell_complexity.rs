//! Cyclomatic-complexity guardrail for shell scripts, so orchestration logic
//! migrates to typed tooling instead of growing in bash.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::checks::violation::Violation;
use crate::checks::{read_source, CheckResult};
use crate::config::{self, LinterConfig};
use crate::walker::{self, WalkOptions};

pub const NAME: &str = "Shell script complexity guardrail";

const DEFAULT_LIMIT: usize = 10;
const TRANSITIONAL_LIMIT: usize = 20;

const SHELL_INTERPRETERS: &[&str] = &["sh", "bash", "dash", "ksh", "zsh", "ash", "csh", "tcsh"];

const TRANSITIONAL_SCRIPTS: &[&str] = &["qa-start.sh", "qa-stop.sh", "setup-ios-testing.sh"];

/// Thin wrappers around compiled tools, documented as exempt.
const SHIM_SCRIPTS: &[&str] = &[
    "hooks/pre-commit",
    "scripts/validate.sh",
    "scripts/doctor.sh",
    "scripts/run-integration-tests.sh",
    "scripts/arch-lint",
    "scripts/arch-guard",
    "scripts/brad-precommit",
    "scripts/brad-validate",
];

/// Wrapper names that are exempt when they only build and `exec` a binary.
const WRAPPER_NAMES: &[&str] = &["arch-lint", "arch-guard", "brad-precommit", "brad-validate"];

static LOGICAL_OPERATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&&|\|\|").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptClass {
    Default,
    Transitional,
    Shim,
}

impl ScriptClass {
    fn of(rel: &str, content: &str) -> Self {
        let file_name = rel.rsplit('/').next().unwrap_or(rel);
        if SHIM_SCRIPTS.iter().any(|shim| rel.ends_with(shim)) || is_exec_wrapper(file_name, content) {
            Self::Shim
        } else if TRANSITIONAL_SCRIPTS.contains(&file_name) {
            Self::Transitional
        } else {
            Self::Default
        }
    }

    fn limit(self) -> Option<usize> {
        match self {
            Self::Default => Some(DEFAULT_LIMIT),
            Self::Transitional => Some(TRANSITIONAL_LIMIT),
            Self::Shim => None,
        }
    }
}

impl fmt::Display for ScriptClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "default",
            Self::Transitional => "transitional legacy",
            Self::Shim => "shim",
        })
    }
}

fn is_exec_wrapper(file_name: &str, content: &str) -> bool {
    WRAPPER_NAMES.contains(&file_name)
        && content.contains("target/release/")
        && content.contains("cargo build")
        && content.lines().any(|l| l.trim_start().starts_with("exec "))
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Complexity {
    lines: usize,
    branches: usize,
    loops: usize,
}

impl Complexity {
    fn estimate(&self) -> usize {
        1 + self.branches + self.loops
    }
}

fn measure(content: &str) -> Complexity {
    let mut metrics = Complexity::default();
    for line in content.lines() {
        let code = strip_comment(line);
        let code = code.trim();
        if code.is_empty() {
            continue;
        }
        metrics.lines += 1;
        metrics.branches += count_keywords(code, &["if", "elif", "case"]);
        metrics.branches += LOGICAL_OPERATOR.find_iter(code).count();
        metrics.loops += count_keywords(code, &["for", "while", "until", "select"]);
    }
    metrics
}

fn count_keywords(line: &str, keywords: &[&str]) -> usize {
    line.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|word| keywords.contains(word))
        .count()
}

/// `line` up to its first `#` outside quotes.
fn strip_comment(line: &str) -> &str {
    let mut single = false;
    let mut double = false;
    let mut prev = '\0';
    for (i, ch) in line.char_indices() {
        match ch {
            '\'' if !double && prev != '\\' => single = !single,
            '"' if !single && prev != '\\' => double = !double,
            '#' if !single && !double => return &line[..i],
            _ => {}
        }
        prev = ch;
    }
    line
}

fn is_shell_interpreter(token: &str) -> bool {
    let binary = token.rsplit('/').next().unwrap_or(token).to_ascii_lowercase();
    SHELL_INTERPRETERS.contains(&binary.as_str())
}

fn has_shell_shebang(first_line: &str) -> bool {
    let Some(shebang) = first_line.strip_prefix("#!") else {
        return false;
    };
    let mut tokens = shebang.split_whitespace();
    match tokens.next() {
        Some(interpreter) if is_shell_interpreter(interpreter) => true,
        Some(interpreter) if interpreter.ends_with("/env") => tokens.any(is_shell_interpreter),
        _ => false,
    }
}

fn starts_with_shell_shebang(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|content| has_shell_shebang(content.lines().next().unwrap_or_default()))
        .unwrap_or(false)
}

fn shell_scripts(root: &Path) -> Vec<PathBuf> {
    let options = WalkOptions::recursive(config::skip_dirs(&["ios", "public"]));
    let mut scripts: BTreeSet<PathBuf> = walker::collect_files(root, &options, |n| n.ends_with(".sh"))
        .into_iter()
        .collect();
    for dir in ["hooks", "scripts"] {
        scripts.extend(
            walker::collect_files(&root.join(dir), &options, |n| !n.ends_with(".sh"))
                .into_iter()
                .filter(|p| starts_with_shell_shebang(p)),
        );
    }
    scripts.into_iter().collect()
}

pub fn check(config: &LinterConfig) -> CheckResult {
    let mut violations = Vec::new();

    for script in shell_scripts(&config.root_dir) {
        let Some(content) = read_source(config, &script, &mut violations) else {
            continue;
        };
        let rel = config.relative(&script);
        let class = ScriptClass::of(&rel, &content);
        let Some(limit) = class.limit() else {
            continue;
        };
        let metrics = measure(&content);
        if metrics.estimate() <= limit {
            continue;
        }
        violations.push(
            Violation::new(format!(
                "{rel}: CC_estimate={}, lines={}, branches={}, loops={} ({class} script limit {limit}).",
                metrics.estimate(),
                metrics.lines,
                metrics.branches,
                metrics.loops,
            ))
            .section(
                "Guidance",
                ["Reduce orchestration complexity in this shell script or migrate it to a Rust tool under tools/."],
            )
            .see("docs/conventions/workflow.md")
            .into(),
        );
    }

    CheckResult::from_violations(NAME, violations)
}
