//! Heuristics for tests that cannot fail: empty bodies, and files whose
//! assertions are too sparse for the number of test cases they declare.

use std::sync::LazyLock;

use regex::Regex;

use crate::checks::violation::Violation;
use crate::checks::{read_source, CheckResult};
use crate::config::LinterConfig;
use crate::scan::is_comment_line;
use crate::walker;

pub const NAME: &str = "Test quality (no empty/assertion-free tests)";

/// Minimum assertions per declared test case in one file.
pub const MIN_ASSERTION_RATIO: f64 = 0.1;

static TEST_CASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:it|test)\s*\(").unwrap());

static EMPTY_SINGLE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:it|test)\s*\([^)]*,\s*(?:async\s*)?\([^)]*\)\s*=>\s*\{\s*\}\s*\)").unwrap()
});

static ARROW_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"=>\s*\{\s*$").unwrap());

static CLOSING_BRACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\}\s*\)\s*;?\s*$").unwrap());

static ASSERTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bexpect\s*\(|\bassert(?:\.\w+)?\s*\(").unwrap());

#[derive(Debug, PartialEq, Eq)]
enum EmptyBody {
    SingleLine(usize),
    MultiLine(usize),
}

fn empty_bodies(lines: &[&str]) -> Vec<EmptyBody> {
    let mut found = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if is_comment_line(line) || !TEST_CASE.is_match(line) {
            continue;
        }
        if EMPTY_SINGLE_LINE.is_match(line) {
            found.push(EmptyBody::SingleLine(i + 1));
            continue;
        }
        if !ARROW_OPEN.is_match(line) {
            continue;
        }
        let closes_immediately = lines[i + 1..]
            .iter()
            .find(|l| !l.trim().is_empty())
            .is_some_and(|next| CLOSING_BRACE.is_match(next));
        if closes_immediately {
            found.push(EmptyBody::MultiLine(i + 1));
        }
    }
    found
}

/// `(test cases, assertions)` counted on code lines only.
fn counts(lines: &[&str]) -> (usize, usize) {
    lines
        .iter()
        .filter(|l| !is_comment_line(l))
        .fold((0, 0), |(tests, asserts), l| {
            (tests + TEST_CASE.find_iter(l).count(), asserts + ASSERTION.find_iter(l).count())
        })
}

fn too_few_assertions(tests: usize, assertions: usize) -> bool {
    tests > 0 && (assertions == 0 || (assertions as f64) / (tests as f64) < MIN_ASSERTION_RATIO)
}

pub fn check(config: &LinterConfig) -> CheckResult {
    let mut violations = Vec::new();

    for file in walker::collect_test_files(&config.root_dir) {
        let Some(content) = read_source(config, &file, &mut violations) else {
            continue;
        };
        let rel = config.relative(&file);
        let lines: Vec<&str> = content.lines().collect();

        for body in empty_bodies(&lines) {
            let (line, kind) = match body {
                EmptyBody::SingleLine(line) => (line, "an empty test body"),
                EmptyBody::MultiLine(line) => (line, "an empty test body (multi-line)"),
            };
            violations.push(
                Violation::at(format!("{rel}:{line}"), format!("has {kind}."))
                    .rule("Every test case must contain at least one expect() assertion.")
                    .fix_lines([
                        "Add assertions that verify the behavior under test, e.g.:",
                        "expect(result).toBe(expectedValue);",
                    ])
                    .see("docs/conventions/testing.md")
                    .into(),
            );
        }

        let (tests, assertions) = counts(&lines);
        if too_few_assertions(tests, assertions) {
            violations.push(
                Violation::at(
                    &rel,
                    format!("has {tests} test case(s) but only {assertions} assertion(s)."),
                )
                .rule(format!(
                    "Test files need at least {MIN_ASSERTION_RATIO} assertions per test case; assertion-free tests always pass."
                ))
                .fix_lines([
                    "Add expect() assertions to each test case. Example:",
                    "expect(result.success).toBe(true);",
                    "expect(body.data).toHaveLength(2);",
                ])
                .see("docs/conventions/testing.md")
                .into(),
            );
        }
    }

    CheckResult::from_violations(NAME, violations)
}
