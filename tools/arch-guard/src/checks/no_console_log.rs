use std::sync::LazyLock;

use regex::Regex;

use crate::checks::violation::Violation;
use crate::checks::{code_line_hits, read_source, CheckResult};
use crate::config::{self, LinterConfig};
use crate::walker;

pub const NAME: &str = "No console.log in Cloud Functions";

static CONSOLE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(console\.(?:log|warn|error|info))\s*\(").unwrap());

pub fn check(config: &LinterConfig) -> CheckResult {
    let files = walker::collect_ts_files(
        &config.functions_src,
        config::skip_dirs(&["__tests__", "test-utils", "scripts"]),
    );
    let mut violations = Vec::new();

    for file in &files {
        let Some(content) = read_source(config, file, &mut violations) else {
            continue;
        };
        let rel = config.relative(file);
        for hit in code_line_hits(&content, &CONSOLE_CALL) {
            violations.push(
                Violation::at(
                    format!("{rel}:{}", hit.line),
                    format!("uses {} instead of the Firebase logger.", hit.matched),
                )
                .rule("Cloud Functions must use the structured Firebase logger, not console.*.")
                .fix_lines([
                    "import { logger } from 'firebase-functions/logger';",
                    "Replace console.log(...) with logger.info(...), console.warn(...) with logger.warn(...), etc.",
                ])
                .see("docs/golden-principles.md")
                .into(),
            );
        }
    }

    CheckResult::from_violations(NAME, violations)
}
