use std::sync::LazyLock;

use regex::Regex;

use crate::checks::violation::Violation;
use crate::checks::{colocated_test_files, read_source, CheckResult};
use crate::config::LinterConfig;
use crate::scan::LineIndex;

pub const NAME: &str = "No inline ApiResponse in tests";

static INLINE_API_RESPONSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:export\s+)?(?:interface|type)\s+ApiResponse\b").unwrap());

const TEST_DIRS: &[&str] = &["handlers", "services", "repositories", "__tests__/integration"];

pub fn check(config: &LinterConfig) -> CheckResult {
    let dirs: Vec<_> = TEST_DIRS.iter().map(|d| config.functions_src.join(d)).collect();
    let mut violations = Vec::new();

    for file in colocated_test_files(&dirs) {
        let Some(content) = read_source(config, &file, &mut violations) else {
            continue;
        };
        let Some(found) = INLINE_API_RESPONSE.find(&content) else {
            continue;
        };
        let line = LineIndex::new(&content).line_of(found.start());
        violations.push(
            Violation::at(
                format!("{}:{line}", config.relative(&file)),
                "defines an inline ApiResponse type.",
            )
            .fix("Import it from packages/functions/src/__tests__/utils/api-types.ts instead.")
            .into(),
        );
    }

    CheckResult::from_violations(NAME, violations)
}
