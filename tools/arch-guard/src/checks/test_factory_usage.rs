use std::sync::LazyLock;

use regex::Regex;

use crate::checks::violation::Violation;
use crate::checks::{colocated_test_files, read_source, CheckResult};
use crate::config::LinterConfig;

pub const NAME: &str = "Shared test factory usage";

static INLINE_FACTORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:export\s+)?(?:function|const)\s+(createMock\w+|createTest\w+|mock\w+Factory)").unwrap()
});

static SHARED_UTILS_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"from\s+['"][^'"]*(?:__tests__/utils|test-utils)"#).unwrap());

const LAYERS: &[&str] = &["handlers", "services", "repositories"];

/// First inline factory of a test file that does not use the shared utilities.
fn unshared_factory(content: &str) -> Option<&str> {
    if SHARED_UTILS_IMPORT.is_match(content) {
        return None;
    }
    Some(INLINE_FACTORY.captures(content)?.get(1)?.as_str())
}

pub fn check(config: &LinterConfig) -> CheckResult {
    let dirs: Vec<_> = LAYERS.iter().map(|l| config.layer_dir(l)).collect();
    let mut violations = Vec::new();

    for file in colocated_test_files(&dirs) {
        let Some(content) = read_source(config, &file, &mut violations) else {
            continue;
        };
        if let Some(factory) = unshared_factory(&content) {
            violations.push(
                Violation::at(
                    config.relative(&file),
                    format!("defines inline test factories ({factory}) but doesn't import from the shared test utilities."),
                )
                .section(
                    "Suggestion",
                    ["Move reusable factories to packages/functions/src/__tests__/utils/ and import them."],
                )
                .see("docs/conventions/testing.md")
                .into(),
            );
        }
    }

    CheckResult::from_violations(NAME, violations)
}
