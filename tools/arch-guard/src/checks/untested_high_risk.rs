use std::path::Path;

use crate::checks::violation::Violation;
use crate::checks::CheckResult;
use crate::config::LinterConfig;
use crate::walker;

pub const NAME: &str = "Untested high-risk files";

/// Substrings of a lower-cased file stem that mark it as high risk.
pub const HIGH_RISK_PATTERNS: &[&str] = &["today-coach", "openai", "ai", "coach"];

const SCANNED: &[(&str, &str)] = &[("handlers", "handler"), ("services", "service")];

fn risk_matches(stem: &str) -> Vec<&'static str> {
    let lower = stem.to_lowercase();
    HIGH_RISK_PATTERNS
        .iter()
        .copied()
        .filter(|pattern| lower.contains(pattern))
        .collect()
}

/// A high-risk file counts as tested with a co-located test or an
/// integration test named after it.
fn has_test(config: &LinterConfig, dir: &Path, stem: &str) -> bool {
    let integration = config
        .functions_src
        .join("__tests__/integration")
        .join(format!("{}.integration.test.ts", stem.trim_end_matches(".service")));
    dir.join(format!("{stem}.test.ts")).exists() || integration.exists()
}

pub fn check(config: &LinterConfig) -> CheckResult {
    let mut violations = Vec::new();

    for (layer, kind) in SCANNED {
        let dir = config.layer_dir(layer);
        let files = walker::list_files(&dir, |n| walker::is_ts_source_file(n) && n != "index.ts");
        for file in &files {
            let Some(stem) = file.file_name().and_then(|n| n.to_str()).map(|n| n.trim_end_matches(".ts")) else {
                continue;
            };
            let matches = risk_matches(stem);
            if matches.is_empty() || has_test(config, &dir, stem) {
                continue;
            }
            let expected_test = config.relative(&dir.join(format!("{stem}.test.ts")));
            violations.push(
                Violation::at(
                    config.relative(file),
                    format!("is a high-risk {kind} (matches: {}) with no test file.", matches.join(", ")),
                )
                .rule("High-risk files (AI integrations, coach logic) MUST have tests.")
                .fix(format!("Create {expected_test} with at least basic smoke tests."))
                .see("docs/golden-principles.md")
                .into(),
            );
        }
    }

    CheckResult::from_violations(NAME, violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_are_case_insensitive_substrings() {
        assert_eq!(risk_matches("today-coach"), vec!["today-coach", "coach"]);
        assert_eq!(risk_matches("OpenAIClient"), vec!["openai", "ai"]);
        assert!(risk_matches("exercises").is_empty());
    }
}
