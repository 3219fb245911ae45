use std::sync::LazyLock;

use regex::Regex;

use crate::checks::violation::Violation;
use crate::checks::{code_line_hits, read_source, CheckResult};
use crate::config::LinterConfig;
use crate::walker;

pub const NAME: &str = "No raw URLSession in iOS";

static URLSESSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bURLSession\b").unwrap());

/// Files that own a networking concern and may talk to URLSession directly.
pub const ALLOWED_FILES: &[&str] = &[
    "APIClient.swift",
    "StravaAuthManager.swift",
    "DebugLogExporter.swift",
    "DebugSpanExporter.swift",
];

fn is_exempt(file_name: &str) -> bool {
    ALLOWED_FILES.contains(&file_name) || file_name.ends_with("Tests.swift") || file_name.ends_with("Test.swift")
}

pub fn check(config: &LinterConfig) -> CheckResult {
    let files = walker::collect_swift_files(&config.ios_app_dir());
    let mut violations = Vec::new();

    for file in &files {
        let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if is_exempt(name) {
            continue;
        }
        let Some(content) = read_source(config, file, &mut violations) else {
            continue;
        };
        let rel = config.relative(file);
        for hit in code_line_hits(&content, &URLSESSION) {
            violations.push(
                Violation::at(
                    format!("{rel}:{}", hit.line),
                    "uses URLSession directly instead of the shared APIClient.",
                )
                .rule("All iOS HTTP requests must go through the shared APIClient with App Check.")
                .fix_lines([
                    "Use APIClient.shared for HTTP requests instead of URLSession directly.",
                    "See ios/BradOS/BradOS/Services/APIClient.swift for the shared client.",
                ])
                .see("docs/conventions/ios-swift.md")
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
    fn allow_list_and_test_files_are_exempt() {
        assert!(is_exempt("APIClient.swift"));
        assert!(is_exempt("WorkoutServiceTests.swift"));
        assert!(!is_exempt("WorkoutService.swift"));
    }
}
