//! Unchecked tech-debt items in `docs/quality-grades.md` that the code already
//! shows to be done.

use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::checks::violation::Violation;
use crate::checks::CheckResult;
use crate::config::{self, LinterConfig};
use crate::walker;

pub const NAME: &str = "Quality-grade debt completion";

pub const QUALITY_GRADES: &str = "docs/quality-grades.md";

const ACTIVE_SECTION: &str = "## Active Tech Debt";

static UNCHECKED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*\[ \]\s*\*\*(?P<label>[^*]+)\*\*").unwrap());

static ROUTER_FACTORY_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:createResourceRouter|createBaseApp)\s*\(").unwrap());

static TEST_UTILS_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]\.\./test-utils/index\.js['"]"#).unwrap());

/// Where a usage count is taken.
#[derive(Clone, Copy)]
enum Scope {
    /// Non-test sources under `handlers/`.
    Handlers,
    /// Backend test files under the functions source tree.
    BackendTests,
}

impl Scope {
    fn files(self, config: &LinterConfig) -> Vec<PathBuf> {
        match self {
            Scope::Handlers => walker::collect_ts_files(&config.handlers_dir(), config::skip_dirs(&[])),
            Scope::BackendTests => walker::collect_test_files(&config.functions_src),
        }
    }
}

enum Evidence {
    /// A file that must exist and contain every marker.
    File {
        path: &'static str,
        markers: &'static [&'static str],
    },
    /// At least `min` files in `scope` matching `pattern`.
    Usage {
        scope: Scope,
        pattern: &'static LazyLock<Regex>,
        min: usize,
        describe: &'static str,
    },
}

impl Evidence {
    fn holds(&self, config: &LinterConfig) -> bool {
        match self {
            Evidence::File { path, markers } => match fs::read_to_string(config.root_dir.join(path)) {
                Ok(content) => markers.iter().all(|marker| content.contains(marker)),
                Err(_) => false,
            },
            Evidence::Usage { scope, pattern, min, .. } => {
                let matching = scope
                    .files(config)
                    .iter()
                    .filter_map(|file| fs::read_to_string(file).ok())
                    .filter(|content| pattern.is_match(content))
                    .count();
                matching >= *min
            }
        }
    }

    fn description(&self) -> String {
        match self {
            Evidence::File { path, .. } => (*path).to_string(),
            Evidence::Usage { min, describe, .. } => format!("at least {min} {describe}"),
        }
    }
}

struct CompletionRule {
    label: &'static str,
    evidence: &'static [Evidence],
}

static RULES: &[CompletionRule] = &[
    CompletionRule {
        label: "Calendar missing cycling activities",
        evidence: &[
            Evidence::File {
                path: "packages/functions/src/services/calendar.service.ts",
                markers: &[
                    "import { getCyclingActivities } from './firestore-cycling.service.js';",
                    "type: 'cycling'",
                    "dayData.summary.hasCycling = true;",
                ],
            },
            Evidence::File {
                path: "packages/functions/src/services/calendar.service.test.ts",
                markers: &[
                    "should include cycling activities in days map",
                    "should set hasCycling flag and increment totals when cycling exists",
                ],
            },
        ],
    },
    CompletionRule {
        label: "createResourceRouter factory",
        evidence: &[
            Evidence::File {
                path: "packages/functions/src/middleware/create-resource-router.ts",
                markers: &["export function createResourceRouter", "export function createBaseApp"],
            },
            Evidence::File {
                path: "packages/functions/src/middleware/create-resource-router.test.ts",
                markers: &[],
            },
            Evidence::Usage {
                scope: Scope::Handlers,
                pattern: &ROUTER_FACTORY_CALL,
                min: 1,
                describe: "handler calling createResourceRouter or createBaseApp",
            },
        ],
    },
    CompletionRule {
        label: "Shared test utilities",
        evidence: &[
            Evidence::File {
                path: "packages/functions/src/test-utils/index.ts",
                markers: &[],
            },
            Evidence::File {
                path: "packages/functions/src/test-utils/firestore-mock.ts",
                markers: &[],
            },
            Evidence::Usage {
                scope: Scope::BackendTests,
                pattern: &TEST_UTILS_IMPORT,
                min: 3,
                describe: "backend test files importing ../test-utils/index.js",
            },
        ],
    },
];

#[derive(Debug, PartialEq, Eq)]
struct DebtItem<'a> {
    label: &'a str,
    line: usize,
}

/// Unchecked bold items under `## Active Tech Debt`, up to the next `## ` heading.
fn unchecked_items(markdown: &str) -> Vec<DebtItem<'_>> {
    let mut in_active = false;
    let mut items = Vec::new();
    for (i, line) in markdown.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with(ACTIVE_SECTION) {
            in_active = true;
            continue;
        }
        if !in_active {
            continue;
        }
        if trimmed.starts_with("## ") {
            break;
        }
        if let Some(label) = UNCHECKED_ITEM.captures(line).and_then(|c| c.name("label")) {
            items.push(DebtItem {
                label: label.as_str().trim(),
                line: i + 1,
            });
        }
    }
    items
}

fn rule_is_complete(config: &LinterConfig, rule: &CompletionRule) -> bool {
    rule.evidence.iter().all(|e| e.holds(config))
}

pub fn check(config: &LinterConfig) -> CheckResult {
    let path = config.root_dir.join(QUALITY_GRADES);
    if !path.is_file() {
        return CheckResult::clean(NAME);
    }
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => return CheckResult::degraded(NAME, format!("{QUALITY_GRADES} could not be read: {e}")),
    };

    let mut violations = Vec::new();
    for item in unchecked_items(&content) {
        let Some(rule) = RULES.iter().find(|r| r.label == item.label) else {
            continue;
        };
        if !rule_is_complete(config, rule) {
            continue;
        }
        violations.push(
            Violation::at(
                format!("{QUALITY_GRADES}:{}", item.line),
                format!("keeps \"{}\" unchecked, but source evidence shows completion.", item.label),
            )
            .rule("Unchecked technical debt must not remain once code evidence indicates completion.")
            .fix("Set the item to [x] or move it to `## Recently Completed` with evidence details.")
            .section("Evidence", rule.evidence.iter().map(Evidence::description))
            .see("docs/golden-principles.md")
            .into(),
        );
    }

    CheckResult::from_violations(NAME, violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unchecked_bold_items_are_collected() {
        let markdown = "\
## Active Tech Debt
- [ ] **Calendar missing cycling activities** - not shown
- [x] **Shared test utilities**
- [ ] plain item
";
        assert_eq!(
            unchecked_items(markdown),
            vec![DebtItem {
                label: "Calendar missing cycling activities",
                line: 2
            }]
        );
    }

    #[test]
    fn items_outside_active_section_are_ignored() {
        let markdown = "\
# Quality Grades
- [ ] **Before the section**

## Active Tech Debt
- [ ] **createResourceRouter factory**

## Backlog Ideas
- [ ] **Shared test utilities**
";
        assert_eq!(
            unchecked_items(markdown),
            vec![DebtItem {
                label: "createResourceRouter factory",
                line: 5
            }]
        );
    }

    #[test]
    fn usage_evidence_reads_as_a_count() {
        let rule = RULES.iter().find(|r| r.label == "Shared test utilities").unwrap();
        let described: Vec<String> = rule.evidence.iter().map(Evidence::description).collect();
        assert_eq!(
            described[2],
            "at least 3 backend test files importing ../test-utils/index.js"
        );
    }
}
