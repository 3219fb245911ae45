use crate::checks::violation::Violation;
use crate::checks::CheckResult;
use crate::config::LinterConfig;
use crate::walker;

pub const NAME: &str = "Repository test coverage";

/// Abstract repositories that are only exercised through their subclasses.
pub const ALLOWED_UNTESTED: &[&str] = &["base.repository.ts"];

pub fn check(config: &LinterConfig) -> CheckResult {
    let dir = config.layer_dir("repositories");
    let repositories = walker::list_files(&dir, |n| {
        n.ends_with(".repository.ts") && !ALLOWED_UNTESTED.contains(&n)
    });

    let violations: Vec<String> = repositories
        .iter()
        .filter_map(|repo| {
            let stem = repo.file_name()?.to_str()?.trim_end_matches(".ts");
            let test = dir.join(format!("{stem}.test.ts"));
            if test.exists() {
                return None;
            }
            Some(
                Violation::at(config.relative(repo), "has no colocated test file.")
                    .rule("Every non-abstract repository must have a colocated .test.ts file.")
                    .fix_lines([
                        format!("Create {} with tests for all public methods.", config.relative(&test)),
                        "If this file is intentionally untested (e.g. an abstract base class), add it to ALLOWED_UNTESTED."
                            .to_string(),
                    ])
                    .into(),
            )
        })
        .collect();

    CheckResult::from_violations(NAME, violations)
}
