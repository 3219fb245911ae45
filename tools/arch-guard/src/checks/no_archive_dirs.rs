use crate::checks::violation::Violation;
use crate::checks::CheckResult;
use crate::config::{self, LinterConfig};
use crate::walker::{self, WalkOptions};

pub const NAME: &str = "No archive directories";

const ARCHIVE_NAMES: &[&str] = &["archive", "archives"];

fn is_archive(name: &str) -> bool {
    ARCHIVE_NAMES.iter().any(|a| a.eq_ignore_ascii_case(name))
}

pub fn check(config: &LinterConfig) -> CheckResult {
    let options = WalkOptions::recursive(config::skip_dirs(&[])).skipping_hidden();
    let violations: Vec<String> = walker::collect_dirs(&config.root_dir, &options)
        .iter()
        .filter(|dir| dir.file_name().and_then(|n| n.to_str()).is_some_and(is_archive))
        .map(|dir| {
            let rel = config.relative(dir);
            Violation::new(format!("{rel} exists."))
                .rule("Archive directories are not allowed.")
                .fix(format!("Move any still-relevant content into active docs/plans, then delete {rel}/."))
                .see("docs/golden-principles.md")
                .into()
        })
        .collect();

    CheckResult::from_violations(NAME, violations)
}
