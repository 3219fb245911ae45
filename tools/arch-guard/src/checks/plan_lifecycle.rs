use crate::checks::violation::Violation;
use crate::checks::CheckResult;
use crate::config::LinterConfig;
use crate::walker;

pub const NAME: &str = "Plan lifecycle";

/// Root-level files that are not plans.
const ALLOWED_ROOT_FILES: &[&str] = &["index.md"];

pub fn check(config: &LinterConfig) -> CheckResult {
    let plans = walker::list_files(&config.plans_dir(), |n| {
        n.ends_with(".md") && !ALLOWED_ROOT_FILES.contains(&n)
    });

    let violations: Vec<String> = plans
        .iter()
        .map(|plan| {
            let rel = config.relative(plan);
            let file = plan.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            Violation::at(&rel, "is a plan file in the root directory.")
                .rule("Plans must live in thoughts/shared/plans/active/ or thoughts/shared/plans/completed/, not the root.")
                .fix_lines([
                    "Move the file to the appropriate subdirectory:".to_string(),
                    format!("git mv {rel} thoughts/shared/plans/active/{file}     # if in progress"),
                    format!("git mv {rel} thoughts/shared/plans/completed/{file}  # if shipped"),
                    "Then update thoughts/shared/plans/index.md with a summary row.".to_string(),
                ])
                .into()
        })
        .collect();

    CheckResult::from_violations(NAME, violations)
}
