pub mod checks;
pub mod config;
pub mod error;
pub mod manifest;
pub mod reporter;
pub mod rewrites;
pub mod scan;
pub mod walker;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use rayon::prelude::*;

use checks::{CheckResult, CheckSpec, FreshnessResult, REGISTRY};
use config::LinterConfig;

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Runs one check, turning a panic into a failed result.
pub fn run_check(config: &LinterConfig, spec: &CheckSpec) -> CheckResult {
    let _span = tracing::debug_span!("check", id = spec.id).entered();
    let start = Instant::now();
    let result = panic::catch_unwind(AssertUnwindSafe(|| (spec.run)(config))).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::error!(id = spec.id, message, "check panicked");
        CheckResult::degraded(spec.name, format!("check panicked: {message}"))
    });
    tracing::debug!(
        elapsed = ?start.elapsed(),
        violations = result.violations.len(),
        "check finished"
    );
    result
}

/// Results come back in the order of `specs` whether or not they ran in
/// parallel.
pub fn run_checks(config: &LinterConfig, specs: &[&CheckSpec], parallel: bool) -> Vec<CheckResult> {
    if parallel {
        specs.par_iter().map(|spec| run_check(config, spec)).collect()
    } else {
        specs.iter().map(|spec| run_check(config, spec)).collect()
    }
}

/// Every registered check in display order, plus the freshness advisory.
pub fn run_all_checks(config: &LinterConfig) -> (Vec<CheckResult>, FreshnessResult) {
    let specs: Vec<&CheckSpec> = REGISTRY.iter().collect();
    let results = run_checks(config, &specs, true);
    let freshness = checks::quality_grades_freshness::check(config);
    (results, freshness)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exploding(_: &LinterConfig) -> CheckResult {
        panic!("manifest exploded")
    }

    #[test]
    fn panics_become_failed_results() {
        let spec = CheckSpec {
            id: "explode",
            name: "Exploding check",
            run: exploding,
        };
        let root = tempfile::tempdir().unwrap();
        let result = run_check(&LinterConfig::from_root(root.path()), &spec);
        assert!(!result.passed);
        assert_eq!(result.name, "Exploding check");
        assert_eq!(result.violations, vec!["check panicked: manifest exploded"]);
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let root = tempfile::tempdir().unwrap();
        let config = LinterConfig::from_root(root.path());
        let specs: Vec<&CheckSpec> = REGISTRY.iter().collect();
        let parallel = run_checks(&config, &specs, true);
        let sequential = run_checks(&config, &specs, false);
        assert_eq!(parallel, sequential);
        let names: Vec<&str> = parallel.iter().map(|r| r.name.as_str()).collect();
        let expected: Vec<&str> = REGISTRY.iter().map(|s| s.name).collect();
        assert_eq!(names, expected);
    }
}
