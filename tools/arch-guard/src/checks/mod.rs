pub mod agents_md_refs;
pub mod arch_map_refs;
pub mod endpoint_routes;
pub mod ios_layers;
pub mod layer_deps;
pub mod markdown_links;
pub mod no_archive_dirs;
pub mod no_console_log;
pub mod no_inline_api_response;
pub mod no_raw_urlsession;
pub mod orphan_features;
pub mod plan_lifecycle;
pub mod quality_debt;
pub mod quality_grades_freshness;
pub mod repository_test_coverage;
pub mod schema_boundary;
pub mod schemas_in_schemas_dir;
pub mod shell_complexity;
pub mod test_factory_usage;
pub mod test_quality;
pub mod type_dedup;
pub mod types_in_types_dir;
pub mod untested_high_risk;
pub mod violation;

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::config::LinterConfig;
use crate::scan::is_comment_line;
use crate::walker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub violations: Vec<String>,
}

impl CheckResult {
    pub fn from_violations(name: &str, violations: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: violations.is_empty(),
            violations,
        }
    }

    pub fn clean(name: &str) -> Self {
        Self::from_violations(name, Vec::new())
    }

    /// The check could not do its job; reported as a single violation.
    pub fn degraded(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::from_violations(name, vec![reason.to_string()])
    }
}

/// Advisory result; never affects the exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessResult {
    pub stale: bool,
    pub message: String,
}

pub type CheckFn = fn(&LinterConfig) -> CheckResult;

#[derive(Debug, Clone, Copy)]
pub struct CheckSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub run: CheckFn,
}

/// Every gating check in display order.
pub const REGISTRY: &[CheckSpec] = &[
    CheckSpec { id: "layer-deps", name: layer_deps::NAME, run: layer_deps::check },
    CheckSpec { id: "schema-boundary", name: schema_boundary::NAME, run: schema_boundary::check },
    CheckSpec { id: "type-dedup", name: type_dedup::NAME, run: type_dedup::check },
    CheckSpec { id: "endpoint-routes", name: endpoint_routes::NAME, run: endpoint_routes::check },
    CheckSpec { id: "ios-layers", name: ios_layers::NAME, run: ios_layers::check },
    CheckSpec { id: "arch-map-refs", name: arch_map_refs::NAME, run: arch_map_refs::check },
    CheckSpec { id: "quality-debt", name: quality_debt::NAME, run: quality_debt::check },
    CheckSpec { id: "agents-md-refs", name: agents_md_refs::NAME, run: agents_md_refs::check },
    CheckSpec { id: "orphan-features", name: orphan_features::NAME, run: orphan_features::check },
    CheckSpec { id: "plan-lifecycle", name: plan_lifecycle::NAME, run: plan_lifecycle::check },
    CheckSpec { id: "no-console-log", name: no_console_log::NAME, run: no_console_log::check },
    CheckSpec { id: "no-raw-urlsession", name: no_raw_urlsession::NAME, run: no_raw_urlsession::check },
    CheckSpec { id: "types-in-types-dir", name: types_in_types_dir::NAME, run: types_in_types_dir::check },
    CheckSpec { id: "schemas-in-schemas-dir", name: schemas_in_schemas_dir::NAME, run: schemas_in_schemas_dir::check },
    CheckSpec { id: "no-skipped-tests", name: no_skipped_tests::NAME, run: no_skipped_tests::check },
    CheckSpec { id: "untested-high-risk", name: untested_high_risk::NAME, run: untested_high_risk::check },
    CheckSpec { id: "test-factory-usage", name: test_factory_usage::NAME, run: test_factory_usage::check },
    CheckSpec { id: "no-inline-api-response", name: no_inline_api_response::NAME, run: no_inline_api_response::check },
    CheckSpec { id: "no-focused-tests", name: no_focused_tests::NAME, run: no_focused_tests::check },
    CheckSpec { id: "test-quality", name: test_quality::NAME, run: test_quality::check },
    CheckSpec { id: "repository-test-coverage", name: repository_test_coverage::NAME, run: repository_test_coverage::check },
    CheckSpec { id: "markdown-links", name: markdown_links::NAME, run: markdown_links::check },
    CheckSpec { id: "no-archive-dirs", name: no_archive_dirs::NAME, run: no_archive_dirs::check },
    CheckSpec { id: "shell-complexity", name: shell_complexity::NAME, run: shell_complexity::check },
];

pub fn find(id: &str) -> Option<&'static CheckSpec> {
    REGISTRY.iter().find(|spec| spec.id == id)
}

/// Reads `path`, or records why it could not be read and returns `None`.
pub(crate) fn read_source(config: &LinterConfig, path: &Path, violations: &mut Vec<String>) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable input");
            violations.push(format!("{} could not be read: {e}", config.relative(path)));
            None
        }
    }
}

/// A regex hit on a non-comment line.
pub(crate) struct LineHit<'a> {
    pub line: usize,
    pub matched: &'a str,
}

/// First match of `pattern` on each line that is not a comment line.
pub(crate) fn code_line_hits<'a>(content: &'a str, pattern: &'a Regex) -> impl Iterator<Item = LineHit<'a>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !is_comment_line(line))
        .filter_map(move |(i, line)| {
            let caps = pattern.captures(line)?;
            let matched = caps.get(1).or_else(|| caps.get(0))?.as_str();
            Some(LineHit { line: i + 1, matched })
        })
}

/// Non-test `.ts` files sitting directly in each named layer directory.
pub(crate) fn layer_source_files(config: &LinterConfig, layers: &[&str]) -> Vec<PathBuf> {
    layers
        .iter()
        .flat_map(|layer| walker::list_files(&config.layer_dir(layer), walker::is_ts_source_file))
        .collect()
}

/// Test files sitting directly in each of `dirs`.
pub(crate) fn colocated_test_files(dirs: &[PathBuf]) -> Vec<PathBuf> {
    dirs.iter()
        .flat_map(|dir| walker::list_files(dir, walker::is_ts_test_file))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_ids_are_unique() {
        let ids: HashSet<&str> = REGISTRY.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), REGISTRY.len());
        assert!(REGISTRY.len() >= 20);
    }

    #[test]
    fn passed_tracks_violations() {
        assert!(CheckResult::clean("x").passed);
        let degraded = CheckResult::degraded("x", "manifest unreadable");
        assert!(!degraded.passed);
        assert_eq!(degraded.violations, vec!["manifest unreadable"]);
    }

    #[test]
    fn line_hits_skip_comments_and_prefer_first_group() {
        let pattern = Regex::new(r"\b(it\.only)\s*\(").unwrap();
        let content = "// it.only('a')\nit.only('b', () => {});\n";
        let hits: Vec<(usize, &str)> = code_line_hits(content, &pattern).map(|h| (h.line, h.matched)).collect();
        assert_eq!(hits, vec![(2, "it.only")]);
    }

    #[test]
    fn every_check_passes_on_an_empty_root() {
        let root = tempfile::tempdir().unwrap();
        let config = LinterConfig::from_root(root.path());
        for spec in REGISTRY {
            let result = (spec.run)(&config);
            assert!(result.passed, "{} failed on empty root: {:?}", spec.id, result.violations);
        }
    }
}
