use std::path::{Path, PathBuf};

use crate::checks::violation::Violation;
use crate::checks::{read_source, CheckResult};
use crate::config::{self, normalize_path, LinterConfig};
use crate::scan::markdown::{link_targets, local_link_path, prose_lines};
use crate::walker;

pub const NAME: &str = "Markdown link targets";

const ROOT_DOCS: &[&str] = &[
    "CLAUDE.md",
    "AGENTS.md",
    "README.md",
    "BUGS.md",
    "requirements.md",
    "thoughts/shared/plans/index.md",
];

const SCAN_ROOTS: &[&str] = &["docs", "thoughts/shared/plans/active", "thoughts/shared/handoffs"];

/// Historical material whose links are allowed to rot.
const SKIPPED_TREES: &[&str] = &[
    "thoughts/shared/plans/completed",
    "thoughts/shared/research",
    "thoughts/shared/plans/stretching",
    "thoughts/shared/plans/meditation",
];

const SKIPPED_FILE: &str = "meditations.md";

fn markdown_files(config: &LinterConfig) -> Vec<PathBuf> {
    let root = &config.root_dir;
    let skipped: Vec<PathBuf> = SKIPPED_TREES.iter().map(|t| root.join(t)).collect();
    let keep = |path: &Path| {
        path.file_name().is_some_and(|n| n != SKIPPED_FILE) && !skipped.iter().any(|s| path.starts_with(s))
    };

    let top_level = ROOT_DOCS.iter().map(|d| root.join(d)).filter(|p| p.is_file());
    let nested = SCAN_ROOTS
        .iter()
        .flat_map(|r| walker::collect_markdown_files(&root.join(r), config::skip_dirs(&[])));
    top_level.chain(nested).filter(|p| keep(p)).collect()
}

fn broken_links(doc: &Path, content: &str) -> Vec<(usize, String)> {
    let base = doc.parent().unwrap_or(Path::new("."));
    let mut broken = Vec::new();
    for (line, text) in prose_lines(content) {
        for target in link_targets(text) {
            let Some(path) = local_link_path(&target) else {
                continue;
            };
            if !normalize_path(&base.join(path)).exists() {
                broken.push((line, path.to_string()));
            }
        }
    }
    broken
}

pub fn check(config: &LinterConfig) -> CheckResult {
    let mut violations = Vec::new();

    for doc in markdown_files(config) {
        let Some(content) = read_source(config, &doc, &mut violations) else {
            continue;
        };
        let rel = config.relative(&doc);
        for (line, target) in broken_links(&doc, &content) {
            violations.push(
                Violation::at(format!("{rel}:{line}"), format!("links to '{target}' but file does not exist."))
                    .rule("All markdown links must resolve to real files on disk.")
                    .steps([
                        "If the file was renamed or moved, update the link.".to_string(),
                        "If the file was deleted, remove the link.".to_string(),
                        format!("Run `git log --diff-filter=R -- '{target}'` to find renames."),
                    ])
                    .see("docs/golden-principles.md")
                    .into(),
            );
        }
    }

    CheckResult::from_violations(NAME, violations)
}
