//! `AGENTS.md` cross-references: backtick-quoted repository paths, and the
//! links of the `## Guides` table.

use crate::checks::violation::Violation;
use crate::checks::CheckResult;
use crate::config::LinterConfig;
use crate::scan::markdown::{link_targets, local_link_path, prose_lines, rooted_code_paths};

pub const NAME: &str = "AGENTS.md file path references";

const AGENTS_MD: &str = "AGENTS.md";
const GUIDES_HEADING: &str = "## Guides";
const GUIDES_DIR: &str = "docs/guides/";

const ROOTS: &[&str] = &["packages", "ios", "scripts", "docs", "thoughts", "hooks"];

fn path_violations(config: &LinterConfig, content: &str) -> Vec<String> {
    let mut violations = Vec::new();
    for (line, text) in prose_lines(content) {
        for path in rooted_code_paths(text, ROOTS, false) {
            if config.root_dir.join(path).exists() {
                continue;
            }
            violations.push(
                Violation::at(format!("{AGENTS_MD}:{line}"), format!("references `{path}` but the path does not exist."))
                    .rule("All backtick-quoted file paths in AGENTS.md must resolve to real files or directories on disk.")
                    .steps([
                        "If the file was renamed or moved, update the path in AGENTS.md.".to_string(),
                        "If the file was deleted intentionally, remove the reference.".to_string(),
                        format!("Run `git log --diff-filter=R -- '{path}'` to find renames."),
                    ])
                    .see("docs/golden-principles.md")
                    .into(),
            );
        }
    }
    violations
}

/// Table rows between `## Guides` and the next level-two heading.
fn guides_table_rows(content: &str) -> impl Iterator<Item = (usize, &str)> {
    prose_lines(content)
        .skip_while(|(_, text)| !text.trim_start().starts_with(GUIDES_HEADING))
        .skip(1)
        .take_while(|(_, text)| !text.trim_start().starts_with("## "))
        .filter(|(_, text)| text.trim_start().starts_with('|'))
}

fn guide_link_violations(config: &LinterConfig, content: &str) -> Vec<String> {
    let mut violations = Vec::new();
    for (line, row) in guides_table_rows(content) {
        for target in link_targets(row) {
            let Some(path) = local_link_path(&target) else {
                continue;
            };
            let location = format!("{AGENTS_MD}:{line}");
            if !path.starts_with(GUIDES_DIR) {
                violations.push(
                    Violation::at(location, format!("has a guides table link '{path}' outside {GUIDES_DIR}."))
                        .rule("The guides table only links to guide files in docs/guides/.")
                        .fix(format!("Point the link at a guide under {GUIDES_DIR} and make sure it exists."))
                        .into(),
                );
            } else if !config.root_dir.join(path).exists() {
                violations.push(
                    Violation::at(location, format!("links to '{path}' but the target file does not exist."))
                        .rule("Guide links must point to existing local files.")
                        .fix(format!("Create the guide at {path} or update the table to an existing guide."))
                        .into(),
                );
            }
        }
    }
    violations
}

pub fn check(config: &LinterConfig) -> CheckResult {
    let agents_md = config.root_dir.join(AGENTS_MD);
    if !agents_md.is_file() {
        return CheckResult::clean(NAME);
    }
    let content = match std::fs::read_to_string(&agents_md) {
        Ok(content) => content,
        Err(e) => return CheckResult::degraded(NAME, format!("{AGENTS_MD} could not be read: {e}")),
    };

    let mut violations = path_violations(config, &content);
    violations.extend(guide_link_violations(config, &content));
    CheckResult::from_violations(NAME, violations)
}
