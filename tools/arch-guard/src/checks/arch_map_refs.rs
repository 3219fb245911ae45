use crate::checks::violation::Violation;
use crate::checks::{read_source, CheckResult};
use crate::config::LinterConfig;
use crate::scan::markdown::{prose_lines, rooted_code_paths};
use crate::walker;

pub const NAME: &str = "Architecture map file references";

const ROOTS: &[&str] = &["packages", "ios", "scripts", "docs", "thoughts"];

pub fn check(config: &LinterConfig) -> CheckResult {
    let docs = walker::list_files(&config.architecture_docs_dir(), |n| n.ends_with(".md"));
    let mut violations = Vec::new();

    for doc in &docs {
        let Some(content) = read_source(config, doc, &mut violations) else {
            continue;
        };
        let rel_doc = config.relative(doc);

        for (line, text) in prose_lines(&content) {
            for path in rooted_code_paths(text, ROOTS, true) {
                if config.root_dir.join(path).exists() {
                    continue;
                }
                violations.push(
                    Violation::at(format!("{rel_doc}:{line}"), format!("references `{path}` but file does not exist."))
                        .rule("All backtick-quoted file paths in architecture docs must resolve to real files on disk.")
                        .steps([
                            format!("If the file was renamed or moved, update the path in {rel_doc}."),
                            "If the file was deleted, remove the reference from the doc.".to_string(),
                            format!("Run `git log --diff-filter=R -- '{path}'` to find renames."),
                        ])
                        .see("docs/golden-principles.md")
                        .into(),
                );
            }
        }
    }

    CheckResult::from_violations(NAME, violations)
}
