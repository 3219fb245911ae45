use std::sync::LazyLock;

use regex::Regex;

use crate::checks::violation::Violation;
use crate::checks::{read_source, CheckResult};
use crate::config::LinterConfig;
use crate::scan::declarations::{discover_swift_types, SwiftTypeKind};
use crate::scan::{is_comment_line, strip_trailing_comment};
use crate::walker;

pub const NAME: &str = "iOS architecture layers";

static PREVIEW_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#Preview|_Previews:").unwrap());

static MOCK_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bMock\w+").unwrap());

/// "Files in `scanned` must not name types declared in `declared`."
struct LayerRule {
    scanned: &'static str,
    declared: &'static str,
    kinds: &'static [SwiftTypeKind],
    describe: fn(&str, &str) -> Violation,
}

const RULES: &[LayerRule] = &[
    LayerRule {
        scanned: "Views",
        declared: "Services",
        kinds: &[SwiftTypeKind::Class, SwiftTypeKind::Actor],
        describe: view_references_service,
    },
    LayerRule {
        scanned: "Components",
        declared: "ViewModels",
        kinds: &[SwiftTypeKind::Class],
        describe: component_references_view_model,
    },
];

fn view_references_service(location: &str, type_name: &str) -> Violation {
    Violation::at(
        location,
        format!("references {type_name} (a Service type). Views must not depend on Services directly."),
    )
    .rule("Views/ -> ViewModels/ -> Services/. Views access data through ViewModels, never by referencing Service types.")
    .steps([
        format!("Create or find a ViewModel in ios/BradOS/BradOS/ViewModels/ that wraps {type_name}."),
        format!("Move the {type_name} usage from the View into that ViewModel."),
        "Have the View observe the ViewModel via @StateObject or @ObservedObject instead.".to_string(),
    ])
    .see("docs/conventions/ios-swift.md")
}

fn component_references_view_model(location: &str, type_name: &str) -> Violation {
    Violation::at(
        location,
        format!("references {type_name} (a ViewModel type). Components must not depend on ViewModels."),
    )
    .rule("Components/ are reusable UI pieces that receive data via parameters (plain types, closures). They never reference ViewModel classes.")
    .steps([
        format!("Replace the {type_name} reference with a plain parameter (e.g. a struct, array, or closure)."),
        format!("Have the parent View that owns {type_name} extract the needed data and pass it in."),
        "If the Component needs to trigger actions, pass a closure instead of the whole ViewModel.".to_string(),
    ])
    .see("docs/conventions/ios-swift.md")
}

fn word_pattern(name: &str) -> Option<Regex> {
    match Regex::new(&format!(r"\b{}\b", regex::escape(name))) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(name, error = %e, "cannot build type pattern");
            None
        }
    }
}

/// `(line, type name)` for every reference to one of `types` outside comments
/// and preview scaffolding.
fn type_references(content: &str, types: &[(String, Regex)]) -> Vec<(usize, String)> {
    let mut hits = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if PREVIEW_LINE.is_match(line) {
            break;
        }
        if is_comment_line(line) {
            continue;
        }
        let code = strip_trailing_comment(line);
        let code = MOCK_NAME.replace_all(&code, "");
        for (name, pattern) in types {
            if pattern.is_match(&code) {
                hits.push((i + 1, name.clone()));
            }
        }
    }
    hits
}

pub fn check(config: &LinterConfig) -> CheckResult {
    let app = config.ios_app_dir();
    let mut violations = Vec::new();

    for rule in RULES {
        let scanned_dir = app.join(rule.scanned);
        if !scanned_dir.is_dir() {
            continue;
        }
        let types: Vec<(String, Regex)> = discover_swift_types(&app.join(rule.declared), rule.kinds)
            .into_iter()
            .filter_map(|name| word_pattern(&name).map(|re| (name, re)))
            .collect();
        if types.is_empty() {
            continue;
        }
        tracing::debug!(layer = rule.declared, count = types.len(), "discovered swift types");

        for file in walker::collect_swift_files(&scanned_dir) {
            let Some(content) = read_source(config, &file, &mut violations) else {
                continue;
            };
            let rel = config.relative(&file);
            for (line, type_name) in type_references(&content, &types) {
                violations.push((rule.describe)(&format!("{rel}:{line}"), &type_name).into());
            }
        }
    }

    CheckResult::from_violations(NAME, violations)
}
