use std::collections::BTreeSet;
use std::path::Path;

use crate::checks::violation::Violation;
use crate::checks::{read_source, CheckResult};
use crate::config::LinterConfig;
use crate::scan::routes::registers_routes;
use crate::walker;

pub const NAME: &str = "Orphan features";

/// Handler module name -> feature whose architecture doc covers it.
pub const HANDLER_FEATURES: &[(&str, &str)] = &[
    ("exercises", "lifting"),
    ("plans", "lifting"),
    ("mesocycles", "lifting"),
    ("workouts", "lifting"),
    ("workoutSets", "lifting"),
    ("stretches", "stretching"),
    ("stretchSessions", "stretching"),
    ("meditationSessions", "meditation"),
    ("guidedMeditations", "meditation"),
    ("tts", "meditation"),
    ("health-sync", "health"),
    ("health", "health"),
    ("calendar", "calendar"),
    ("today-coach", "today"),
    ("cycling", "cycling"),
    ("cycling-coach", "cycling"),
    ("strava-webhook", "cycling"),
    ("mealplans", "meal-planning"),
    ("meals", "meal-planning"),
    ("recipes", "meal-planning"),
    ("ingredients", "meal-planning"),
    ("barcodes", "meal-planning"),
    ("mealplan-debug", "meal-planning"),
];

pub fn feature_for(handler: &str) -> Option<&'static str> {
    HANDLER_FEATURES
        .iter()
        .find(|(name, _)| *name == handler)
        .map(|(_, feature)| *feature)
}

fn doc_template(title: &str, handler_file: &str, feature: &str) -> [String; 7] {
    [
        format!("# {title} Architecture"),
        "## Data Flow".to_string(),
        "handler -> service -> repository -> Firestore".to_string(),
        "## Key Files".to_string(),
        format!("- `packages/functions/src/handlers/{handler_file}`"),
        format!("- `packages/functions/src/services/{feature}.service.ts`"),
        format!("- `packages/functions/src/types/{feature}.ts`"),
    ]
}

fn title_case(feature: &str) -> String {
    let mut chars = feature.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn documented_features(arch_dir: &Path) -> BTreeSet<String> {
    walker::list_files(arch_dir, |n| n.ends_with(".md"))
        .iter()
        .filter_map(|p| p.file_stem()?.to_str().map(str::to_string))
        .collect()
}

pub fn check(config: &LinterConfig) -> CheckResult {
    let handlers = walker::list_files(&config.handlers_dir(), walker::is_ts_source_file);
    let documented = documented_features(&config.architecture_docs_dir());
    let mut violations = Vec::new();

    for file in &handlers {
        let Some(content) = read_source(config, file, &mut violations) else {
            continue;
        };
        if !registers_routes(&content) {
            continue;
        }
        let Some(handler_file) = file.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let handler = handler_file.trim_end_matches(".ts");
        let rel = config.relative(file);

        match feature_for(handler) {
            None => violations.push(
                Violation::at(&rel, "defines routes but has no entry in the handler-to-feature map.")
                    .rule("Every handler with Express routes must map to a feature and have an architecture doc.")
                    .steps([
                        format!("Add (\"{handler}\", \"<feature>\") to HANDLER_FEATURES in the orphan-features check."),
                        "Create docs/architecture/<feature>.md using the template below.".to_string(),
                    ])
                    .example(doc_template("<Feature>", handler_file, "<feature>"))
                    .see("docs/golden-principles.md")
                    .into(),
            ),
            Some(feature) if !documented.contains(feature) => violations.push(
                Violation::at(
                    &rel,
                    format!("maps to feature '{feature}' but docs/architecture/{feature}.md does not exist."),
                )
                .rule("Every feature with handlers must have an architecture doc in docs/architecture/.")
                .steps([
                    format!("Create docs/architecture/{feature}.md."),
                    "Use docs/architecture/lifting.md as a template for structure.".to_string(),
                ])
                .example(doc_template(&title_case(feature), handler_file, feature))
                .see("docs/golden-principles.md")
                .into(),
            ),
            Some(_) => {}
        }
    }

    CheckResult::from_violations(NAME, violations)
}
