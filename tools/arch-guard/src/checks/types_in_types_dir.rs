use crate::checks::violation::Violation;
use crate::checks::{layer_source_files, read_source, CheckResult};
use crate::config::LinterConfig;
use crate::scan::declarations::extract_exported_types;

pub const NAME: &str = "Domain types only in types/";

/// Layers that must import their domain types instead of declaring them.
pub const SCANNED_LAYERS: &[&str] = &["services", "handlers", "repositories"];

pub fn check(config: &LinterConfig) -> CheckResult {
    let mut violations = Vec::new();

    for file in layer_source_files(config, SCANNED_LAYERS) {
        let Some(content) = read_source(config, &file, &mut violations) else {
            continue;
        };
        let rel = config.relative(&file);
        for decl in extract_exported_types(&content) {
            let name = &decl.name;
            violations.push(
                Violation::at(
                    format!("{rel}:{}", decl.line),
                    format!("exports {} '{name}' outside of types/ directory.", decl.kind),
                )
                .rule("Domain types must live in packages/functions/src/types/ and be imported via shared.ts.")
                .fix_lines([
                    format!("Move '{name}' to packages/functions/src/types/<resource>.ts."),
                    format!("Then import it where needed: import {{ {name} }} from '../shared.js'"),
                ])
                .see("docs/conventions/typescript.md")
                .into(),
            );
        }
    }

    CheckResult::from_violations(NAME, violations)
}
