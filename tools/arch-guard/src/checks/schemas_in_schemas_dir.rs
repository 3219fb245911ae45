use std::sync::LazyLock;

use regex::Regex;

use crate::checks::types_in_types_dir::SCANNED_LAYERS;
use crate::checks::violation::Violation;
use crate::checks::{code_line_hits, layer_source_files, read_source, CheckResult};
use crate::config::LinterConfig;

pub const NAME: &str = "Zod schemas only in schemas/";

static SCHEMA_BUILDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(z\.(?:object|string|number|boolean|array|enum|union|intersection|literal|tuple|record|nativeEnum|discriminatedUnion))\s*\(",
    )
    .unwrap()
});

static Z_INFER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bz\.infer\b").unwrap());

pub fn check(config: &LinterConfig) -> CheckResult {
    let mut violations = Vec::new();

    for file in layer_source_files(config, SCANNED_LAYERS) {
        let Some(content) = read_source(config, &file, &mut violations) else {
            continue;
        };
        let rel = config.relative(&file);
        let lines: Vec<&str> = content.lines().collect();

        for hit in code_line_hits(&content, &SCHEMA_BUILDER) {
            if lines.get(hit.line - 1).is_some_and(|l| Z_INFER.is_match(l)) {
                continue;
            }
            violations.push(
                Violation::at(
                    format!("{rel}:{}", hit.line),
                    format!("constructs a Zod schema ({}) outside of schemas/ directory.", hit.matched),
                )
                .rule("Zod schemas must live in packages/functions/src/schemas/, one file per resource.")
                .fix_lines([
                    "Move the schema definition to packages/functions/src/schemas/<resource>.schema.ts.",
                    "Then import it: import { mySchema } from '../schemas/<resource>.schema.js'",
                ])
                .see("docs/golden-principles.md")
                .into(),
            );
        }
    }

    CheckResult::from_violations(NAME, violations)
}
