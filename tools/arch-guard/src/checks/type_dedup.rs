use std::collections::BTreeMap;

use crate::checks::violation::Violation;
use crate::checks::{read_source, CheckResult};
use crate::config::{self, LinterConfig};
use crate::scan::declarations::extract_exported_types;
use crate::walker;

pub const NAME: &str = "Type deduplication";

const TYPES_DIR: &str = "packages/functions/src/types/";

pub fn check(config: &LinterConfig) -> CheckResult {
    let files = walker::collect_ts_files(&config.functions_src, config::skip_dirs(&["__tests__"]));
    let mut violations = Vec::new();

    // type name -> file -> first declaring line
    let mut declarations: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for file in &files {
        let Some(content) = read_source(config, file, &mut violations) else {
            continue;
        };
        let rel = config.relative(file);
        for decl in extract_exported_types(&content) {
            declarations
                .entry(decl.name)
                .or_default()
                .entry(rel.clone())
                .or_insert(decl.line);
        }
    }

    for (type_name, sites) in declarations.iter().filter(|(_, sites)| sites.len() > 1) {
        let canonical = sites
            .keys()
            .find(|f| f.starts_with(TYPES_DIR))
            .cloned()
            .unwrap_or_else(|| format!("{TYPES_DIR}<resource>.ts"));

        violations.push(
            Violation::new(format!("Type '{type_name}' defined in multiple files:"))
                .section("At", sites.iter().map(|(file, line)| format!("{file}:{line}")))
                .rule(format!("Each type/interface must be defined exactly once, in {TYPES_DIR}."))
                .steps([
                    format!("Keep the definition in {canonical} (the canonical location)."),
                    "Delete the duplicate definition(s) from the other file(s).".to_string(),
                    format!("Update imports in consuming files to use: import {{ {type_name} }} from '../shared.js'"),
                ])
                .see("docs/conventions/typescript.md#type-deduplication")
                .into(),
        );
    }

    CheckResult::from_violations(NAME, violations)
}
