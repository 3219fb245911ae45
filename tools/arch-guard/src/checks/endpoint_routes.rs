//! Consistency between the endpoint manifest and everything derived from it:
//! handler modules, `firebase.json` hosting rewrites and the exports of the
//! functions entry point.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::checks::violation::Violation;
use crate::checks::CheckResult;
use crate::config::LinterConfig;
use crate::manifest::{self, EndpointManifestEntry};
use crate::rewrites::{self, DerivedRewrite};

pub const NAME: &str = "Endpoint route consistency";

const FIREBASE_JSON: &str = "firebase.json";
const INDEX_TS: &str = "index.ts";

#[derive(Debug, Deserialize)]
struct FirebaseJson {
    #[serde(default)]
    hosting: Option<Hosting>,
}

#[derive(Debug, Deserialize)]
struct Hosting {
    #[serde(default)]
    rewrites: Vec<HostingRewrite>,
}

#[derive(Debug, Deserialize)]
struct HostingRewrite {
    source: Option<String>,
    function: Option<RewriteTarget>,
}

/// `"function": "devX"` or `"function": { "functionId": "devX", ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RewriteTarget {
    Name(String),
    Detailed {
        #[serde(rename = "functionId")]
        function_id: String,
    },
}

impl RewriteTarget {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) => name,
            Self::Detailed { function_id } => function_id,
        }
    }
}

/// Function rewrites in `firebase.json`, in file order.
fn parse_firebase_rewrites(content: &str) -> Result<Vec<DerivedRewrite>, serde_json::Error> {
    let parsed: FirebaseJson = serde_json::from_str(content)?;
    let rewrites = parsed
        .hosting
        .map(|h| h.rewrites)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| Some(DerivedRewrite::new(r.source?, r.function?.into_name())))
        .collect();
    Ok(rewrites)
}

fn has_handler_import(index: &str, app_export: &str, handler_file: &str) -> bool {
    let pattern = format!(
        r#"import\s*\{{[^}}]*\b{}\b[^}}]*\}}\s*from\s*['"]\./handlers/{}\.js['"]"#,
        regex::escape(app_export),
        regex::escape(handler_file)
    );
    Regex::new(&pattern).is_ok_and(|re| re.is_match(index))
}

fn has_export(index: &str, function_name: &str) -> bool {
    let name = regex::escape(function_name);
    let direct = format!(r"export\s+(?:const|let|function)\s+{name}\b");
    let grouped = format!(r"export\s*\{{[^}}]*\b{name}\b[^}}]*\}}");
    [direct, grouped]
        .iter()
        .any(|pattern| Regex::new(pattern).is_ok_and(|re| re.is_match(index)))
}

fn entry_label(entry: &EndpointManifestEntry) -> String {
    match (&entry.route_path, &entry.options.custom_source) {
        (route, _) if !route.is_empty() => format!("'{route}'"),
        (_, Some(source)) => format!("custom source '{source}'"),
        _ => format!("handler '{}'", entry.handler_file),
    }
}

/// Entries the rest of the check cannot reason about.
fn malformed_entries(entries: &[EndpointManifestEntry]) -> Vec<String> {
    let mut violations = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        if entry.handler_file.is_empty() {
            violations.push(format!(
                "Manifest entry #{} ({}) has no handlerFile.",
                i + 1,
                entry_label(entry)
            ));
        }
        if entry.route_path.is_empty() && entry.options.custom_source.is_none() {
            violations.push(format!(
                "Manifest entry #{} (handler '{}') has neither a routePath nor a customSource.",
                i + 1,
                entry.handler_file
            ));
        }
    }
    violations
}

fn handler_file_violations(config: &LinterConfig, entries: &[EndpointManifestEntry]) -> Vec<String> {
    let handlers = config.handlers_dir();
    let mut violations = Vec::new();

    for entry in entries.iter().filter(|e| !e.handler_file.is_empty()) {
        let rel_handler = format!("packages/functions/src/handlers/{}.ts", entry.handler_file);
        let path = handlers.join(format!("{}.ts", entry.handler_file));

        // Handler file must exist.
        if !path.exists() {
            violations.push(
                Violation::new(format!("Missing handler file: {rel_handler} (route: {}).", entry_label(entry)))
                    .fix(format!("Create {rel_handler} or correct handlerFile in {}.", manifest::MANIFEST_FILE))
                    .into(),
            );
            continue;
        }

        // Custom-source entries mount no route prefix to compare.
        if entry.route_path.is_empty() {
            continue;
        }
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable handler");
                violations.push(format!("{rel_handler} could not be read: {e}"));
                continue;
            }
        };
        match manifest::handler_route_prefix(&source) {
            None => violations.push(
                Violation::new(format!(
                    "Handler '{}.ts' is missing createBaseApp/stripPathPrefix/createResourceRouter usage.",
                    entry.handler_file
                ))
                .fix(format!("Mount the app with createBaseApp('{}').", entry.route_path))
                .into(),
            ),
            Some(route) if route != entry.route_path => violations.push(
                Violation::new(format!(
                    "Handler '{}.ts' uses route '{route}' but manifest expects '{}'.",
                    entry.handler_file, entry.route_path
                ))
                .fix("Make the handler's mounted route and the manifest routePath agree.")
                .into(),
            ),
            Some(_) => {}
        }
    }
    violations
}

fn rewrite_violations(firebase_json: &Path, entries: &[EndpointManifestEntry]) -> Vec<String> {
    if !firebase_json.exists() {
        return vec![format!("{FIREBASE_JSON} not found at {}", firebase_json.display())];
    }
    let actual = match fs::read_to_string(firebase_json) {
        Ok(content) => match parse_firebase_rewrites(&content) {
            Ok(actual) => actual,
            Err(e) => return vec![format!("{FIREBASE_JSON} could not be parsed: {e}")],
        },
        Err(e) => return vec![format!("{FIREBASE_JSON} could not be read: {e}")],
    };

    let expected = rewrites::generate_rewrites(entries);
    rewrites::compare_rewrites(&expected, &actual)
        .into_iter()
        .map(|v| format!("{FIREBASE_JSON} rewrite parity failed: {v}"))
        .collect()
}

fn index_violations(index_ts: &Path, entries: &[EndpointManifestEntry]) -> Vec<String> {
    if !index_ts.exists() {
        return vec![format!("{INDEX_TS} not found at {}", index_ts.display())];
    }
    let index = match fs::read_to_string(index_ts) {
        Ok(index) => index,
        Err(e) => return vec![format!("{INDEX_TS} could not be read: {e}")],
    };

    let mut violations = Vec::new();
    for entry in entries.iter().filter(|e| !e.handler_file.is_empty()) {
        let app_export = rewrites::app_export_name(entry);
        if !has_handler_import(&index, &app_export, &entry.handler_file) {
            violations.push(format!(
                "Missing import for {app_export} from './handlers/{}.js' in {INDEX_TS}.",
                entry.handler_file
            ));
        }

        let mut expected = vec![rewrites::dev_function_name(entry)];
        if !entry.options.dev_only {
            expected.push(rewrites::prod_function_name(entry));
        }
        for function in expected.iter().filter(|f| !has_export(&index, f)) {
            violations.push(format!(
                "Missing export '{function}' in {INDEX_TS} for route {}.",
                entry_label(entry)
            ));
        }
    }
    violations
}

pub fn check(config: &LinterConfig) -> CheckResult {
    check_with_manifest(config, None)
}

/// Runs the check against `manifest_override` instead of the manifest on disk
/// when one is given.
pub fn check_with_manifest(
    config: &LinterConfig,
    manifest_override: Option<Vec<EndpointManifestEntry>>,
) -> CheckResult {
    let entries = match manifest_override {
        Some(entries) => entries,
        None => {
            if !config.functions_src.is_dir() {
                tracing::debug!("no functions source tree; nothing to compare");
                return CheckResult::clean(NAME);
            }
            match manifest::read_manifest(config) {
                Ok(entries) => entries,
                Err(e) => return CheckResult::degraded(NAME, e),
            }
        }
    };
    if entries.is_empty() {
        return CheckResult::degraded(NAME, "No manifest entries found in ENDPOINT_MANIFEST.");
    }

    let mut violations = malformed_entries(&entries);
    violations.extend(handler_file_violations(config, &entries));
    violations.extend(rewrite_violations(&config.root_dir.join(FIREBASE_JSON), &entries));
    violations.extend(index_violations(&config.functions_src.join(INDEX_TS), &entries));

    CheckResult::from_violations(NAME, violations)
}
