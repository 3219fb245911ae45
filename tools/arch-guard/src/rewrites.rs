//! Naming conventions that turn manifest entries into Cloud Function names and
//! hosting rewrites, plus the diff against the rewrites actually configured.

use std::collections::HashSet;
use std::fmt;

use crate::manifest::EndpointManifestEntry;

const DEV_PREFIX: &str = "dev";
const PROD_PREFIX: &str = "prod";
const DEV_API_ROOT: &str = "/api/dev";
const PROD_API_ROOT: &str = "/api/prod";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivedRewrite {
    pub source: String,
    pub function: String,
}

impl DerivedRewrite {
    pub fn new(source: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            function: function.into(),
        }
    }
}

impl fmt::Display for DerivedRewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.function)
    }
}

fn tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split(['-', '_', '/', '\\']).filter(|t| !t.is_empty())
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn decapitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `meal-plan-debug` -> `MealPlanDebug`. Inner casing of each token is kept.
pub fn to_pascal_case(s: &str) -> String {
    tokens(s).map(capitalize).collect()
}

/// `meal-plan-debug` -> `mealPlanDebug`.
pub fn to_camel_case(s: &str) -> String {
    decapitalize(&to_pascal_case(s))
}

pub fn function_stem(entry: &EndpointManifestEntry) -> String {
    if let Some(stem) = &entry.function_stem {
        return stem.clone();
    }
    if entry.route_path.is_empty() {
        to_pascal_case(&entry.handler_file)
    } else {
        to_pascal_case(&entry.route_path)
    }
}

pub fn dev_function_name(entry: &EndpointManifestEntry) -> String {
    format!("{DEV_PREFIX}{}", function_stem(entry))
}

pub fn prod_function_name(entry: &EndpointManifestEntry) -> String {
    format!("{PROD_PREFIX}{}", function_stem(entry))
}

/// Name the handler module's express app is imported under in `index.ts`.
pub fn app_export_name(entry: &EndpointManifestEntry) -> String {
    format!("{}App", to_camel_case(&entry.handler_file))
}

fn rewrite_pair(source: String, function: String) -> [DerivedRewrite; 2] {
    let nested = format!("{source}/**");
    [
        DerivedRewrite::new(source, function.clone()),
        DerivedRewrite::new(nested, function),
    ]
}

fn source_for(entry: &EndpointManifestEntry, api_root: &str) -> String {
    entry
        .options
        .custom_source
        .clone()
        .unwrap_or_else(|| format!("{api_root}/{}", entry.route_path))
}

/// Expected rewrites: every dev pair first, then the prod pairs of entries
/// that are not dev-only.
pub fn generate_rewrites(manifest: &[EndpointManifestEntry]) -> Vec<DerivedRewrite> {
    let dev = manifest
        .iter()
        .flat_map(|e| rewrite_pair(source_for(e, DEV_API_ROOT), dev_function_name(e)));
    let prod = manifest
        .iter()
        .filter(|e| !e.options.dev_only)
        .flat_map(|e| rewrite_pair(source_for(e, PROD_API_ROOT), prod_function_name(e)));
    dev.chain(prod).collect()
}

fn sorted_difference<'a>(
    from: &'a [DerivedRewrite],
    exclude: &HashSet<&DerivedRewrite>,
) -> Vec<&'a DerivedRewrite> {
    let mut diff: Vec<&DerivedRewrite> = from.iter().filter(|r| !exclude.contains(r)).collect();
    diff.sort_by(|a, b| (&a.source, &a.function).cmp(&(&b.source, &b.function)));
    diff.dedup();
    diff
}

/// Missing rewrites, then extra ones (each sorted by source), then the first
/// place where the shared rewrites appear in a different order.
pub fn compare_rewrites(expected: &[DerivedRewrite], actual: &[DerivedRewrite]) -> Vec<String> {
    let expected_set: HashSet<&DerivedRewrite> = expected.iter().collect();
    let actual_set: HashSet<&DerivedRewrite> = actual.iter().collect();

    let mut violations: Vec<String> = sorted_difference(expected, &actual_set)
        .into_iter()
        .map(|r| format!("Missing rewrite: {r}"))
        .collect();
    violations.extend(
        sorted_difference(actual, &expected_set)
            .into_iter()
            .map(|r| format!("Extra rewrite: {r}")),
    );

    let shared_expected = expected.iter().filter(|r| actual_set.contains(r));
    let shared_actual = actual.iter().filter(|r| expected_set.contains(r));
    if let Some((index, (want, found))) = shared_expected
        .zip(shared_actual)
        .enumerate()
        .find(|(_, (want, found))| want != found)
    {
        violations.push(format!(
            "Rewrite order mismatch at shared position {index}: expected '{want}', found '{found}'"
        ));
    }

    violations
}
