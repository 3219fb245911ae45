use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::walker;

static EXPORT_INTERFACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^export\s+interface\s+(\w+)").unwrap());

static EXPORT_TYPE_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^export\s+type\s+(\w+)\s*=").unwrap());

static RE_EXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^export\s+(?:type\s+)?(?:\{[^}]*\}|\*)\s+from\s+").unwrap());

static SWIFT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?:final|public|internal|private|fileprivate|open)\s+)*(class|actor)\s+([A-Za-z_]\w*)",
    )
    .unwrap()
});

const SWIFT_MEMBER_KEYWORDS: &[&str] = &["func", "var", "let", "subscript", "init"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDeclKind {
    Interface,
    TypeAlias,
}

impl std::fmt::Display for TypeDeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Interface => "interface",
            Self::TypeAlias => "type",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedType {
    pub name: String,
    pub line: usize,
    pub kind: TypeDeclKind,
}

/// Top-level `export interface X` / `export type X =` declarations.
/// Re-exports (`export { X } from`, `export * from`) are not declarations.
pub fn extract_exported_types(content: &str) -> Vec<ExportedType> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !RE_EXPORT.is_match(line))
        .filter_map(|(i, line)| {
            let (caps, kind) = EXPORT_INTERFACE
                .captures(line)
                .map(|c| (c, TypeDeclKind::Interface))
                .or_else(|| EXPORT_TYPE_ALIAS.captures(line).map(|c| (c, TypeDeclKind::TypeAlias)))?;
            Some(ExportedType {
                name: caps.get(1)?.as_str().to_string(),
                line: i + 1,
                kind,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwiftTypeKind {
    Class,
    Actor,
}

/// Class (and optionally actor) names declared in the Swift files directly
/// inside `dir`. Sorted and deduplicated.
pub fn discover_swift_types(dir: &Path, kinds: &[SwiftTypeKind]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for path in walker::list_files(dir, |n| n.ends_with(".swift")) {
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable swift file");
                continue;
            }
        };
        names.extend(swift_type_names(&content, kinds));
    }
    names.into_iter().collect()
}

fn swift_type_names<'a>(content: &'a str, kinds: &'a [SwiftTypeKind]) -> impl Iterator<Item = String> + 'a {
    content.lines().filter_map(move |line| {
        let caps = SWIFT_TYPE.captures(line)?;
        let kind = match caps.get(1)?.as_str() {
            "actor" => SwiftTypeKind::Actor,
            _ => SwiftTypeKind::Class,
        };
        let name = caps.get(2)?.as_str();
        if !kinds.contains(&kind) || SWIFT_MEMBER_KEYWORDS.contains(&name) {
            return None;
        }
        Some(name.to_string())
    })
}
