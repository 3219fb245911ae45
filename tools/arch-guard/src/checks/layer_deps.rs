use std::fmt;
use std::path::{Path, PathBuf};

use crate::checks::violation::Violation;
use crate::checks::{read_source, CheckResult};
use crate::config::{self, normalize_path, LinterConfig};
use crate::scan::imports::{extract_imports, ImportRef};
use crate::walker;

pub const NAME: &str = "Layer dependencies";

/// Top-level directories of the functions source tree with an import policy.
/// Directories not listed here (routes, scripts, prompts, test utilities) are
/// neither checked nor protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Types,
    Schemas,
    Repositories,
    Services,
    Handlers,
    Middleware,
}

impl Layer {
    pub fn from_dir(name: &str) -> Option<Self> {
        match name {
            "types" => Some(Self::Types),
            "schemas" => Some(Self::Schemas),
            "repositories" => Some(Self::Repositories),
            "services" => Some(Self::Services),
            "handlers" => Some(Self::Handlers),
            "middleware" => Some(Self::Middleware),
            _ => None,
        }
    }

    pub fn dir(self) -> &'static str {
        match self {
            Self::Types => "types",
            Self::Schemas => "schemas",
            Self::Repositories => "repositories",
            Self::Services => "services",
            Self::Handlers => "handlers",
            Self::Middleware => "middleware",
        }
    }

    /// Other layers this layer may import from.
    pub fn may_import(self) -> &'static [Layer] {
        use Layer::*;
        match self {
            Types => &[],
            Schemas => &[Types],
            Repositories => &[Types, Schemas],
            Services => &[Types, Schemas, Repositories],
            Handlers => &[Types, Schemas, Repositories, Services, Middleware],
            Middleware => &[Types, Schemas],
        }
    }

    pub fn allows(self, other: Layer) -> bool {
        self == other || self.may_import().contains(&other)
    }

    /// Layer owning `path`, which must sit inside a layer directory below `src`.
    fn of_path(path: &Path, src: &Path) -> Option<Self> {
        let rel = path.strip_prefix(src).ok()?;
        let mut components = rel.components();
        let first = components.next()?.as_os_str().to_str()?;
        components.next()?;
        Self::from_dir(first)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir())
    }
}

fn allowed_list(layer: Layer) -> String {
    let mut names: Vec<&str> = layer.may_import().iter().map(|l| l.dir()).collect();
    if names.is_empty() {
        return "(none)".to_string();
    }
    names.sort_unstable();
    names.join(", ")
}

/// Layer targeted by a relative import, if it lands in another layer directory.
fn resolve_import(import: &ImportRef, importer: &Path, src: &Path) -> Option<Layer> {
    if !import.is_relative() {
        return None;
    }
    let target: PathBuf = normalize_path(&importer.parent()?.join(&import.specifier));
    Layer::of_path(&target, src)
}

pub fn check(config: &LinterConfig) -> CheckResult {
    let src = &config.functions_src;
    let files = walker::collect_ts_files(src, config::skip_dirs(&["__tests__", "test-utils"]));
    let mut violations = Vec::new();

    for file in &files {
        let Some(layer) = Layer::of_path(file, src) else {
            continue;
        };
        let Some(content) = read_source(config, file, &mut violations) else {
            continue;
        };
        let rel = config.relative(file);

        for import in extract_imports(&content) {
            let Some(target) = resolve_import(&import, file, src) else {
                continue;
            };
            if layer.allows(target) {
                continue;
            }
            violations.push(
                Violation::at(
                    format!("{rel}:{}", import.line),
                    format!(
                        "(layer: {layer}) imports from '{}' (layer: {target}). {layer} may not import from {target}.",
                        import.specifier
                    ),
                )
                .rule(format!(
                    "Dependencies flow types -> schemas -> repositories -> services -> handlers. A {layer} file may only import from: [{}].",
                    allowed_list(layer)
                ))
                .steps([
                    format!("Move the needed type/function to a layer that {layer} is allowed to import (e.g. packages/functions/src/types/)."),
                    format!("Update the import in {rel} to point to the new location."),
                    "Delete the old definition if nothing else uses it.".to_string(),
                ])
                .see("docs/conventions/typescript.md")
                .into(),
            );
        }
    }

    CheckResult::from_violations(NAME, violations)
}
