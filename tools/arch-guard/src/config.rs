use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::error::ConfigError;

/// Directory names no check ever descends into.
/// Checks extend this with their own entries through [`skip_dirs`].
pub const GLOBAL_SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "target",
    "build",
    ".cache",
    ".firebase",
    ".validate",
    ".claude",
    ".arch-lint-tmp",
    "tmp-lint",
    "emulator-data",
    ".otel",
    ".playwright-mcp",
    "test-results",
    "ios-test-screenshots",
];

/// Global skip set plus check-specific additions.
pub fn skip_dirs(extra: &[&'static str]) -> HashSet<&'static str> {
    GLOBAL_SKIP_DIRS.iter().chain(extra).copied().collect()
}

/// Immutable per-invocation settings threaded through every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinterConfig {
    pub root_dir: PathBuf,
    pub functions_src: PathBuf,
}

impl LinterConfig {
    pub fn from_root(root: &Path) -> Self {
        Self {
            root_dir: root.to_path_buf(),
            functions_src: root.join("packages/functions/src"),
        }
    }

    /// Validates an explicit `--root-dir` before building the config.
    pub fn from_explicit_root(root: &Path) -> Result<Self, ConfigError> {
        if !root.is_dir() {
            return Err(ConfigError::NotADirectory(root.to_path_buf()));
        }
        Ok(Self::from_root(root))
    }

    /// Walks up from the current directory until a `.git` marker is found.
    pub fn discover() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        Self::discover_from(&cwd)
    }

    pub fn discover_from(start: &Path) -> Result<Self, ConfigError> {
        start
            .ancestors()
            .find(|dir| dir.join(".git").exists())
            .map(Self::from_root)
            .ok_or_else(|| ConfigError::RootNotFound(start.to_path_buf()))
    }

    pub fn handlers_dir(&self) -> PathBuf {
        self.functions_src.join("handlers")
    }

    pub fn layer_dir(&self, layer: &str) -> PathBuf {
        self.functions_src.join(layer)
    }

    pub fn ios_app_dir(&self) -> PathBuf {
        self.root_dir.join("ios/BradOS/BradOS")
    }

    pub fn architecture_docs_dir(&self) -> PathBuf {
        self.root_dir.join("docs/architecture")
    }

    pub fn plans_dir(&self) -> PathBuf {
        self.root_dir.join("thoughts/shared/plans")
    }

    /// `path` relative to the repository root, always with `/` separators.
    pub fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root_dir).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Lexically resolves `.` and `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
