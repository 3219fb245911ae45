//! Deterministic filesystem enumeration shared by every check.
//!
//! Entries are visited in file-name order within each directory, symlinks are
//! never followed, and a missing root yields an empty list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config;

#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub skip_dirs: HashSet<&'static str>,
    pub skip_hidden_dirs: bool,
    pub recursive: bool,
}

impl WalkOptions {
    pub fn recursive(skip_dirs: HashSet<&'static str>) -> Self {
        Self {
            skip_dirs,
            skip_hidden_dirs: false,
            recursive: true,
        }
    }

    /// Only the immediate children of the walk root.
    pub fn shallow() -> Self {
        Self::default()
    }

    pub fn skipping_hidden(mut self) -> Self {
        self.skip_hidden_dirs = true;
        self
    }

    fn descends_into(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        if self.skip_dirs.contains(name.as_ref()) {
            return false;
        }
        !(self.skip_hidden_dirs && name.starts_with('.'))
    }

    fn walker(&self, dir: &Path) -> WalkDir {
        let walker = WalkDir::new(dir).follow_links(false).sort_by_file_name();
        if self.recursive {
            walker
        } else {
            walker.max_depth(1)
        }
    }
}

/// Files under `dir` whose file name satisfies `accept`.
pub fn collect_files(dir: &Path, options: &WalkOptions, accept: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    options
        .walker(dir)
        .into_iter()
        .filter_entry(|e| options.descends_into(e))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| accept(&e.file_name().to_string_lossy()))
        .map(DirEntry::into_path)
        .collect()
}

/// Directories strictly below `dir` that survive the skip rules.
pub fn collect_dirs(dir: &Path, options: &WalkOptions) -> Vec<PathBuf> {
    options
        .walker(dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| options.descends_into(e))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_dir())
        .map(DirEntry::into_path)
        .collect()
}

/// Immediate children of `dir` accepted by `accept`, sorted by name.
pub fn list_files(dir: &Path, accept: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    collect_files(dir, &WalkOptions::shallow(), accept)
}

pub fn is_ts_test_file(name: &str) -> bool {
    name.ends_with(".test.ts") || name.ends_with(".spec.ts")
}

pub fn is_ts_source_file(name: &str) -> bool {
    name.ends_with(".ts") && !is_ts_test_file(name) && !name.contains("__tests__")
}

/// Non-test TypeScript sources under `dir`.
pub fn collect_ts_files(dir: &Path, skip_dirs: HashSet<&'static str>) -> Vec<PathBuf> {
    collect_files(dir, &WalkOptions::recursive(skip_dirs), is_ts_source_file)
}

/// `*.test.ts` / `*.spec.ts` anywhere below `dir`, ignoring the iOS tree,
/// static assets and dot-directories.
pub fn collect_test_files(dir: &Path) -> Vec<PathBuf> {
    let options = WalkOptions::recursive(config::skip_dirs(&["ios", "public"])).skipping_hidden();
    collect_files(dir, &options, is_ts_test_file)
}

pub fn collect_swift_files(dir: &Path) -> Vec<PathBuf> {
    collect_files(dir, &WalkOptions::recursive(HashSet::new()), |name| {
        name.ends_with(".swift")
    })
}

pub fn collect_markdown_files(dir: &Path, skip_dirs: HashSet<&'static str>) -> Vec<PathBuf> {
    collect_files(dir, &WalkOptions::recursive(skip_dirs), |name| name.ends_with(".md"))
}
