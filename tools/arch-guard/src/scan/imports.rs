use std::sync::LazyLock;

use regex::Regex;

use super::{is_comment_line, LineIndex};

/// `import ... from '...'` and `export ... from '...'`, including specifier
/// lists that span several lines.
static FROM_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:import|export)\b[^;'"`=()]*?\bfrom\s*['"]([^'"]+)['"]"#).unwrap()
});

static SIDE_EFFECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^[ \t]*import\s+['"]([^'"]+)['"]"#).unwrap());

static CALL_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:require|import)\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    pub specifier: String,
    pub line: usize,
}

impl ImportRef {
    pub fn is_relative(&self) -> bool {
        self.specifier.starts_with('.')
    }
}

/// Module specifiers referenced by `content`, in source order. Matches that
/// start on a comment line are ignored.
pub fn extract_imports(content: &str) -> Vec<ImportRef> {
    let index = LineIndex::new(content);
    let lines: Vec<&str> = content.lines().collect();

    let mut found: Vec<(usize, ImportRef)> = [&*FROM_CLAUSE, &*SIDE_EFFECT, &*CALL_FORM]
        .iter()
        .flat_map(|re| re.captures_iter(content))
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let specifier = caps.get(1)?.as_str().to_string();
            let line = index.line_of(whole.start());
            Some((whole.start(), ImportRef { specifier, line }))
        })
        .filter(|(_, import)| {
            lines
                .get(import.line - 1)
                .map_or(true, |text| !is_comment_line(text))
        })
        .collect();

    found.sort_by_key(|(offset, _)| *offset);
    found.dedup_by(|a, b| a.1 == b.1);
    found.into_iter().map(|(_, import)| import).collect()
}
