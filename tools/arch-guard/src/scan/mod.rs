//! Line- and regex-level extractors. Each one finds a single kind of thing
//! and reports where it was found; none of them build a syntax tree.

pub mod declarations;
pub mod imports;
pub mod markdown;
pub mod routes;

use std::sync::LazyLock;

use regex::Regex;

static TRAILING_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s//.*$").unwrap());

/// `//`, `/*` and block-comment continuation (`*`) lines.
pub fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*')
}

/// Drops a ` // ...` tail. A `//` glued to the previous token (as in a URL) is kept.
pub fn strip_trailing_comment(line: &str) -> std::borrow::Cow<'_, str> {
    TRAILING_COMMENT.replace(line, "")
}

/// Maps byte offsets to 1-based line numbers.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(exact) => exact + 1,
            Err(after) => after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_comment_shapes() {
        assert!(is_comment_line("  // it.only('x')"));
        assert!(is_comment_line("/* block */"));
        assert!(is_comment_line("   * continuation"));
        assert!(!is_comment_line("it.only('x', () => {}); // note"));
    }

    #[test]
    fn trailing_comment_is_removed_but_urls_survive() {
        assert_eq!(strip_trailing_comment("let x = APIClient() // TODO"), "let x = APIClient()");
        assert_eq!(strip_trailing_comment("let u = \"https://a.b\""), "let u = \"https://a.b\"");
    }

    #[test]
    fn line_index_is_one_based() {
        let index = LineIndex::new("a\nbb\nccc");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(3), 2);
        assert_eq!(index.line_of(5), 3);
    }
}
