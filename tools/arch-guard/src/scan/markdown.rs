use std::sync::LazyLock;

use regex::Regex;

static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*```").unwrap());

static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!?\[[^\]]*\]\(([^)]+)\)").unwrap());

static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`]*`").unwrap());

static CODE_SPAN_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\s]+)`").unwrap());

static TEMPLATE_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<\w+>").unwrap());

/// Lines outside fenced code blocks, with their 1-based line numbers.
pub fn prose_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut in_fence = false;
    content.lines().enumerate().filter_map(move |(i, line)| {
        if FENCE.is_match(line) {
            in_fence = !in_fence;
            return None;
        }
        (!in_fence).then_some((i + 1, line))
    })
}

/// `[text](target)` and `![alt](target)` targets, ignoring anything inside
/// inline code spans.
pub fn link_targets(line: &str) -> Vec<String> {
    let visible = INLINE_CODE.replace_all(line, "");
    LINK.captures_iter(&visible)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .collect()
}

/// Contents of single-token code spans such as `` `docs/x.md` ``.
pub fn code_span_paths(line: &str) -> Vec<&str> {
    CODE_SPAN_PATH
        .captures_iter(line)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Code-span paths under one of `roots` (`docs/x.md` for root `docs`) that name
/// something checkable on disk. With `require_extension`, only file paths count.
pub fn rooted_code_paths<'a>(line: &'a str, roots: &[&str], require_extension: bool) -> Vec<&'a str> {
    code_span_paths(line)
        .into_iter()
        .filter(|path| {
            roots
                .iter()
                .any(|root| path.strip_prefix(root).is_some_and(|rest| rest.starts_with('/')))
        })
        .filter(|path| !is_template_placeholder(path) && !is_wildcard(path))
        .filter(|path| !require_extension || has_extension(path))
        .collect()
}

fn has_extension(path: &str) -> bool {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.rfind('.').is_some_and(|i| i > 0 && i + 1 < file.len())
}

pub fn is_template_placeholder(path: &str) -> bool {
    TEMPLATE_VAR.is_match(path)
}

pub fn is_wildcard(path: &str) -> bool {
    path.contains('*')
}

/// The on-disk part of a link target, or `None` when the target is external,
/// an in-page anchor, a placeholder or a glob.
pub fn local_link_path(target: &str) -> Option<&str> {
    let external = ["http://", "https://", "mailto:"];
    if external.iter().any(|scheme| target.starts_with(scheme))
        || target.starts_with('#')
        || target.contains('<')
        || is_wildcard(target)
    {
        return None;
    }

    let without_fragment = target.split('#').next().unwrap_or(target);
    let without_title = [" \"", " '"]
        .iter()
        .find_map(|sep| without_fragment.find(sep).map(|i| &without_fragment[..i]))
        .unwrap_or(without_fragment)
        .trim();

    (!without_title.is_empty()).then_some(without_title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_blocks_are_skipped() {
        let content = "a\n```ts\nb\n```\nc\n";
        let lines: Vec<(usize, &str)> = prose_lines(content).collect();
        assert_eq!(lines, vec![(1, "a"), (5, "c")]);
    }

    #[test]
    fn links_inside_inline_code_are_ignored() {
        let line = "See [guide](docs/guide.md) and `[fake](nope.md)` plus ![img](a.png)";
        assert_eq!(link_targets(line), vec!["docs/guide.md", "a.png"]);
    }

    #[test]
    fn local_paths_drop_fragments_and_titles() {
        assert_eq!(local_link_path("docs/a.md#section"), Some("docs/a.md"));
        assert_eq!(local_link_path("docs/a.md \"Title\""), Some("docs/a.md"));
        assert_eq!(local_link_path("https://example.com"), None);
        assert_eq!(local_link_path("#anchor"), None);
        assert_eq!(local_link_path("docs/<feature>.md"), None);
        assert_eq!(local_link_path("docs/*.md"), None);
    }

    #[test]
    fn code_spans_yield_single_tokens() {
        let line = "Edit `packages/functions/src/index.ts` then run `npm run build`.";
        assert_eq!(code_span_paths(line), vec!["packages/functions/src/index.ts"]);
    }

    #[test]
    fn rooted_paths_filter_roots_placeholders_and_extensions() {
        let line = "`docs/a.md` `src/b.ts` `docs/<feature>.md` `scripts/*.sh` `packages/functions` `docsy/c.md`";
        assert_eq!(rooted_code_paths(line, &["docs", "scripts", "packages"], true), vec!["docs/a.md"]);
        assert_eq!(
            rooted_code_paths(line, &["docs", "scripts", "packages"], false),
            vec!["docs/a.md", "packages/functions"]
        );
    }

    #[test]
    fn placeholders_are_detected() {
        assert!(is_template_placeholder("docs/architecture/<feature>.md"));
        assert!(!is_template_placeholder("docs/architecture/lifting.md"));
    }
}
