//! Reads `ENDPOINT_MANIFEST` out of `endpoint-manifest.ts` without a TypeScript parser.
//!
//! Pass one finds the array literal by walking code bytes (quotes and comments
//! are stepped over) until the opening `[` is balanced. Pass two splits the
//! array into top-level `{...}` blocks with the same walker, drops comments
//! from each block and pulls the known fields out with a `key: value` regex.

use std::collections::BTreeMap;
use std::fs;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::LinterConfig;
use crate::error::ManifestError;

pub const MANIFEST_FILE: &str = "endpoint-manifest.ts";

static DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s+const\s+ENDPOINT_MANIFEST\b").unwrap());

static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(\w+)\s*:\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)"|`((?:[^`\\]|\\.)*)`|(true|false)\b)"#,
    )
    .unwrap()
});

static CREATE_BASE_APP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"createBaseApp\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());

static RESOURCE_ROUTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"createResourceRouter\(\s*\{[\s\S]*?resourceName:\s*['"]([^'"]+)['"]"#).unwrap()
});

static STRIP_PATH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"stripPathPrefix\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointOptions {
    pub dev_only: bool,
    /// Hand-written rewrite source; the entry's rewrite is not derived.
    pub custom_source: Option<String>,
    /// The raw `options` string, passed through to the function wrapper.
    pub raw: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointManifestEntry {
    /// Mounted route without a leading slash; empty for custom-source entries.
    pub route_path: String,
    /// Handler module name under `handlers/`, without extension.
    pub handler_file: String,
    pub function_stem: Option<String>,
    pub options: EndpointOptions,
}

impl EndpointManifestEntry {
    pub fn new(route_path: &str, handler_file: &str) -> Self {
        Self {
            route_path: normalize_route(route_path),
            handler_file: normalize_handler(handler_file),
            ..Self::default()
        }
    }

    pub fn dev_only(mut self) -> Self {
        self.options.dev_only = true;
        self
    }

    pub fn with_custom_source(mut self, source: &str) -> Self {
        self.options.custom_source = Some(source.to_string());
        self
    }

    pub fn with_function_stem(mut self, stem: &str) -> Self {
        self.function_stem = Some(stem.to_string());
        self
    }

    fn from_fields(fields: &BTreeMap<String, FieldValue>) -> Self {
        let text = |key: &str| match fields.get(key) {
            Some(FieldValue::Text(s)) => Some(s.clone()),
            _ => None,
        };
        Self {
            route_path: text("routePath").map(|r| normalize_route(&r)).unwrap_or_default(),
            handler_file: text("handlerFile").map(|h| normalize_handler(&h)).unwrap_or_default(),
            function_stem: text("functionStem").filter(|s| !s.is_empty()),
            options: EndpointOptions {
                dev_only: matches!(fields.get("devOnly"), Some(FieldValue::Flag(true))),
                custom_source: text("customSource").filter(|s| !s.is_empty()),
                raw: text("options"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldValue {
    Text(String),
    Flag(bool),
}

fn normalize_route(route: &str) -> String {
    route.trim().trim_start_matches('/').to_string()
}

fn normalize_handler(handler: &str) -> String {
    let handler = handler.trim();
    handler
        .strip_suffix(".ts")
        .or_else(|| handler.strip_suffix(".js"))
        .unwrap_or(handler)
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    Code,
    Quoted(u8),
    LineComment,
    BlockComment,
}

/// Yields `(offset, byte)` for every byte outside strings and comments.
/// Quote delimiters and comment markers themselves are not yielded.
struct CodeBytes<'a> {
    bytes: &'a [u8],
    pos: usize,
    state: Lex,
}

impl<'a> CodeBytes<'a> {
    fn new(text: &'a str, start: usize) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: start,
            state: Lex::Code,
        }
    }
}

impl Iterator for CodeBytes<'_> {
    type Item = (usize, u8);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&b) = self.bytes.get(self.pos) {
            let at = self.pos;
            let next = self.bytes.get(at + 1).copied();
            self.pos += 1;
            match self.state {
                Lex::Code => match (b, next) {
                    (b'/', Some(b'/')) => {
                        self.state = Lex::LineComment;
                        self.pos += 1;
                    }
                    (b'/', Some(b'*')) => {
                        self.state = Lex::BlockComment;
                        self.pos += 1;
                    }
                    (b'\'' | b'"' | b'`', _) => self.state = Lex::Quoted(b),
                    _ => return Some((at, b)),
                },
                Lex::Quoted(quote) => {
                    if b == b'\\' {
                        self.pos += 1;
                    } else if b == quote {
                        self.state = Lex::Code;
                    }
                }
                Lex::LineComment => {
                    if b == b'\n' {
                        self.state = Lex::Code;
                    }
                }
                Lex::BlockComment => {
                    if b == b'*' && next == Some(b'/') {
                        self.state = Lex::Code;
                        self.pos += 1;
                    }
                }
            }
        }
        None
    }
}

/// Slice of `text` holding the `ENDPOINT_MANIFEST` array literal, brackets included.
pub fn extract_manifest_array_text(text: &str) -> Result<&str, ManifestError> {
    let declaration = DECLARATION.find(text).ok_or(ManifestError::MissingDeclaration)?;

    let mut code = CodeBytes::new(text, declaration.end());
    code.find(|&(_, b)| b == b'=')
        .ok_or(ManifestError::MissingDeclaration)?;
    let (open, _) = code
        .find(|&(_, b)| b == b'[')
        .ok_or(ManifestError::MissingDeclaration)?;

    let mut depth = 0usize;
    for (at, b) in CodeBytes::new(text, open) {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[open..=at]);
                }
            }
            _ => {}
        }
    }
    Err(ManifestError::Unbalanced(open))
}

/// Top-level `{...}` blocks inside an array literal.
fn split_object_blocks(array_text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (at, b) in CodeBytes::new(array_text, 0) {
        match b {
            b'{' => {
                if depth == 0 {
                    start = at;
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    blocks.push(&array_text[start..=at]);
                }
            }
            _ => {}
        }
    }
    blocks
}

/// `block` with `//` and `/* */` comments removed. String literals, quotes
/// included, are kept as written.
fn strip_comments(block: &str) -> String {
    let bytes = block.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut state = Lex::Code;
    let mut i = 0;

    while let Some(&b) = bytes.get(i) {
        let next = bytes.get(i + 1).copied();
        match state {
            Lex::Code => match (b, next) {
                (b'/', Some(b'/')) => {
                    state = Lex::LineComment;
                    i += 2;
                    continue;
                }
                (b'/', Some(b'*')) => {
                    state = Lex::BlockComment;
                    i += 2;
                    continue;
                }
                (b'\'' | b'"' | b'`', _) => {
                    state = Lex::Quoted(b);
                    out.push(b);
                }
                _ => out.push(b),
            },
            Lex::Quoted(quote) => {
                out.push(b);
                if b == b'\\' {
                    if let Some(escaped) = next {
                        out.push(escaped);
                        i += 1;
                    }
                } else if b == quote {
                    state = Lex::Code;
                }
            }
            Lex::LineComment => {
                if b == b'\n' {
                    state = Lex::Code;
                    out.push(b);
                }
            }
            Lex::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    state = Lex::Code;
                    out.push(b' ');
                    i += 1;
                }
            }
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Drops the backslash from escaped quotes and backslashes.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(escaped @ ('\'' | '"' | '`' | '\\')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// First occurrence of every `key: value` pair in the block. Nested option
/// objects contribute their keys too.
fn parse_fields(block: &str) -> BTreeMap<String, FieldValue> {
    let mut fields = BTreeMap::new();
    for caps in FIELD.captures_iter(block) {
        let Some(key) = caps.get(1) else { continue };
        let value = if let Some(flag) = caps.get(5) {
            FieldValue::Flag(flag.as_str() == "true")
        } else {
            let text = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| unescape(m.as_str()))
                .unwrap_or_default();
            FieldValue::Text(text)
        };
        fields.entry(key.as_str().to_string()).or_insert(value);
    }
    fields
}

pub fn parse_manifest(text: &str) -> Result<Vec<EndpointManifestEntry>, ManifestError> {
    let array_text = extract_manifest_array_text(text)?;
    let entries: Vec<EndpointManifestEntry> = split_object_blocks(array_text)
        .into_iter()
        .map(|block| EndpointManifestEntry::from_fields(&parse_fields(&strip_comments(block))))
        .collect();

    if entries.is_empty() {
        return Err(ManifestError::Empty);
    }
    Ok(entries)
}

pub fn read_manifest(config: &LinterConfig) -> Result<Vec<EndpointManifestEntry>, ManifestError> {
    let path = config.functions_src.join(MANIFEST_FILE);
    if !path.exists() {
        return Err(ManifestError::NotFound(path));
    }
    let text = fs::read_to_string(&path).map_err(ManifestError::Read)?;
    let entries = parse_manifest(&text)?;
    tracing::debug!(entries = entries.len(), "parsed endpoint manifest");
    Ok(entries)
}

/// The route a handler module mounts itself under, from the first recognised
/// call shape.
pub fn handler_route_prefix(source: &str) -> Option<String> {
    [&*CREATE_BASE_APP, &*RESOURCE_ROUTER, &*STRIP_PATH_PREFIX]
        .iter()
        .find_map(|re| re.captures(source))
        .and_then(|caps| caps.get(1))
        .map(|m| normalize_route(m.as_str()))
}
