//! Shared layout for violation text.
//!
//! ```text
//! packages/functions/src/services/x.ts:3 imports ... (headline)
//!     Rule: ...
//!     Fix: 1. ...
//!          2. ...
//!     See: docs/conventions/typescript.md
//! ```

const INDENT: &str = "    ";

#[derive(Debug, Clone)]
pub struct Violation {
    headline: String,
    sections: Vec<(&'static str, Vec<String>)>,
}

impl Violation {
    pub fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            sections: Vec::new(),
        }
    }

    /// Headline of the form `<location> <message>`.
    pub fn at(location: impl std::fmt::Display, message: impl std::fmt::Display) -> Self {
        Self::new(format!("{location} {message}"))
    }

    /// A labelled block; lines after the first align under the first.
    pub fn section<I, S>(mut self, label: &'static str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections
            .push((label, lines.into_iter().map(Into::into).collect()));
        self
    }

    pub fn rule(self, text: impl Into<String>) -> Self {
        self.section("Rule", [text.into()])
    }

    pub fn fix(self, text: impl Into<String>) -> Self {
        self.section("Fix", [text.into()])
    }

    pub fn fix_lines<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.section("Fix", lines)
    }

    /// Numbered remediation steps.
    pub fn steps<I, S>(self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let numbered: Vec<String> = steps
            .into_iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s.into()))
            .collect();
        self.section("Fix", numbered)
    }

    /// Example block starting on the line below its label.
    pub fn example<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let block: Vec<String> = std::iter::once(String::new())
            .chain(lines.into_iter().map(Into::into))
            .collect();
        self.section("Example", block)
    }

    pub fn see(self, doc: &str) -> Self {
        self.section("See", [doc.to_string()])
    }

    pub fn render(&self) -> String {
        let mut out = self.headline.clone();
        for (label, lines) in &self.sections {
            let hang = " ".repeat(label.len() + 2);
            let mut lines = lines.iter();
            match lines.next().map(String::as_str) {
                Some("") | None => out.push_str(&format!("\n{INDENT}{label}:")),
                Some(first) => out.push_str(&format!("\n{INDENT}{label}: {first}")),
            }
            for line in lines {
                out.push_str(&format!("\n{INDENT}{hang}{line}"));
            }
        }
        out
    }
}

impl From<Violation> for String {
    fn from(v: Violation) -> Self {
        v.render()
    }
}
