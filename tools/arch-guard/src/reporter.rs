//! Human-readable report for a full run.

use std::io::{self, IsTerminal, Write};

use owo_colors::{OwoColorize, Style};

use crate::checks::{CheckResult, FreshnessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Colour when stdout is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }
}

#[derive(Clone, Copy)]
struct Palette {
    color: bool,
}

impl Palette {
    fn paint(self, text: &str, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(self, text: &str) -> String {
        self.paint(text, Style::new().bold())
    }

    fn pass(self, text: &str) -> String {
        self.paint(text, Style::new().green())
    }

    fn fail(self, text: &str) -> String {
        self.paint(text, Style::new().red())
    }

    fn warn(self, text: &str) -> String {
        self.paint(text, Style::new().yellow())
    }

    fn detail(self, text: &str) -> String {
        self.paint(text, Style::new().dimmed())
    }
}

pub fn render_header(out: &mut impl Write, color: bool) -> io::Result<()> {
    let p = Palette { color };
    writeln!(out, "{}", p.bold("\n=== Architecture Enforcement ===\n"))
}

pub fn render_result(out: &mut impl Write, result: &CheckResult, color: bool) -> io::Result<()> {
    let p = Palette { color };
    if result.passed {
        return writeln!(out, "{} {}: {}", p.pass("\u{2713}"), result.name, p.pass("clean"));
    }

    let count = format!("{} violation(s)", result.violations.len());
    writeln!(out, "{} {}: {}", p.fail("\u{2717}"), result.name, p.fail(&count))?;
    writeln!(out)?;
    for violation in &result.violations {
        writeln!(out, "  {}", p.detail(violation))?;
    }
    writeln!(out)
}

pub fn render_freshness(out: &mut impl Write, freshness: &FreshnessResult, color: bool) -> io::Result<()> {
    if !freshness.stale {
        return Ok(());
    }
    let p = Palette { color };
    writeln!(
        out,
        "\n{} Quality grades freshness: {}",
        p.warn("\u{26a0}"),
        p.warn(&freshness.message)
    )
}

pub fn render_summary(out: &mut impl Write, results: &[CheckResult], color: bool) -> io::Result<()> {
    let p = Palette { color };
    let failed = results.iter().filter(|r| !r.passed).count();
    let total_violations: usize = results.iter().map(|r| r.violations.len()).sum();

    writeln!(out, "{}", p.bold("\n--- Summary ---"))?;
    if failed == 0 {
        let line = format!("\nAll {0}/{0} checks passed.\n", results.len());
        writeln!(out, "{}", p.pass(&line))
    } else {
        let line = format!(
            "\n{failed}/{} check(s) failed with {total_violations} total violation(s).\n",
            results.len()
        );
        writeln!(out, "{}", p.fail(&line))
    }
}

/// Full report: header, every result in order, the freshness advisory and the
/// summary.
pub fn render(
    out: &mut impl Write,
    results: &[CheckResult],
    freshness: &FreshnessResult,
    color: bool,
) -> io::Result<()> {
    render_header(out, color)?;
    for result in results {
        render_result(out, result, color)?;
    }
    render_freshness(out, freshness, color)?;
    render_summary(out, results, color)
}

/// 0 when every check passed, 1 otherwise. Freshness never gates.
pub fn exit_code(results: &[CheckResult]) -> u8 {
    u8::from(results.iter().any(|r| !r.passed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> FreshnessResult {
        FreshnessResult {
            stale: false,
            message: String::new(),
        }
    }

    fn plain(results: &[CheckResult], freshness: &FreshnessResult) -> String {
        let mut out = Vec::new();
        render(&mut out, results, freshness, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn all_clean_report() {
        let results = vec![CheckResult::clean("Layer dependencies"), CheckResult::clean("No skipped tests")];
        let text = plain(&results, &fresh());
        assert!(text.contains("=== Architecture Enforcement ==="));
        assert!(text.contains("\u{2713} Layer dependencies: clean\n"));
        assert!(text.contains("All 2/2 checks passed."));
        assert_eq!(exit_code(&results), 0);
    }

    #[test]
    fn failures_list_violations_and_gate() {
        let results = vec![
            CheckResult::clean("A"),
            CheckResult::from_violations("B", vec!["x.ts:1 bad\n    Rule: no".to_string(), "y.ts:2 bad".to_string()]),
        ];
        let text = plain(&results, &fresh());
        assert!(text.contains("\u{2717} B: 2 violation(s)\n\n  x.ts:1 bad\n    Rule: no\n  y.ts:2 bad\n\n"));
        assert!(text.contains("1/2 check(s) failed with 2 total violation(s)."));
        assert_eq!(exit_code(&results), 1);
    }

    #[test]
    fn stale_freshness_warns_without_gating() {
        let results = vec![CheckResult::clean("A")];
        let stale = FreshnessResult {
            stale: true,
            message: "docs/quality-grades.md was last updated 9 days ago".to_string(),
        };
        let text = plain(&results, &stale);
        assert!(text.contains("\u{26a0} Quality grades freshness: docs/quality-grades.md was last updated 9 days ago"));
        assert_eq!(exit_code(&results), 0);
    }

    #[test]
    fn plain_output_has_no_escape_codes() {
        let text = plain(&[CheckResult::degraded("A", "boom")], &fresh());
        assert!(!text.contains('\u{1b}'));

        let mut out = Vec::new();
        render_result(&mut out, &CheckResult::clean("A"), true).unwrap();
        assert!(String::from_utf8(out).unwrap().contains('\u{1b}'));
    }
}
