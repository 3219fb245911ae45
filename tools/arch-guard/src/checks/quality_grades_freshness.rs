use std::fs;
use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;

use crate::checks::quality_debt::QUALITY_GRADES;
use crate::checks::FreshnessResult;
use crate::config::LinterConfig;

pub const NAME: &str = "Quality grades freshness";

/// Days after which the generated report counts as stale.
pub const MAX_AGE_DAYS: i64 = 7;

const REFRESH_HINT: &str = "Run `npm run update:quality-grades` to refresh.";

static LAST_UPDATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Last updated:\s*(\d{4}-\d{2}-\d{2})").unwrap());

impl FreshnessResult {
    fn fresh() -> Self {
        Self {
            stale: false,
            message: String::new(),
        }
    }

    fn stale(message: impl Into<String>) -> Self {
        Self {
            stale: true,
            message: message.into(),
        }
    }
}

pub fn check(config: &LinterConfig) -> FreshnessResult {
    check_at(config, Local::now().date_naive())
}

/// Freshness of the quality-grades report as of `today`.
pub fn check_at(config: &LinterConfig, today: NaiveDate) -> FreshnessResult {
    let path = config.root_dir.join(QUALITY_GRADES);
    if !path.is_file() {
        return FreshnessResult::stale(format!(
            "{QUALITY_GRADES} does not exist. Run `npm run update:quality-grades` to generate it."
        ));
    }
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => return FreshnessResult::stale(format!("Failed to read {QUALITY_GRADES}: {e}")),
    };
    let Some(raw) = LAST_UPDATED.captures(&content).and_then(|c| c.get(1)) else {
        return FreshnessResult::stale(format!("{QUALITY_GRADES} has no \"Last updated\" date. {REFRESH_HINT}"));
    };
    let raw = raw.as_str();
    let updated = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date,
        Err(e) => return FreshnessResult::stale(format!("Invalid date '{raw}' in {QUALITY_GRADES}: {e}")),
    };

    let age = (today - updated).num_days();
    tracing::debug!(%updated, age, "quality grades age");
    if age > MAX_AGE_DAYS {
        return FreshnessResult::stale(format!(
            "{QUALITY_GRADES} was last updated {age} days ago ({raw}). {REFRESH_HINT}"
        ));
    }
    FreshnessResult::fresh()
}
