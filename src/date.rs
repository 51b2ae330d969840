use std::{collections::HashMap, fmt::Write as _, sync::OnceLock};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;

static DATE_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static YEAR_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Date/time shapes recognized inside free text, in priority order.
fn date_patterns() -> &'static [Regex] {
    DATE_PATTERNS.get_or_init(|| {
        [
            r"(?P<year>[0-9]{4})[^0-9]+(?P<month>[0-9]{1,2})[^0-9]+(?P<day>[0-9]{1,2})",
            r"(?P<day>[0-9]{1,2})[^0-9]+(?P<month>[0-9]{1,2})[^0-9]+(?P<year>[0-9]{4})",
            r"(?P<hour>[0-9]{2}):(?P<min>[0-9]{2}):(?P<sec>[0-9]{2})",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

// only used for stripping: a lone year is not enough to date an article
fn year_pattern() -> &'static Regex {
    YEAR_PATTERN.get_or_init(|| Regex::new(r"\b(?:19|20)[0-9]{2}\b").unwrap())
}

/// Looks for a date (and optionally a time) anywhere in `s`.
///
/// Every pattern is tried in order and contributes its captured fields.
/// When two patterns capture the same field, the first one wins.
/// Returns `None` when nothing matched or the collected fields do not
/// make up a calendar date (a year is required, month and day default to 1).
pub(crate) fn extract_date_time(s: &str) -> Option<NaiveDateTime> {
    let mut fields: HashMap<&str, u32> = HashMap::new();
    let mut found = false;

    for pattern in date_patterns() {
        let Some(caps) = pattern.captures(s) else {
            continue;
        };
        found = true;
        for name in pattern.capture_names().flatten() {
            if let Some(value) = caps.name(name).and_then(|m| m.as_str().parse().ok()) {
                fields.entry(name).or_insert(value);
            }
        }
    }
    if !found {
        return None;
    }

    let field = |name: &str| fields.get(name).copied();
    let year = i32::try_from(field("year")?).ok()?;
    let date = NaiveDate::from_ymd_opt(
        year,
        field("month").unwrap_or(1).max(1),
        field("day").unwrap_or(1).max(1),
    )?;
    let time = NaiveTime::from_hms_opt(
        field("hour").unwrap_or(0),
        field("min").unwrap_or(0),
        field("sec").unwrap_or(0),
    )
    .unwrap_or(NaiveTime::MIN);

    Some(date.and_time(time))
}

fn strip_patterns<'a>(s: &str, patterns: impl IntoIterator<Item = &'a Regex>) -> String {
    let mut stripped = s.to_string();
    for pattern in patterns {
        stripped = pattern.replace_all(&stripped, "").into_owned();
    }
    let collapsed: Vec<&str> = stripped.split(' ').filter(|w| !w.is_empty()).collect();
    collapsed.join(" ").trim_matches(SEPARATORS).to_string()
}

/// Removes every recognized date token from `s` and trims leftover separators.
/// A year on its own is part of the text ("Best books of 2023").
pub(crate) fn strip_date(s: &str) -> String {
    strip_patterns(s, date_patterns())
}

/// Like [`strip_date`], but also drops lone years such as `2023/` directory
/// names.
pub(crate) fn strip_path_date(s: &str) -> String {
    strip_patterns(s, date_patterns().iter().chain([year_pattern()]))
}

pub(crate) const SEPARATORS: &[char] = &['-', '_', ' '];

/// Formats `date` with a user supplied strftime pattern, falling back to
/// ISO dates when the pattern is invalid.
pub(crate) fn format_date(date: &DateTime<Utc>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", date.format("%Y-%m-%d"));
    }
    out
}
