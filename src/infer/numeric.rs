//! Numeric date matchers: `dd/mm/yyyy` and `dd/mm`.
//!
//! Day comes first, always. Month-first texts misparse silently.

use std::sync::LazyLock;

use jiff::civil::{Date, DateTime};
use regex::Regex;

use super::{GraceWindows, resolve_year};

static RE_FULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4})\b").unwrap());

static RE_SHORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[/-](\d{1,2})\b").unwrap());

/// Day, month and four-digit year, taken as written.
pub(super) fn full_date(text: &str, _now: DateTime, _grace: &GraceWindows) -> Option<Date> {
    let caps = RE_FULL.captures(text)?;
    let day: i8 = caps[1].parse().ok()?;
    let month: i8 = caps[2].parse().ok()?;
    let year: i16 = caps[3].parse().ok()?;
    Date::new(year, month, day).ok()
}

/// Day and month only; the year comes from the reference date.
pub(super) fn short_date(text: &str, now: DateTime, grace: &GraceWindows) -> Option<Date> {
    let caps = RE_SHORT.captures(text)?;
    let day: i8 = caps[1].parse().ok()?;
    let month: i8 = caps[2].parse().ok()?;
    if month > 12 {
        return None;
    }
    resolve_year(day, month, now, grace.numeric_days)
}
