//! Month-name matcher: `3 marzo`, `1° maggio`, `12 di sett`, `12-14 ott`,
//! `dal 5 al 7 giugno`.

use std::sync::LazyLock;

use jiff::civil::{Date, DateTime};
use regex::Regex;

use super::{GraceWindows, resolve_year};

/// Italian month names with their usual abbreviations, longest first so the
/// alternation never stops at a prefix.
const MONTH_NAMES: [&[&str]; 12] = [
    &["gennaio", "gen"],
    &["febbraio", "feb"],
    &["marzo", "mar"],
    &["aprile", "apr"],
    &["maggio", "mag"],
    &["giugno", "giu"],
    &["luglio", "lug"],
    &["agosto", "ago"],
    &["settembre", "sett", "set"],
    &["ottobre", "ott"],
    &["novembre", "nov"],
    &["dicembre", "dic"],
];

struct MonthPattern {
    month: i8,
    range: Regex,
    single: Regex,
}

static PATTERNS: LazyLock<Vec<MonthPattern>> = LazyLock::new(|| {
    MONTH_NAMES
        .iter()
        .zip(1_i8..)
        .map(|(names, month)| {
            let names = names.join("|");
            MonthPattern {
                month,
                range: Regex::new(&format!(
                    r"\b(\d{{1,2}})[°º]?\s*(?:-|/|&|e|al)\s*\d{{1,2}}[°º]?\s+(?:di\s+)?(?:{names})\b"
                ))
                .unwrap(),
                single: Regex::new(&format!(
                    r"\b(\d{{1,2}})[°º]?\s+(?:di\s+)?(?:{names})\b"
                ))
                .unwrap(),
            }
        })
        .collect()
});

/// First month, in calendar order, mentioned with a valid day.
///
/// Ranges resolve to their first day. Expects lowercased text.
pub(super) fn month_name(text: &str, now: DateTime, grace: &GraceWindows) -> Option<Date> {
    PATTERNS.iter().find_map(|pattern| {
        [&pattern.range, &pattern.single].into_iter().find_map(|re| {
            let day: i8 = re.captures(text)?[1].parse().ok()?;
            resolve_year(day, pattern.month, now, grace.month_name_days)
        })
    })
}
