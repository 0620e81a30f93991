//! Date inference: guess when an event takes place from free Italian text.
//!
//! Matchers run in a fixed order and the first one that yields a valid
//! calendar date wins:
//!
//! 1. full numeric date with a four-digit year (`12/03/2026`)
//! 2. month-name mention, single or range (`3 marzo`, `12-14 mag`)
//! 3. short numeric date without year (`12/03`)
//!
//! A matcher that finds nothing usable returns `None` and the next one is
//! tried. Malformed input never produces an error; absence of a date is the
//! only failure signal.

mod month;
mod numeric;

use jiff::{
    Span,
    civil::{Date, DateTime, Time},
};
use serde::{Deserialize, Serialize};

/// How far in the past a year-less date may fall before the year rolls
/// forward to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraceWindows {
    /// Window for month-name mentions.
    pub month_name_days: i64,

    /// Window for short numeric dates (`dd/mm`).
    pub numeric_days: i64,
}

impl Default for GraceWindows {
    fn default() -> Self {
        Self {
            month_name_days: 60,
            numeric_days: 30,
        }
    }
}

/// A single tier of the cascade.
type Matcher = fn(&str, DateTime, &GraceWindows) -> Option<Date>;

/// The cascade, in priority order.
const CASCADE: &[(&str, Matcher)] = &[
    ("full-numeric", numeric::full_date as Matcher),
    ("month-name", month::month_name as Matcher),
    ("short-numeric", numeric::short_date as Matcher),
];

/// Date inference with configurable grace windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateInference {
    grace: GraceWindows,
}

impl DateInference {
    pub fn new(grace: GraceWindows) -> Self {
        Self { grace }
    }

    /// Infer the event date described by `text`, resolving year-less dates
    /// relative to `reference_now`.
    pub fn infer(&self, text: &str, reference_now: DateTime) -> Option<Date> {
        let text = text.to_lowercase();
        CASCADE.iter().find_map(|(name, matcher)| {
            let date = matcher(&text, reference_now, &self.grace)?;
            tracing::trace!(matcher = name, %date, "inferred event date");
            Some(date)
        })
    }
}

/// Infer with the default grace windows (60 days for month names, 30 for
/// short numeric dates).
pub fn infer_date(text: &str, reference_now: DateTime) -> Option<Date> {
    DateInference::default().infer(text, reference_now)
}

/// Place a year-less day/month in the reference year, or the following year
/// when it falls more than `grace_days` before `reference_now`.
///
/// Returns `None` when the day does not exist in the chosen year.
fn resolve_year(day: i8, month: i8, reference_now: DateTime, grace_days: i64) -> Option<Date> {
    let year = reference_now.year();
    let candidate = Date::new(year, month, day).ok()?;
    let grace = Span::new().try_days(grace_days).ok()?;
    let cutoff = reference_now.checked_sub(grace).ok()?;

    if candidate.to_datetime(Time::midnight()) < cutoff {
        return Date::new(year.checked_add(1)?, month, day).ok();
    }
    Some(candidate)
}
