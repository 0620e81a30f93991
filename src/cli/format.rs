//! Output formatting and argument parsing for CLI display.

use jiff::{
    Timestamp,
    civil::{Date, DateTime, Time},
};

pub(super) fn format_inferred(date: Option<Date>) -> String {
    match date {
        Some(d) => d.to_string(),
        None => "no date".to_string(),
    }
}

/// One registry line: timestamp, key, and a marker for bootstrap entries.
pub(super) fn format_registry_entry(key: &str, discovered_at: Timestamp, bootstrap: Timestamp) -> String {
    let marker = if discovered_at == bootstrap {
        "  (bootstrap)"
    } else {
        ""
    };
    format!("{discovered_at}  {key}{marker}")
}

/// Parse a `--now` value: a full civil datetime, or a bare date at midnight.
pub(super) fn parse_reference(s: &str) -> Result<DateTime, String> {
    if let Ok(dt) = s.parse::<DateTime>() {
        return Ok(dt);
    }
    s.parse::<Date>()
        .map(|d| d.to_datetime(Time::midnight()))
        .map_err(|e| format!("invalid --now '{s}': {e}"))
}
