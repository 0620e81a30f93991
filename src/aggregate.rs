//! Aggregation: turn fetched feeds into event records, and the views
//! rendering and notification work from.
//!
//! Each item is cleaned, dated from its title and summary, and stamped with
//! its discovery time. Items sharing a registry key are collapsed to the
//! first one seen.

use std::{collections::HashSet, sync::LazyLock};

use jiff::{SignedDuration, Timestamp, Zoned, civil::Date};
use regex::Regex;

use crate::{
    config::Config,
    infer::DateInference,
    model::{EventRecord, RawItem, SourceFeed},
    registry::{DiscoveryKey, DiscoveryRegistry, discriminator_from_title},
};

static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^<>]*>").unwrap());
static RE_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Builds event records from fetched feeds.
#[derive(Debug, Clone)]
pub struct Aggregator {
    inference: DateInference,
    key_separator: String,
    summary_max_chars: usize,
}

impl Aggregator {
    pub fn new(inference: DateInference, key_separator: &str, summary_max_chars: usize) -> Self {
        Self {
            inference,
            key_separator: key_separator.to_string(),
            summary_max_chars,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            DateInference::new(config.grace()),
            &config.key_separator,
            config.summary_max_chars,
        )
    }

    /// The registry key for an item.
    ///
    /// Items with a discriminator are qualified by it. Items without a link
    /// fall back to their title so they don't all collapse into one entry.
    pub fn key_for(&self, item: &RawItem) -> DiscoveryKey {
        let discriminator = item
            .discriminator
            .as_deref()
            .map(discriminator_from_title)
            .filter(|d| !d.is_empty());

        match discriminator {
            Some(d) => DiscoveryKey::qualified(&item.link, &d, &self.key_separator),
            None if item.link.trim().is_empty() => DiscoveryKey::qualified(
                "",
                &discriminator_from_title(&item.title),
                &self.key_separator,
            ),
            None => DiscoveryKey::url(&item.link),
        }
    }

    /// Builds one record per distinct key, in feed order.
    ///
    /// `now` is the run time: the fallback source timestamp, the discovery
    /// time for new keys, and the reference for year-less dates.
    pub fn build(
        &self,
        feeds: &[SourceFeed],
        registry: &mut DiscoveryRegistry,
        now: &Zoned,
    ) -> Vec<EventRecord> {
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for feed in feeds {
            let mut built = 0_usize;
            for item in &feed.items {
                let key = self.key_for(item);
                if !seen.insert(key.clone()) {
                    tracing::debug!(key = key.as_str(), source = feed.name.as_str(), "duplicate item skipped");
                    continue;
                }

                let summary = clean_text(&item.summary);
                let text = format!("{} {summary}", item.title);

                records.push(EventRecord {
                    title: item.title.trim().to_string(),
                    link: item.link.clone(),
                    summary: truncate(&summary, self.summary_max_chars),
                    discovered_at: registry.get_or_assign_at(&key, now.timestamp()),
                    source_timestamp: source_timestamp(item, now.timestamp()),
                    inferred_event_date: self.inference.infer(&text, now.datetime()),
                    source: feed.name.clone(),
                    color: feed.color.clone(),
                });
                built += 1;
            }
            tracing::info!(source = feed.name.as_str(), records = built, "aggregated feed");
        }

        records
    }
}

/// Cleans a feed summary for display: drops markup, expands the
/// "read more" ellipsis, and truncates to `max_chars` characters with a
/// trailing `...`.
pub fn clean_summary(summary: &str, max_chars: usize) -> String {
    truncate(&clean_text(summary), max_chars)
}

fn clean_text(summary: &str) -> String {
    let text = summary
        .replace("<p>", "")
        .replace("</p>", " ")
        .replace("[&hellip;]", "...");
    let text = RE_TAG.replace_all(&text, " ");
    RE_SPACE.replace_all(&text, " ").trim().to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// The origin's own timestamp: published, else updated, else `now`.
pub fn source_timestamp(item: &RawItem, now: Timestamp) -> Timestamp {
    item.published.or(item.updated).unwrap_or(now)
}

/// Newest first by source timestamp.
pub fn chronological(mut records: Vec<EventRecord>) -> Vec<EventRecord> {
    records.sort_by(|a, b| b.source_timestamp.cmp(&a.source_timestamp));
    records
}

/// Records with an inferred date on or after `today`, soonest first.
///
/// Records without an inferred date never appear here.
pub fn upcoming(records: &[EventRecord], today: Date) -> Vec<EventRecord> {
    let mut upcoming: Vec<EventRecord> = records
        .iter()
        .filter(|r| r.inferred_event_date.is_some_and(|d| d >= today))
        .cloned()
        .collect();
    upcoming.sort_by_key(|r| r.inferred_event_date);
    upcoming
}

/// Records discovered within the last `days` days, newest discovery first.
///
/// Entries stamped with the bootstrap instant are never recent.
pub fn recent(
    records: &[EventRecord],
    now: Timestamp,
    days: i64,
    bootstrap: Timestamp,
) -> Vec<EventRecord> {
    let Some(window) = recent_window(days) else {
        return Vec::new();
    };
    let Ok(cutoff) = now.checked_sub(window) else {
        return Vec::new();
    };
    let mut recent: Vec<EventRecord> = records
        .iter()
        .filter(|r| r.discovered_at != bootstrap && r.discovered_at >= cutoff)
        .cloned()
        .collect();
    recent.sort_by(|a, b| b.discovered_at.cmp(&a.discovered_at));
    recent
}

/// The recent window as a duration, or `None` when `days` is negative or
/// too large to represent.
pub fn recent_window(days: i64) -> Option<SignedDuration> {
    if days < 0 {
        return None;
    }
    days.checked_mul(86_400).map(SignedDuration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::{civil::date, tz::TimeZone};
    use tempfile::TempDir;

    fn ts(second: i64) -> Timestamp {
        Timestamp::from_second(second).unwrap()
    }

    fn bootstrap() -> Timestamp {
        ts(1_704_067_200)
    }

    /// 2026-02-09T10:00:00Z.
    fn run_time() -> Zoned {
        date(2026, 2, 9)
            .at(10, 0, 0, 0)
            .to_zoned(TimeZone::UTC)
            .unwrap()
    }

    fn item(title: &str, link: &str, summary: &str) -> RawItem {
        RawItem {
            title: title.into(),
            link: link.into(),
            summary: summary.into(),
            published: None,
            updated: None,
            discriminator: None,
        }
    }

    fn feed(name: &str, items: Vec<RawItem>) -> SourceFeed {
        SourceFeed {
            name: name.into(),
            color: "#3498db".into(),
            items,
        }
    }

    fn aggregator() -> Aggregator {
        Aggregator::from_config(&Config::default())
    }

    fn record(title: &str, source_timestamp: Timestamp, date: Option<Date>) -> EventRecord {
        EventRecord {
            title: title.into(),
            link: format!("https://example/{title}"),
            summary: String::new(),
            discovered_at: source_timestamp,
            source_timestamp,
            inferred_event_date: date,
            source: "CAI".into(),
            color: String::new(),
        }
    }

    #[test]
    fn clean_summary_strips_markup() {
        let summary = "<p>Ritrovo al <strong>parcheggio</strong>\n alle 8 [&hellip;]</p>";
        assert_eq!(
            clean_summary(summary, 250),
            "Ritrovo al parcheggio alle 8 ..."
        );
    }

    #[test]
    fn clean_summary_truncates_by_chars() {
        let summary = "à".repeat(300);
        let cleaned = clean_summary(&summary, 250);
        assert_eq!(cleaned.chars().count(), 253);
        assert!(cleaned.ends_with("..."));
    }

    #[test]
    fn clean_summary_keeps_stray_angle_brackets() {
        let summary = "<p>meno di <10 posti, partenza 5 maggio> ore 8</p>";
        assert_eq!(
            clean_summary(summary, 250),
            "meno di <10 posti, partenza 5 maggio> ore 8"
        );
    }

    #[test]
    fn stray_angle_bracket_does_not_hide_a_date() {
        let dir = TempDir::new().unwrap();
        let mut registry = DiscoveryRegistry::load(dir.path().join("r.json"), bootstrap());
        let feeds = vec![feed(
            "CAI",
            vec![item("Gita", "https://a/gita", "meno di <10 posti, partenza 5 maggio>")],
        )];

        let records = aggregator().build(&feeds, &mut registry, &run_time());
        assert_eq!(records[0].inferred_event_date, Some(date(2026, 5, 5)));
    }

    #[test]
    fn clean_summary_leaves_short_text_alone() {
        assert_eq!(clean_summary("Gita sociale", 250), "Gita sociale");
    }

    #[test]
    fn source_timestamp_prefers_published_then_updated() {
        let mut it = item("Gita", "https://x", "");
        assert_eq!(source_timestamp(&it, ts(30)), ts(30));

        it.updated = Some(ts(20));
        assert_eq!(source_timestamp(&it, ts(30)), ts(20));

        it.published = Some(ts(10));
        assert_eq!(source_timestamp(&it, ts(30)), ts(10));
    }

    #[test]
    fn build_infers_dates_and_stamps_discovery() {
        let dir = TempDir::new().unwrap();
        let mut registry = DiscoveryRegistry::load(dir.path().join("r.json"), bootstrap());
        let feeds = vec![feed(
            "CAI Arezzo",
            vec![
                item("Monte Falco", "https://a/falco", "<p>Escursione del 3 marzo</p>"),
                item("Assemblea", "https://a/assemblea", "Convocazione soci"),
            ],
        )];

        let records = aggregator().build(&feeds, &mut registry, &run_time());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].inferred_event_date, Some(date(2026, 3, 3)));
        assert_eq!(records[0].summary, "Escursione del 3 marzo");
        assert_eq!(records[0].source, "CAI Arezzo");
        assert_eq!(records[1].inferred_event_date, None);
        // Empty registry: everything gets the bootstrap instant.
        assert!(records.iter().all(|r| r.discovered_at == bootstrap()));
    }

    #[test]
    fn date_beyond_truncation_is_still_found() {
        let dir = TempDir::new().unwrap();
        let mut registry = DiscoveryRegistry::load(dir.path().join("r.json"), bootstrap());
        let summary = format!("{} partenza il 14 giugno", "bla ".repeat(100));
        let feeds = vec![feed("CAI", vec![item("Gita", "https://a/gita", &summary)])];

        let records = aggregator().build(&feeds, &mut registry, &run_time());
        assert_eq!(records[0].inferred_event_date, Some(date(2026, 6, 14)));
    }

    #[test]
    fn build_collapses_duplicate_links() {
        let dir = TempDir::new().unwrap();
        let mut registry = DiscoveryRegistry::load(dir.path().join("r.json"), bootstrap());
        let feeds = vec![
            feed("CAI Arezzo", vec![item("Gita", "https://shared/gita", "")]),
            feed("CAI Stia", vec![item("Gita", "https://shared/gita", "")]),
        ];

        let records = aggregator().build(&feeds, &mut registry, &run_time());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, "CAI Arezzo");
    }

    #[test]
    fn discriminators_split_a_shared_link() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.json");
        DiscoveryRegistry::load(&path, bootstrap()).save().unwrap();
        let mut registry = DiscoveryRegistry::load(&path, bootstrap());

        let mut a = item("Monte Falco", "https://a/programma.pdf", "");
        a.discriminator = Some("Monte Falco".into());
        let mut b = item("Lago", "https://a/programma.pdf", "");
        b.discriminator = Some("Lago".into());
        let feeds = vec![feed("CAI", vec![a, b])];

        let records = aggregator().build(&feeds, &mut registry, &run_time());
        assert_eq!(records.len(), 2);
        assert!(registry.get("https://a/programma.pdf::monte falco").is_some());
        assert!(registry.get("https://a/programma.pdf::lago").is_some());
        assert_eq!(records[0].discovered_at, run_time().timestamp());
    }

    #[test]
    fn linkless_items_keyed_by_title() {
        let agg = aggregator();
        let key = agg.key_for(&item("Serata  Film", " ", ""));
        assert_eq!(key.as_str(), "::serata film");
    }

    #[test]
    fn chronological_is_newest_first() {
        let records = vec![
            record("old", ts(100), None),
            record("new", ts(300), None),
            record("mid", ts(200), None),
        ];
        let titles: Vec<_> = chronological(records)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, ["new", "mid", "old"]);
    }

    #[test]
    fn upcoming_skips_past_and_undated() {
        let records = vec![
            record("later", ts(1), Some(date(2026, 6, 1))),
            record("undated", ts(2), None),
            record("past", ts(3), Some(date(2026, 1, 1))),
            record("today", ts(4), Some(date(2026, 2, 9))),
        ];
        let titles: Vec<_> = upcoming(&records, date(2026, 2, 9))
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, ["today", "later"]);
    }

    #[test]
    fn recent_with_unrepresentable_window_is_empty() {
        let now = ts(1_770_000_000);
        let records = vec![record("yesterday", ts(1_770_000_000 - 86_400), None)];

        assert!(recent(&records, now, 200_000_000_000_000_000, bootstrap()).is_empty());
        assert!(recent(&records, now, -1, bootstrap()).is_empty());
        assert!(recent(&records, now, i64::MAX, bootstrap()).is_empty());
    }

    #[test]
    fn recent_excludes_bootstrap_and_old_discoveries() {
        let now = ts(1_770_000_000);
        let day = 86_400;
        let records = vec![
            record("bootstrap", bootstrap(), None),
            record("yesterday", ts(1_770_000_000 - day), None),
            record("last-month", ts(1_770_000_000 - 30 * day), None),
        ];
        let titles: Vec<_> = recent(&records, now, 7, bootstrap())
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, ["yesterday"]);
    }
}
