//! Event records: normalized announcements ready for rendering.

use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};

/// A normalized announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub title: String,
    pub link: String,

    /// Cleaned and truncated description.
    pub summary: String,

    /// When this record's identity was first seen by any run.
    pub discovered_at: Timestamp,

    /// Publish or update time reported by the origin, or the run time.
    pub source_timestamp: Timestamp,

    /// When the activity takes place, as guessed from the text.
    pub inferred_event_date: Option<Date>,

    pub source: String,
    pub color: String,
}
