//! Raw items: what the fetch layer hands over, one feed per source site.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Everything fetched from one source site in a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFeed {
    /// Display name of the site (e.g. "CAI Arezzo").
    pub name: String,

    /// Accent color used when rendering this site's records.
    #[serde(default)]
    pub color: String,

    /// Items in the order the site published them.
    #[serde(default)]
    pub items: Vec<RawItem>,
}

/// A single announcement as it came off a feed or page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    pub title: String,

    /// Resource URL. Part of the discovery key.
    pub link: String,

    /// Free text body, possibly with leftover HTML.
    #[serde(default)]
    pub summary: String,

    /// Publish time reported by the origin, if any.
    #[serde(default)]
    pub published: Option<Timestamp>,

    /// Last-update time reported by the origin, if any.
    #[serde(default)]
    pub updated: Option<Timestamp>,

    /// Qualifies the link when one URL carries many events
    /// (e.g. a shared program PDF).
    #[serde(default)]
    pub discriminator: Option<String>,
}
