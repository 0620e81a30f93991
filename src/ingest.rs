//! Ingest: read what the fetch layer produced.
//!
//! Fetchers drop one JSON file per run (or per site). A file holds either a
//! single feed object or an array of them:
//!
//! ```text
//! { "name": "CAI Arezzo", "color": "#e74c3c", "items": [ { "title": ..., "link": ... } ] }
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::model::SourceFeed;

/// Errors that can occur while reading fetched items.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid feed data in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedFile {
    One(SourceFeed),
    Many(Vec<SourceFeed>),
}

/// Reads all feeds from one file.
pub fn load_feeds(path: &Path) -> Result<Vec<SourceFeed>, IngestError> {
    let json = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: FeedFile = serde_json::from_str(&json).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let feeds = match file {
        FeedFile::One(feed) => vec![feed],
        FeedFile::Many(feeds) => feeds,
    };
    for feed in &feeds {
        if feed.items.is_empty() {
            tracing::warn!(source = feed.name.as_str(), path = %path.display(), "feed has no items");
        } else {
            tracing::info!(source = feed.name.as_str(), items = feed.items.len(), "loaded feed");
        }
    }
    Ok(feeds)
}

/// Reads feeds from every file, in order.
///
/// A file that can't be read or parsed is logged and skipped, so one broken
/// site doesn't hold back the others. Fails only when every file failed.
pub fn load_all(paths: &[impl AsRef<Path>]) -> Result<Vec<SourceFeed>, IngestError> {
    let mut feeds = Vec::new();
    let mut loaded = 0_usize;
    let mut first_error = None;

    for path in paths {
        let path = path.as_ref();
        match load_feeds(path) {
            Ok(more) => {
                loaded += 1;
                feeds.extend(more);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping feed file");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) if loaded == 0 => Err(e),
        _ => Ok(feeds),
    }
}
