//! Discovery registry: when was each announcement first seen.
//!
//! No source exposes a reliable creation time for scraped content, so the
//! first sighting by any run stands in for it. The registry is a single JSON
//! object mapping keys to RFC 3339 timestamps:
//!
//! ```text
//! {
//!   "https://example.org/programma.pdf::trekking del lago": "2024-01-01T00:00:00Z",
//!   "https://example.org/gite/monte-falco": "2026-03-02T07:14:09.52Z"
//! }
//! ```
//!
//! It is loaded once per run, grows in memory, and is written back once at
//! the end. Entries are never updated or removed.
//!
//! A missing file means this is the first run ever. Every key seen during
//! that run is stamped with a fixed bootstrap instant instead of "now", so a
//! populated backlog does not all look freshly discovered.

mod key;

use std::{collections::BTreeMap, fs, io, path::PathBuf};

use jiff::Timestamp;

pub use key::{DiscoveryKey, discriminator_from_title};

/// Errors that can occur while persisting the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, RegistryError>;

/// Key → first-seen timestamp, backed by a JSON file.
#[derive(Debug)]
pub struct DiscoveryRegistry {
    path: PathBuf,
    bootstrap: Timestamp,
    first_run: bool,
    entries: BTreeMap<String, Timestamp>,
}

impl DiscoveryRegistry {
    /// Loads the registry stored at `path`.
    ///
    /// Never fails: a missing, unreadable, or corrupt file starts an empty
    /// registry in first-run mode.
    pub fn load(path: impl Into<PathBuf>, bootstrap: Timestamp) -> Self {
        let path = path.into();
        let (entries, first_run) = match read_entries(&path) {
            Ok(Some(entries)) => {
                tracing::debug!(path = %path.display(), entries = entries.len(), "loaded discovery registry");
                (entries, false)
            }
            Ok(None) => {
                tracing::info!(path = %path.display(), "no discovery registry found, first run");
                (BTreeMap::new(), true)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable discovery registry, treating as first run");
                (BTreeMap::new(), true)
            }
        };

        Self {
            path,
            bootstrap,
            first_run,
            entries,
        }
    }

    /// Whether no stored registry existed when this one was loaded.
    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    /// The instant assigned to keys first seen during a first run.
    pub fn bootstrap(&self) -> Timestamp {
        self.bootstrap
    }

    /// Returns when `key` was first seen, assigning the current time if it
    /// never was.
    pub fn get_or_assign(&mut self, key: &DiscoveryKey) -> Timestamp {
        self.get_or_assign_at(key, Timestamp::now())
    }

    /// Like [`get_or_assign`](Self::get_or_assign), with `now` as the clock.
    ///
    /// Repeated calls with the same key return the first call's value.
    pub fn get_or_assign_at(&mut self, key: &DiscoveryKey, now: Timestamp) -> Timestamp {
        if let Some(seen) = self.entries.get(key.as_str()) {
            return *seen;
        }
        let assigned = if self.first_run { self.bootstrap } else { now };
        tracing::debug!(key = key.as_str(), %assigned, "new discovery");
        self.entries.insert(key.as_str().to_string(), assigned);
        assigned
    }

    /// Looks up a key without assigning.
    pub fn get(&self, key: &str) -> Option<Timestamp> {
        self.entries.get(key).copied()
    }

    /// All entries, ordered by key.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Timestamp)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the whole registry back to its file.
    ///
    /// The parent directory is created if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "saved discovery registry");
        Ok(())
    }
}

/// Reads the stored entries, or `None` if there is no file.
fn read_entries(path: &std::path::Path) -> Result<Option<BTreeMap<String, Timestamp>>> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&json)?))
}
