//! Bacheca configuration.
//!
//! Loaded from `~/.bacheca/config.toml`. Every field has a default, so a
//! missing file (or a missing field) is fine.
//!
//! The registry file is resolved through a chain:
//!
//! 1. `--registry <path>`: explicit per-command override
//! 2. `BACHECA_REGISTRY` env var
//! 3. `registry-path` in `config.toml`
//! 4. `~/.bacheca/discovered.json`

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{aggregate::recent_window, infer::GraceWindows};

/// Bacheca configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Where the discovery registry is stored.
    pub registry_path: Option<PathBuf>,

    /// Discovery time given to everything seen during the very first run.
    /// Pick it once per deployment and leave it alone.
    pub bootstrap_instant: Timestamp,

    /// Days a month-name date may lie in the past before rolling to next year.
    pub month_grace_days: i64,

    /// Days a `dd/mm` date may lie in the past before rolling to next year.
    pub numeric_grace_days: i64,

    /// Joins a URL and its discriminator in registry keys.
    pub key_separator: String,

    /// Summaries longer than this many characters are truncated.
    pub summary_max_chars: usize,

    /// How many days a discovery counts as recent.
    pub recent_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        let grace = GraceWindows::default();
        Self {
            registry_path: None,
            bootstrap_instant: Timestamp::constant(1_704_067_200, 0), // 2024-01-01T00:00:00Z
            month_grace_days: grace.month_name_days,
            numeric_grace_days: grace.numeric_days,
            key_separator: "::".to_string(),
            summary_max_chars: 250,
            recent_days: 7,
        }
    }
}

impl Config {
    /// Load config from `~/.bacheca/config.toml`.
    /// Returns defaults if the file (or the home directory) is missing.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from an explicit path, falling back to defaults if the
    /// file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        if config.month_grace_days < 0 || config.numeric_grace_days < 0 {
            return Err(format!(
                "grace windows must not be negative in {}",
                path.display()
            ));
        }

        if recent_window(config.recent_days).is_none() {
            return Err(format!(
                "recent-days must be a non-negative number of days in {}",
                path.display()
            ));
        }

        Ok(config)
    }

    /// The config file path: `~/.bacheca/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".bacheca").join("config.toml"))
    }

    /// Grace windows for date inference.
    pub fn grace(&self) -> GraceWindows {
        GraceWindows {
            month_name_days: self.month_grace_days,
            numeric_days: self.numeric_grace_days,
        }
    }

    /// Resolve the registry file from the tiered resolution chain.
    pub fn resolve_registry_path(&self, explicit: Option<&Path>) -> Result<PathBuf, String> {
        // 1. Explicit --registry flag.
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        // 2. BACHECA_REGISTRY environment variable.
        if let Ok(path) = env::var("BACHECA_REGISTRY")
            && !path.is_empty()
        {
            return Ok(PathBuf::from(path));
        }

        // 3. config.toml, then 4. the default location.
        self.registry_path
            .clone()
            .or_else(|| dirs::home_dir().map(|h| h.join(".bacheca").join("discovered.json")))
            .ok_or_else(|| "could not determine registry path: pass --registry".to_string())
    }
}
