//! Registry keys: a resource URL, optionally qualified by a discriminator.
//!
//! A bare URL is enough when it identifies one announcement. When one URL
//! carries many (a season program PDF, a shared notice page), each event
//! gets `URL + separator + discriminator` so it keeps its own discovery time.

use std::fmt;

/// Maximum characters kept from a title when used as a discriminator.
const DISCRIMINATOR_MAX_CHARS: usize = 60;

/// Identity of one announcement in the discovery registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiscoveryKey(String);

impl DiscoveryKey {
    /// Key for a URL that identifies a single announcement.
    pub fn url(url: &str) -> Self {
        Self(url.to_string())
    }

    /// Key for one of several announcements sharing `url`.
    pub fn qualified(url: &str, discriminator: &str, separator: &str) -> Self {
        Self(format!("{url}{separator}{discriminator}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiscoveryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes a title into a discriminator: lowercase, single spaces, and
/// at most 60 characters.
///
/// Cosmetic edits upstream (case, spacing) keep mapping to the same key.
pub fn discriminator_from_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .chars()
        .take(DISCRIMINATOR_MAX_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_and_qualified_keys_differ() {
        let url = "https://example/programma.pdf";
        let bare = DiscoveryKey::url(url);
        let qualified = DiscoveryKey::qualified(url, "monte falco", "::");

        assert_eq!(bare.as_str(), url);
        assert_eq!(qualified.as_str(), "https://example/programma.pdf::monte falco");
        assert_ne!(bare, qualified);
    }

    #[test]
    fn discriminator_normalizes_case_and_spacing() {
        assert_eq!(
            discriminator_from_title("  Trekking   del LAGO\n di Ridracoli "),
            "trekking del lago di ridracoli"
        );
    }

    #[test]
    fn discriminator_is_truncated_by_chars() {
        let title = "è".repeat(100);
        assert_eq!(discriminator_from_title(&title).chars().count(), 60);
    }
}
