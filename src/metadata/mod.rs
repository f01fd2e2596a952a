//! Canonical title metadata lookup.
//!
//! Resolution never fails from the caller's point of view: providers return
//! [`ResolvedMetadata::unresolved`] when anything goes wrong so planning can
//! always continue with degraded names.

mod tmdb;

pub use tmdb::TmdbResolver;

use async_trait::async_trait;

use crate::content::ContentKind;

/// Year placeholder used when the release year is unknown.
pub const UNKNOWN_YEAR: &str = "0000";

/// Catalog id placeholder used when the title could not be found.
pub const UNKNOWN_ID: &str = "unknown";

/// Canonical title, year and catalog id of a piece of media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    /// Canonical title.
    pub title: String,
    /// Four-digit release year, or [`UNKNOWN_YEAR`].
    pub year: String,
    /// Catalog identifier, or [`UNKNOWN_ID`].
    pub catalog_id: String,
}

impl ResolvedMetadata {
    /// Sentinel metadata used when lookup fails: the raw query as title.
    #[must_use]
    pub fn unresolved(query: &str) -> Self {
        Self {
            title: query.to_string(),
            year: UNKNOWN_YEAR.to_string(),
            catalog_id: UNKNOWN_ID.to_string(),
        }
    }

    /// Returns true if this is sentinel metadata.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        self.catalog_id == UNKNOWN_ID
    }

    /// Directory name for this title: `{title} ({year}) [tmdbid-{id}]`.
    ///
    /// `safe_title` must already be sanitized.
    #[must_use]
    pub fn directory_name(&self, safe_title: &str) -> String {
        format!("{safe_title} ({}) [tmdbid-{}]", self.year, self.catalog_id)
    }
}

/// A source of canonical title metadata.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Looks up `query` as the given kind of content.
    ///
    /// Implementations must not fail; they return
    /// [`ResolvedMetadata::unresolved`] instead.
    async fn resolve(&self, query: &str, kind: ContentKind) -> ResolvedMetadata;
}

/// A resolver that never looks anything up.
///
/// Useful when no catalog API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

#[async_trait]
impl MetadataResolver for NoMetadata {
    async fn resolve(&self, query: &str, _kind: ContentKind) -> ResolvedMetadata {
        ResolvedMetadata::unresolved(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_uses_sentinels() {
        let meta = ResolvedMetadata::unresolved("Frieren");
        assert_eq!(meta.title, "Frieren");
        assert_eq!(meta.year, "0000");
        assert_eq!(meta.catalog_id, "unknown");
        assert!(meta.is_unresolved());
    }

    #[test]
    fn directory_name_format() {
        let meta = ResolvedMetadata {
            title: "Your Name.".to_string(),
            year: "2016".to_string(),
            catalog_id: "372058".to_string(),
        };
        assert_eq!(meta.directory_name("Your Name."), "Your Name. (2016) [tmdbid-372058]");
        assert!(!meta.is_unresolved());
    }

    #[tokio::test]
    async fn no_metadata_returns_sentinel() {
        let meta = NoMetadata.resolve("Mushishi", ContentKind::Series).await;
        assert_eq!(meta, ResolvedMetadata::unresolved("Mushishi"));
    }
}
