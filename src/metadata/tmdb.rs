//! TMDB-backed metadata resolver.

use async_trait::async_trait;
use serde::Deserialize;

use super::{MetadataResolver, ResolvedMetadata, UNKNOWN_YEAR};
use crate::content::ContentKind;
use crate::error::{Error, Result};

const BASE_URL: &str = "https://api.themoviedb.org/3";

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// One search hit. Movies carry `title`/`release_date`, shows carry
/// `name`/`first_air_date`.
#[derive(Debug, Deserialize)]
struct SearchHit {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
}

impl SearchHit {
    fn into_metadata(self, query: &str) -> ResolvedMetadata {
        let title = self
            .title
            .or(self.name)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| query.to_string());
        let year = self
            .release_date
            .or(self.first_air_date)
            .as_deref()
            .and_then(release_year)
            .unwrap_or_else(|| UNKNOWN_YEAR.to_string());
        ResolvedMetadata {
            title,
            year,
            catalog_id: self.id.to_string(),
        }
    }
}

/// Extracts a four-digit year from a `YYYY-MM-DD` date.
fn release_year(date: &str) -> Option<String> {
    let year = date.get(..4)?;
    year.bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| year.to_string())
}

/// Resolves titles through the TMDB search API, taking the first hit.
pub struct TmdbResolver {
    client: reqwest::Client,
    api_key: String,
    language: String,
    base_url: String,
}

impl TmdbResolver {
    /// Creates a resolver using the public TMDB endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            language: "en-US".to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Sets the response language (e.g. `en-US`, `ja-JP`).
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Points the resolver at a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn search(&self, query: &str, kind: ContentKind) -> Result<Option<ResolvedMetadata>> {
        let url = format!("{}/search/{}", self.base_url, kind.catalog_type());
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
                ("query", query),
                ("include_adult", "false"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Metadata(format!("TMDB returned {status}: {body}")));
        }
        Ok(first_hit(&body, query)?)
    }
}

/// Parses a search response body and converts the first hit.
fn first_hit(body: &str, query: &str) -> serde_json::Result<Option<ResolvedMetadata>> {
    let page: SearchPage = serde_json::from_str(body)?;
    Ok(page
        .results
        .into_iter()
        .next()
        .map(|hit| hit.into_metadata(query)))
}

#[async_trait]
impl MetadataResolver for TmdbResolver {
    async fn resolve(&self, query: &str, kind: ContentKind) -> ResolvedMetadata {
        match self.search(query, kind).await {
            Ok(Some(meta)) => {
                log::debug!(
                    "Resolved '{query}' as {} '{}' ({}) id {}",
                    kind.catalog_type(),
                    meta.title,
                    meta.year,
                    meta.catalog_id
                );
                meta
            }
            Ok(None) => {
                log::warn!("No TMDB results for query: {query}");
                ResolvedMetadata::unresolved(query)
            }
            Err(e) => {
                log::error!("TMDB lookup failed for '{query}': {e}");
                ResolvedMetadata::unresolved(query)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_hit_uses_title_and_release_date() {
        let body = r#"{"page":1,"results":[
            {"id":372058,"title":"Your Name.","release_date":"2016-08-26"},
            {"id":1,"title":"Other","release_date":"1999-01-01"}
        ]}"#;
        let meta = first_hit(body, "your name movie").unwrap().unwrap();
        assert_eq!(
            meta,
            ResolvedMetadata {
                title: "Your Name.".to_string(),
                year: "2016".to_string(),
                catalog_id: "372058".to_string(),
            }
        );
    }

    #[test]
    fn tv_hit_uses_name_and_first_air_date() {
        let body = r#"{"results":[{"id":1429,"name":"Attack on Titan","first_air_date":"2013-04-07"}]}"#;
        let meta = first_hit(body, "aot").unwrap().unwrap();
        assert_eq!(meta.title, "Attack on Titan");
        assert_eq!(meta.year, "2013");
        assert_eq!(meta.catalog_id, "1429");
    }

    #[test]
    fn missing_date_falls_back_to_unknown_year() {
        let body = r#"{"results":[{"id":7,"name":"Upcoming","first_air_date":""}]}"#;
        let meta = first_hit(body, "upcoming").unwrap().unwrap();
        assert_eq!(meta.year, "0000");
        assert_eq!(meta.catalog_id, "7");
    }

    #[test]
    fn empty_results_yield_none() {
        assert!(first_hit(r#"{"results":[]}"#, "nothing").unwrap().is_none());
        assert!(first_hit(r"{}", "nothing").unwrap().is_none());
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(first_hit("<html>", "q").is_err());
    }

    #[test]
    fn release_year_requires_digits() {
        assert_eq!(release_year("2001-05-01"), Some("2001".to_string()));
        assert_eq!(release_year("20"), None);
        assert_eq!(release_year("TBA-01"), None);
    }

    #[tokio::test]
    async fn unreachable_api_returns_sentinel() {
        let resolver = TmdbResolver::new(reqwest::Client::new(), "key")
            .with_base_url("http://127.0.0.1:1");
        let meta = resolver.resolve("Some Movie", ContentKind::Movie).await;
        assert_eq!(meta, ResolvedMetadata::unresolved("Some Movie"));
    }
}
