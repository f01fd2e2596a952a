//! Link discovery on kayoanime-style WordPress pages.

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::LinkSearch;
use crate::error::{Error, Result};
use crate::url::{DRIVE_HOST, DiscoveredLink};

const BASE_URL: &str = "https://kayoanime.com";

/// Label used for anchors without visible text.
pub const NO_TEXT_LABEL: &str = "(no text)";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Search(e.to_string()))
}

/// Returns the absolute URL of the first search result on a results page.
fn first_result_url(html: &str, base: &reqwest::Url) -> Result<Option<reqwest::Url>> {
    let document = Html::parse_document(html);
    let result_selector = selector(".post-title a")?;

    Ok(document
        .select(&result_selector)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| base.join(href).ok()))
}

/// Collects every anchor pointing at Google Drive, in page order.
fn extract_drive_links(html: &str) -> Result<Vec<DiscoveredLink>> {
    let document = Html::parse_document(html);
    let anchor_selector = selector("a[href]")?;

    Ok(document
        .select(&anchor_selector)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            if !href.contains(DRIVE_HOST) {
                return None;
            }
            let text = a.text().collect::<String>();
            let text = text.trim();
            let label = if text.is_empty() { NO_TEXT_LABEL } else { text };
            Some(DiscoveredLink::new(label, href))
        })
        .collect())
}

/// Searches the site and scrapes Drive links from the first matching post.
pub struct KayoSearch {
    client: reqwest::Client,
    base_url: String,
}

impl KayoSearch {
    /// Creates a client for the public site.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    /// Creates a client for a mirror or a custom base URL.
    #[must_use]
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch_html(&self, url: reqwest::Url) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Search(format!("{} returned {status}", response.url())));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl LinkSearch for KayoSearch {
    async fn search(&self, query: &str) -> Result<Vec<DiscoveredLink>> {
        let base = reqwest::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid search base URL: {e}")))?;
        let mut search_url = base.clone();
        search_url.query_pairs_mut().append_pair("s", query);

        let results_page = self.fetch_html(search_url).await?;
        let Some(post_url) = first_result_url(&results_page, &base)? else {
            log::warn!("No search results for '{query}'");
            return Ok(Vec::new());
        };

        log::info!("Opening first result: {post_url}");
        let post_page = self.fetch_html(post_url).await?;
        let links = extract_drive_links(&post_page)?;
        log::info!("Found {} Drive link(s) for '{query}'", links.len());
        Ok(links)
    }
}
