//! Link discovery: turning a user query into Drive links.

mod kayo;

pub use kayo::KayoSearch;

use async_trait::async_trait;

use crate::error::Result;
use crate::url::{DiscoveredLink, parse_direct_input};

/// A site that can be searched for Drive links.
#[async_trait]
pub trait LinkSearch: Send + Sync {
    /// Returns the Drive links found for `query`, in page order.
    async fn search(&self, query: &str) -> Result<Vec<DiscoveredLink>>;
}

/// Resolves user input to links: direct ids and Drive URLs are used as-is,
/// anything else is searched for.
///
/// # Errors
///
/// Returns an error if the search itself fails.
pub async fn discover_links(input: &str, search: &dyn LinkSearch) -> Result<Vec<DiscoveredLink>> {
    if let Some(links) = parse_direct_input(input) {
        log::debug!("Using direct input: {input}");
        return Ok(links);
    }
    search.search(input.trim()).await
}
