pub mod chromium;
pub mod error;
pub mod extract;

use crate::domain::entry::Entry;
use anyhow::Result;

/// Page to scrape and the CSS selector of the table on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage {
    pub url: String,
    pub selector: String,
}

#[async_trait::async_trait]
pub trait TableFetcher: Send + Sync {
    /// Returns the inner HTML of the first element matching `source.selector` once the page
    /// has rendered.
    async fn fetch_table_html(&self, source: &SourcePage) -> Result<String>;
}

/// Fetches the table and extracts its rows, top to bottom.
pub async fn fetch_entries(fetcher: &dyn TableFetcher, source: &SourcePage) -> Result<Vec<Entry>> {
    let html = fetcher.fetch_table_html(source).await?;
    let entries = extract::extract_entries(&html)?;
    tracing::debug!(url = %source.url, rows = entries.len(), "extracted leaderboard rows");
    Ok(entries)
}
