//! Job link search
//!
//! Scrapes the result links from a search engine's plain HTML endpoint.

use scraper::{Html, Selector};

use crate::config::Config;
use crate::error::{FetchError, Result};

/// Placeholder returned when the search engine rejects the query
pub const SEARCH_FAILED: &str = "<error>Failed to perform search.</error>";

/// Placeholder returned when the result page has no usable links
pub const NO_RESULTS: &str = "<error>No results found.</error>";

/// Anchors marking organic results on the search page
const RESULT_LINK: &str = "a.result__a[href]";

/// Searches for job links
#[derive(Clone)]
pub struct SearchClient {
    http_client: reqwest::Client,
    search_url: String,
    max_results: usize,
}

impl SearchClient {
    /// Create a search client sharing an existing HTTP client
    pub fn new(http_client: reqwest::Client, config: &Config) -> Self {
        Self {
            http_client,
            search_url: config.search_url.clone(),
            max_results: config.search_results,
        }
    }

    /// Run one search query and return at most `max_results` links
    pub async fn search_links(&self, query: &str) -> Result<Vec<String>> {
        let response = self
            .http_client
            .get(&self.search_url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| FetchError::RequestFailed {
                url: self.search_url.clone(),
                message: e.to_string(),
            })?;

        if response.status() != reqwest::StatusCode::OK {
            tracing::warn!(status = %response.status(), "Search request rejected");
            return Ok(vec![SEARCH_FAILED.to_string()]);
        }

        let body = response.text().await.map_err(|e| FetchError::RequestFailed {
            url: self.search_url.clone(),
            message: e.to_string(),
        })?;

        let links = parse_result_links(&body, self.max_results);
        tracing::debug!(query, found = links.len(), "Search completed");

        if links.is_empty() {
            return Ok(vec![NO_RESULTS.to_string()]);
        }
        Ok(links)
    }
}

/// Pull result hrefs containing "http" out of a result page
pub fn parse_result_links(html: &str, limit: usize) -> Vec<String> {
    let Ok(selector) = Selector::parse(RESULT_LINK) else {
        return Vec::new();
    };

    Html::parse_document(html)
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains("http"))
        .map(resolve_redirect)
        .take(limit)
        .collect()
}

/// Unwrap DuckDuckGo's `/l/?uddg=<target>` redirect links
fn resolve_redirect(href: &str) -> String {
    let target = href
        .split(['?', '&'])
        .find_map(|pair| pair.strip_prefix("uddg="))
        .and_then(|encoded| urlencoding::decode(encoded).ok())
        .filter(|decoded| decoded.starts_with("http"));

    match target {
        Some(decoded) => decoded.into_owned(),
        None => href.to_string(),
    }
}
