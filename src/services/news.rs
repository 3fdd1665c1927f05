// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! News retriever (Google Custom Search).
//!
//! Builds a running-news query from the user's category preferences, fetches
//! candidates restricted to the last 30 days and validates them. Invalid
//! entries are dropped rather than failing the whole lookup; configuration
//! and transport errors produce `{articles: [], error}`. This component
//! never panics and never returns a Rust error.

use crate::models::user::NewsSearchCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

const SEARCH_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Bounded timeout per search call.
const NEWS_TIMEOUT_SECS: u64 = 10;

/// At most this many validated articles are returned.
const MAX_ARTICLES: usize = 5;

/// Search window in days.
const NEWS_WINDOW_DAYS: i64 = 30;

/// Result of a news lookup. An empty article list is not itself an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsLookup {
    pub articles: Vec<NewsArticle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NewsLookup {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            articles: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// A validated article candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    /// Absolute URL
    pub link: String,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Running news lookup service.
#[derive(Clone)]
pub struct NewsService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    engine_id: Option<String>,
}

impl NewsService {
    pub fn new(api_key: Option<String>, engine_id: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(NEWS_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: SEARCH_BASE_URL.to_string(),
            api_key,
            engine_id,
        }
    }

    /// Fetch up to 5 validated running-news articles. Total: never errors.
    pub async fn fetch(&self, location: &str, categories: &[NewsSearchCategory]) -> NewsLookup {
        let (Some(api_key), Some(engine_id)) =
            (self.api_key.as_deref(), self.engine_id.as_deref())
        else {
            return NewsLookup::failed(
                "News service is not configured (missing API key or engine ID)",
            );
        };

        let query = build_query(location, categories);
        let window_start = (chrono::Utc::now() - chrono::Duration::days(NEWS_WINDOW_DAYS))
            .format("%Y-%m-%d")
            .to_string();

        tracing::debug!(query = %query, "Fetching running news");

        let response = match self
            .http
            .get(&self.base_url)
            .query(&[
                ("key", api_key),
                ("cx", engine_id),
                ("q", &format!("{} after:{}", query, window_start)),
                ("dateRestrict", &format!("d{}", NEWS_WINDOW_DAYS)),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "News search request failed");
                return NewsLookup::failed(format!("Error fetching news: {}", e));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body: SearchResponse = response.json().await.unwrap_or_default();
            let message = body
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| format!("HTTP error, status {}", status));
            tracing::warn!(status = %status, message = %message, "News search API error");
            return NewsLookup::failed(format!("Error fetching news: {}", message));
        }

        let body: SearchResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                return NewsLookup::failed(format!("Malformed news response: {}", e));
            }
        };

        if let Some(error) = body.error {
            return NewsLookup::failed(format!("News search API error: {}", error.message));
        }

        let articles: Vec<NewsArticle> = body
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(validate_item)
            .take(MAX_ARTICLES)
            .collect();

        NewsLookup {
            articles,
            error: None,
        }
    }
}

/// Build the search query from category preferences.
///
/// `geographic_area` scopes the query to the user's city instead of acting
/// as a keyword (unless it is the only way to keep the keyword list
/// non-empty and no location is usable). With no categories at all the
/// query falls back to generic recent running news.
fn build_query(location: &str, categories: &[NewsSearchCategory]) -> String {
    let location = location.trim();
    let usable_location = !location.is_empty() && !location.eq_ignore_ascii_case("not set");

    if categories.is_empty() {
        let mut query = "recent notable running news".to_string();
        if usable_location {
            query.push_str(" in ");
            query.push_str(location);
        }
        return query;
    }

    let wants_geographic = categories.contains(&NewsSearchCategory::GeographicArea);
    let scope_to_location = wants_geographic && usable_location;

    let keywords: Vec<&str> = categories
        .iter()
        .filter(|c| !(scope_to_location && **c == NewsSearchCategory::GeographicArea))
        .map(|c| c.keyword())
        .collect();

    let mut query = if keywords.is_empty() {
        "running news".to_string()
    } else {
        format!("running ({}) news", keywords.join(" OR "))
    };

    if scope_to_location {
        query.push_str(" in ");
        query.push_str(location);
    }

    query
}

/// Accept an item only if it has a non-empty title, an absolute URL and a
/// snippet; resolve the source from page metadata when present.
fn validate_item(item: SearchItem) -> Option<NewsArticle> {
    let title = item.title.as_deref().unwrap_or("").trim().to_string();
    if title.is_empty() {
        return None;
    }

    let link = item.link.as_deref().unwrap_or("").trim().to_string();
    let url = match reqwest::Url::parse(&link) {
        Ok(url) => url,
        Err(_) => {
            tracing::debug!(link = %link, title = %title, "Dropping article with invalid URL");
            return None;
        }
    };

    let snippet = item.snippet.as_deref().unwrap_or("").trim().to_string();
    if snippet.is_empty() {
        return None;
    }

    let source = item
        .pagemap
        .as_ref()
        .and_then(|p| p.metatags.as_ref())
        .and_then(|tags| tags.first())
        .and_then(|tag| tag.get("og:site_name"))
        .cloned()
        .or(item.display_link)
        .or_else(|| {
            url.host_str()
                .map(|h| h.trim_start_matches("www.").to_string())
        });

    Some(NewsArticle {
        title,
        link,
        snippet,
        source,
    })
}

// ─── Wire Types (Google Custom Search) ───────────────────────────

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
    error: Option<SearchError>,
}

#[derive(Debug, Deserialize)]
struct SearchError {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct SearchItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
    #[serde(rename = "displayLink")]
    display_link: Option<String>,
    pagemap: Option<PageMap>,
}

#[derive(Debug, Deserialize)]
struct PageMap {
    metatags: Option<Vec<HashMap<String, String>>>,
}
