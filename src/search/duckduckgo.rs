//! DuckDuckGo search over the HTML endpoint (no API key needed).

use super::SearchProvider;
use crate::config::SearchSettings;
use crate::error::{QotdError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, instrument};

/// A single search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

impl std::fmt::Display for SearchHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.title, self.snippet)?;
        if !self.url.is_empty() {
            write!(f, "\nURL: {}", self.url)?;
        }
        Ok(())
    }
}

/// Search provider backed by `html.duckduckgo.com`.
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: url::Url,
    max_results: usize,
    parser: ResultParser,
}

impl DuckDuckGoSearch {
    /// Create a provider from settings.
    pub fn new(settings: &SearchSettings) -> Result<Self> {
        let endpoint = url::Url::parse(&settings.endpoint).map_err(|e| {
            QotdError::Config(format!("Invalid search endpoint {}: {}", settings.endpoint, e))
        })?;

        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            max_results: settings.max_results,
            parser: ResultParser::new()?,
        })
    }

    /// Endpoint the provider queries.
    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<String> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("q", query);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| QotdError::Search(e.to_string()))?;

        if !response.status().is_success() {
            return Err(QotdError::Search(format!(
                "search endpoint returned {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| QotdError::Search(e.to_string()))?;

        let hits = self.parser.extract(&html, self.max_results);
        debug!("Search returned {} hit(s)", hits.len());

        Ok(format_hits(query, &hits))
    }
}

/// Format hits as the plain text handed back to the model.
fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for: {}", query);
    }

    hits.iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Extracts results from DuckDuckGo's HTML result page.
struct ResultParser {
    title: Regex,
    snippet: Regex,
    url: Regex,
    tag: Regex,
}

impl ResultParser {
    fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| QotdError::Config(format!("Bad pattern: {}", e)))
        };

        Ok(Self {
            title: compile(r#"(?s)class="result__a"[^>]*>(.*?)</a>"#)?,
            snippet: compile(r#"(?s)class="result__snippet"[^>]*>(.*?)</(?:a|div|td)>"#)?,
            url: compile(r#"(?s)class="result__url"[^>]*>(.*?)</a>"#)?,
            tag: compile(r"<[^>]+>")?,
        })
    }

    fn extract(&self, html: &str, max_results: usize) -> Vec<SearchHit> {
        html.split("result__body")
            .skip(1)
            .filter_map(|block| {
                let title = self.capture(&self.title, block)?;
                if title.is_empty() {
                    return None;
                }
                Some(SearchHit {
                    title,
                    snippet: self.capture(&self.snippet, block).unwrap_or_default(),
                    url: self.capture(&self.url, block).unwrap_or_default(),
                })
            })
            .take(max_results)
            .collect()
    }

    fn capture(&self, pattern: &Regex, block: &str) -> Option<String> {
        let raw = pattern.captures(block)?.get(1)?.as_str();
        let text = self.tag.replace_all(raw, "");
        Some(html_decode(text.trim()))
    }
}

/// Decode the handful of entities DuckDuckGo emits.
///
/// `&amp;` goes last so escaped entities such as `&amp;lt;` decode only once.
fn html_decode(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
