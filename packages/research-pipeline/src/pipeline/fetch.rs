//! Content fetching and readable-text extraction.
//!
//! The fetcher knows nothing about analysis; it returns plain text and the
//! page title. Only HTTP 403 is retried (once by default, after a fixed
//! delay). Every other failure is terminal for the call.

use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult, TransportError};
use crate::pipeline::canonicalize::CanonicalUrl;
use crate::traits::http::{send, HttpBackend, HttpRequest};
use crate::types::config::PipelineConfig;
use crate::util::{collapse_whitespace, truncate_chars};

/// Content selectors, most specific first. `p` is the generic fallback.
const CONTENT_SELECTORS: &[&str] = &[
    "article p",
    "main p",
    "[role='main'] p",
    ".article-body p",
    ".post-content p",
    ".entry-content p",
    ".content p",
    "#content p",
    "p",
];

/// Readable text extracted from a page.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedContent {
    pub url: String,
    pub title: Option<String>,

    /// Combined paragraph text, already truncated
    pub text: String,

    /// Selector that produced `text`
    pub selector: &'static str,
}

/// Fetches pages and extracts their readable text.
#[derive(Clone)]
pub struct ContentFetcher {
    http: Arc<dyn HttpBackend>,
    timeout: Duration,
    max_forbidden_retries: u32,
    retry_delay: Duration,
    min_fragment_chars: usize,
    min_content_chars: usize,
    max_content_chars: usize,
}

impl ContentFetcher {
    pub fn new(http: Arc<dyn HttpBackend>, config: &PipelineConfig) -> Self {
        Self {
            http,
            timeout: config.fetch_timeout(),
            max_forbidden_retries: config.max_forbidden_retries,
            retry_delay: config.forbidden_retry_delay(),
            min_fragment_chars: config.min_fragment_chars,
            min_content_chars: config.min_content_chars,
            max_content_chars: config.max_content_chars,
        }
    }

    /// Fetch a page and extract its readable text.
    pub async fn fetch(&self, url: &CanonicalUrl) -> SourceResult<FetchedContent> {
        let html = self.fetch_html(url).await?;
        let document = Html::parse_document(&html);

        let (selector, text) = self.best_extraction(&document);
        let chars = text.chars().count();
        if chars < self.min_content_chars {
            debug!(url = %url, chars, "Too little readable text");
            return Err(SourceError::InsufficientContent {
                url: url.to_string(),
                chars,
            });
        }

        Ok(FetchedContent {
            url: url.to_string(),
            title: extract_title(&document),
            text: truncate_chars(&text, self.max_content_chars).to_string(),
            selector,
        })
    }

    /// GET the page, retrying only on 403.
    async fn fetch_html(&self, url: &CanonicalUrl) -> SourceResult<String> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let request = HttpRequest::get(url.as_str(), self.timeout);

            let response = send(self.http.as_ref(), request).await.map_err(|e| {
                warn!(url = %url, error = %e, "Fetch request failed");
                let reason = match &e {
                    TransportError::Timeout { .. } => "timeout".to_string(),
                    TransportError::Request { message, .. } => message.clone(),
                };
                SourceError::FetchFailure {
                    url: url.to_string(),
                    status: None,
                    reason,
                }
            })?;

            if response.status == 403 && attempt <= self.max_forbidden_retries {
                debug!(url = %url, attempt, delay = ?self.retry_delay, "HTTP 403, retrying");
                tokio::time::sleep(self.retry_delay).await;
                continue;
            }

            if !response.is_success() {
                warn!(url = %url, status = response.status, attempts = attempt, "Fetch returned error status");
                return Err(SourceError::FetchFailure {
                    url: url.to_string(),
                    status: Some(response.status),
                    reason: format!("HTTP {}", response.status),
                });
            }

            return Ok(response.body);
        }
    }

    /// Try every selector and keep the one yielding the most text.
    fn best_extraction(&self, document: &Html) -> (&'static str, String) {
        let mut best: (&'static str, String) = ("p", String::new());
        let mut best_chars = 0;

        for selector_str in CONTENT_SELECTORS {
            let Ok(selector) = Selector::parse(selector_str) else {
                continue;
            };

            let text = document
                .select(&selector)
                .map(element_text)
                .filter(|fragment| fragment.chars().count() >= self.min_fragment_chars)
                .collect::<Vec<_>>()
                .join("\n\n");

            let chars = text.chars().count();
            if chars > best_chars {
                best_chars = chars;
                best = (selector_str, text);
            }
        }

        best
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Extract the page title, falling back to the first `<h1>`.
fn extract_title(document: &Html) -> Option<String> {
    ["title", "h1"].iter().find_map(|selector_str| {
        let selector = Selector::parse(selector_str).ok()?;
        document
            .select(&selector)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
    })
}
