//! `reqwest`-based HTTP backend.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::redirect::Policy;
use tracing::debug;

use crate::error::TransportError;
use crate::traits::http::{HttpBackend, HttpMethod, HttpRequest, HttpResponse};

/// Browser-like identification; some sites reject unknown agents outright.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

const MAX_REDIRECTS: usize = 5;

/// HTTP backend for probes and page fetches.
///
/// # Example
///
/// ```rust,ignore
/// use research_pipeline::backends::ReqwestBackend;
///
/// let http = Arc::new(ReqwestBackend::new()?);
/// ```
#[derive(Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    /// Create a backend with the default user agent.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Create a backend with a custom user agent.
    pub fn with_user_agent(user_agent: &str) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }

    /// Use an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let builder = match request.method {
            HttpMethod::Head => self.client.head(&request.url),
            HttpMethod::Get => self.client.get(&request.url),
        };

        let to_error = |e: reqwest::Error| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: request.url.clone(),
                }
            } else {
                TransportError::Request {
                    url: request.url.clone(),
                    message: e.to_string(),
                }
            }
        };

        let response = builder
            .timeout(request.timeout)
            .send()
            .await
            .map_err(to_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = match request.method {
            HttpMethod::Head => String::new(),
            HttpMethod::Get => response.text().await.map_err(to_error)?,
        };

        debug!(url = %request.url, method = ?request.method, status, "HTTP request finished");

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}
