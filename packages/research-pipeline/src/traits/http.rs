//! HTTP backend trait used for liveness probes and page fetches.

use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use crate::error::TransportError;

/// HTTP method supported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Lightweight probe, body is ignored
    Head,
    /// Full page fetch
    Get,
}

/// A request to the HTTP backend.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub timeout: Duration,
}

impl HttpRequest {
    /// Create a HEAD request.
    pub fn head(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: HttpMethod::Head,
            url: url.into(),
            timeout,
        }
    }

    /// Create a GET request.
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            timeout,
        }
    }
}

/// Response from the HTTP backend.
///
/// Any status code is a successful transport; status policy belongs to the
/// caller.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    /// Create a response with a status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP fetch/probe capability consumed by the pipeline.
///
/// Implementations send the declared user agent and accept headers and
/// honour `request.timeout`. A timeout must come back as
/// [`TransportError::Timeout`].
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Send one request.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Get the backend name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Send a request under its own timeout.
///
/// Backends are expected to honour `request.timeout`, but an elapsed
/// deadline is enforced here as well and becomes [`TransportError::Timeout`].
pub async fn send(
    backend: &dyn HttpBackend,
    request: HttpRequest,
) -> Result<HttpResponse, TransportError> {
    let url = request.url.clone();
    let timeout = request.timeout;

    match tokio::time::timeout(timeout, backend.send(request)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(url = %url, timeout = ?timeout, backend = backend.name(), "HTTP request timed out");
            Err(TransportError::Timeout { url })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ignores the request timeout entirely.
    struct StuckBackend;

    #[async_trait]
    impl HttpBackend for StuckBackend {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(HttpResponse::new(200, ""))
        }
    }

    #[tokio::test]
    async fn test_send_enforces_timeout_on_stuck_backend() {
        let request = HttpRequest::head("https://stuck.org/", Duration::from_millis(20));

        let result = tokio::time::timeout(Duration::from_secs(5), send(&StuckBackend, request))
            .await
            .expect("send must not hang");
        assert!(matches!(
            result,
            Err(TransportError::Timeout { url }) if url == "https://stuck.org/"
        ));
    }

    #[test]
    fn test_is_success() {
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
    }
}
