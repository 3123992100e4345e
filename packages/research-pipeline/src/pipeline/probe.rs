//! Liveness probing.
//!
//! A HEAD request with a short timeout, no retries. Status 200-399 is live;
//! any other status or a transport failure is dead.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::pipeline::canonicalize::CanonicalUrl;
use crate::traits::http::{send, HttpBackend, HttpRequest};

/// Result of probing one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub live: bool,

    /// HTTP status, absent when the request itself failed
    pub status: Option<u16>,
    pub content_type: Option<String>,
}

impl ProbeOutcome {
    fn dead() -> Self {
        Self {
            live: false,
            status: None,
            content_type: None,
        }
    }
}

/// Issues lightweight probes through an [`HttpBackend`].
#[derive(Clone)]
pub struct LivenessProber {
    http: Arc<dyn HttpBackend>,
    timeout: Duration,
}

impl LivenessProber {
    pub fn new(http: Arc<dyn HttpBackend>, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// Probe a URL once.
    pub async fn probe(&self, url: &CanonicalUrl) -> ProbeOutcome {
        match send(self.http.as_ref(), HttpRequest::head(url.as_str(), self.timeout)).await {
            Ok(response) => {
                let live = (200..400).contains(&response.status);
                debug!(url = %url, status = response.status, live, "Probe finished");
                ProbeOutcome {
                    live,
                    status: Some(response.status),
                    content_type: response.content_type,
                }
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Probe failed");
                ProbeOutcome::dead()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::canonicalize::canonicalize;
    use crate::testing::MockHttp;
    use crate::traits::http::{HttpMethod, HttpResponse};

    fn prober(http: MockHttp) -> (LivenessProber, Arc<MockHttp>) {
        let http = Arc::new(http);
        (
            LivenessProber::new(http.clone(), Duration::from_millis(100)),
            http,
        )
    }

    #[tokio::test]
    async fn test_success_and_redirect_are_live() {
        let (prober, _) = prober(
            MockHttp::new()
                .with_head("https://a.org/", HttpResponse::new(200, "").with_content_type("text/html"))
                .with_head("https://b.org/", HttpResponse::new(301, "")),
        );

        let a = prober.probe(&canonicalize("https://a.org/").unwrap()).await;
        assert!(a.live);
        assert_eq!(a.content_type.as_deref(), Some("text/html"));

        let b = prober.probe(&canonicalize("https://b.org/").unwrap()).await;
        assert!(b.live);
        assert_eq!(b.status, Some(301));
    }

    #[tokio::test]
    async fn test_client_and_server_errors_are_dead() {
        let (prober, _) = prober(
            MockHttp::new()
                .with_head("https://gone.org/", HttpResponse::new(404, ""))
                .with_head("https://broken.org/", HttpResponse::new(503, "")),
        );

        assert!(!prober.probe(&canonicalize("https://gone.org/").unwrap()).await.live);
        assert!(!prober.probe(&canonicalize("https://broken.org/").unwrap()).await.live);
    }

    #[tokio::test]
    async fn test_transport_failure_is_dead_and_not_retried() {
        let (prober, http) = prober(MockHttp::new());
        let url = canonicalize("https://nowhere.example/").unwrap();

        let outcome = prober.probe(&url).await;
        assert_eq!(outcome, ProbeOutcome::dead());
        assert_eq!(http.request_count(HttpMethod::Head, url.as_str()), 1);
    }
}
