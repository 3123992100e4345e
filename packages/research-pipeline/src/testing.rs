//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the research pipeline
//! without making real generative or network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{GenerativeError, GenerativeResult, TransportError};
use crate::traits::ai::{GenerationRequest, GenerationTask, GenerativeBackend};
use crate::traits::http::{HttpBackend, HttpMethod, HttpRequest, HttpResponse};

/// Scripted behavior for one generation task.
#[derive(Debug, Clone)]
enum Scripted {
    Respond(String),
    Fail(String),
    Panic,
}

/// A mock generative backend for testing.
///
/// Responses are scripted per [`GenerationTask`]. A task with no script
/// fails with [`GenerativeError::Request`].
#[derive(Default)]
pub struct MockGenerator {
    /// Scripted behavior by task
    scripts: Arc<RwLock<HashMap<GenerationTask, Scripted>>>,

    /// Artificial latency by task
    delays: Arc<RwLock<HashMap<GenerationTask, Duration>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockGeneratorCall>>>,
}

/// Record of a call made to the mock generator.
#[derive(Debug, Clone)]
pub struct MockGeneratorCall {
    pub task: GenerationTask,
    pub model: String,
    pub prompt: String,
    pub has_schema: bool,
}

impl MockGenerator {
    /// Create a mock with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `raw` for every call of `task`.
    pub fn with_response(self, task: GenerationTask, raw: impl Into<String>) -> Self {
        self.scripts
            .write()
            .unwrap()
            .insert(task, Scripted::Respond(raw.into()));
        self
    }

    /// Fail every call of `task`.
    pub fn fail(self, task: GenerationTask) -> Self {
        self.scripts
            .write()
            .unwrap()
            .insert(task, Scripted::Fail(format!("scripted failure for {task}")));
        self
    }

    /// Panic inside every call of `task`.
    pub fn with_panic(self, task: GenerationTask) -> Self {
        self.scripts.write().unwrap().insert(task, Scripted::Panic);
        self
    }

    /// Delay every call of `task`.
    pub fn with_delay(self, task: GenerationTask, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(task, delay);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockGeneratorCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Number of calls made for one task.
    pub fn calls_for(&self, task: GenerationTask) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.task == task)
            .count()
    }
}

#[async_trait]
impl GenerativeBackend for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> GenerativeResult<String> {
        self.calls.write().unwrap().push(MockGeneratorCall {
            task: request.task,
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            has_schema: request.output_schema.is_some(),
        });

        let delay = self.delays.read().unwrap().get(&request.task).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let script = self.scripts.read().unwrap().get(&request.task).cloned();
        match script {
            Some(Scripted::Respond(raw)) => Ok(raw),
            Some(Scripted::Fail(message)) => Err(GenerativeError::Request(message)),
            Some(Scripted::Panic) => panic!("scripted panic for {}", request.task),
            None => Err(GenerativeError::Request(format!(
                "no response scripted for {}",
                request.task
            ))),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Scripted behavior for one URL.
#[derive(Debug, Clone, Default)]
struct Route {
    head: Option<HttpResponse>,

    /// Served in order; the last one repeats
    gets: Vec<HttpResponse>,
    timeout: bool,

    /// Never answer, ignoring the request timeout
    stall: bool,
}

/// A mock HTTP backend for testing.
///
/// URLs are matched exactly. Unknown URLs fail like a refused connection.
/// A HEAD to a URL with GET responses but no explicit HEAD returns 200.
#[derive(Default)]
pub struct MockHttp {
    routes: Arc<RwLock<HashMap<String, Route>>>,

    /// GETs served so far per URL
    served: Arc<RwLock<HashMap<String, usize>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<(HttpMethod, String)>>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` with status 200.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        let response = HttpResponse::new(200, html).with_content_type("text/html; charset=utf-8");
        self.route(url, |route| route.gets = vec![response]);
        self
    }

    /// Answer HEAD requests with `response`.
    pub fn with_head(self, url: impl Into<String>, response: HttpResponse) -> Self {
        self.route(url, |route| route.head = Some(response));
        self
    }

    /// Answer successive GETs with `responses`, repeating the last.
    pub fn with_get_sequence(self, url: impl Into<String>, responses: Vec<HttpResponse>) -> Self {
        self.route(url, |route| route.gets = responses);
        self
    }

    /// Time out every request.
    pub fn with_timeout(self, url: impl Into<String>) -> Self {
        self.route(url, |route| route.timeout = true);
        self
    }

    /// Hang on every request, ignoring the request timeout.
    pub fn with_stall(self, url: impl Into<String>) -> Self {
        self.route(url, |route| route.stall = true);
        self
    }

    /// Get all requests made, in order.
    pub fn calls(&self) -> Vec<(HttpMethod, String)> {
        self.calls.read().unwrap().clone()
    }

    /// Number of requests with `method` to `url`.
    pub fn request_count(&self, method: HttpMethod, url: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|(m, u)| *m == method && u == url)
            .count()
    }

    fn route(&self, url: impl Into<String>, update: impl FnOnce(&mut Route)) {
        let mut routes = self.routes.write().unwrap();
        update(routes.entry(url.into()).or_default());
    }

    fn next_get(&self, url: &str, route: &Route) -> Option<HttpResponse> {
        let mut served = self.served.write().unwrap();
        let index = served.entry(url.to_string()).or_insert(0);
        let response = route
            .gets
            .get(*index)
            .or_else(|| route.gets.last())
            .cloned();
        *index += 1;
        response
    }
}

#[async_trait]
impl HttpBackend for MockHttp {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls
            .write()
            .unwrap()
            .push((request.method, request.url.clone()));

        let route = self.routes.read().unwrap().get(&request.url).cloned();
        let refused = || TransportError::Request {
            url: request.url.clone(),
            message: "connection refused".to_string(),
        };

        let Some(route) = route else {
            return Err(refused());
        };
        if route.stall {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if route.timeout {
            return Err(TransportError::Timeout {
                url: request.url.clone(),
            });
        }

        match request.method {
            HttpMethod::Head => match (&route.head, route.gets.is_empty()) {
                (Some(head), _) => Ok(head.clone()),
                (None, false) => Ok(HttpResponse::new(200, "")),
                (None, true) => Err(refused()),
            },
            HttpMethod::Get => self.next_get(&request.url, &route).ok_or_else(refused),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_sequence_repeats_last() {
        let http = MockHttp::new().with_get_sequence(
            "https://a.org/",
            vec![HttpResponse::new(403, ""), HttpResponse::new(200, "ok")],
        );
        let get = || HttpRequest::get("https://a.org/", Duration::from_secs(1));

        assert_eq!(http.send(get()).await.unwrap().status, 403);
        assert_eq!(http.send(get()).await.unwrap().status, 200);
        assert_eq!(http.send(get()).await.unwrap().status, 200);
        assert_eq!(http.request_count(HttpMethod::Get, "https://a.org/"), 3);
    }

    #[tokio::test]
    async fn test_unknown_url_refused() {
        let http = MockHttp::new();
        let err = http
            .send(HttpRequest::head("https://nowhere.org/", Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request { .. }));
    }

    #[tokio::test]
    async fn test_generator_records_calls() {
        let ai = MockGenerator::new().with_response(GenerationTask::Answer, "42");
        let request = GenerationRequest::new(GenerationTask::Answer, "m", "sys", "question");

        assert_eq!(ai.generate(&request).await.unwrap(), "42");
        let err = ai
            .generate(&GenerationRequest::new(GenerationTask::Tone, "m", "sys", "t"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerativeError::Request(_)));
        assert_eq!(ai.calls_for(GenerationTask::Answer), 1);
        assert_eq!(ai.calls()[0].prompt, "question");
    }
}
