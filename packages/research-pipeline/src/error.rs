//! Typed errors for the research pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so each stage can
//! decide which failures degrade and which are dropped.

use std::time::Duration;

use thiserror::Error;

use crate::traits::ai::GenerationTask;

/// Errors that escape a pipeline stage.
///
/// These never reach the caller of `ResearchPipeline::run`; the orchestrator
/// converts them into a fallback result.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Generative backend failed on a stage with no local fallback
    #[error("generative call failed: {0}")]
    Generative(#[from] GenerativeError),

    /// Source validation failed
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Prompt rejected before any call was made
    #[error("invalid prompt: {reason}")]
    InvalidPrompt { reason: String },

    /// A stage panicked
    #[error("stage panicked: {0}")]
    Panicked(String),
}

/// Errors raised while validating or fetching a single source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// URL failed canonicalization or is not absolute http(s)
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Host rejected by the security guard
    #[error("blocked URL: {0}")]
    Blocked(#[from] SecurityError),

    /// Liveness probe failed
    #[error("unreachable: {url} (status {status:?})")]
    Unreachable { url: String, status: Option<u16> },

    /// Full fetch failed after the retry budget
    #[error("fetch failed for {url}: {reason}")]
    FetchFailure {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// Page fetched but too little readable text was found
    #[error("insufficient content at {url}: {chars} chars")]
    InsufficientContent { url: String, chars: usize },
}

/// Errors calling the generative backend.
#[derive(Debug, Error)]
pub enum GenerativeError {
    /// Call exceeded its timeout
    #[error("{task} call timed out after {elapsed:?}")]
    Timeout {
        task: GenerationTask,
        elapsed: Duration,
    },

    /// Network or transport failure
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success response from the backend
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Backend answered with no content
    #[error("empty response")]
    EmptyResponse,
}

/// A generative response that could not be decoded into its contract.
#[derive(Debug, Error)]
pub enum MalformedResponse {
    /// Payload exceeded the accepted size
    #[error("response too large: {len} chars (max {max})")]
    Oversized { len: usize, max: usize },

    /// Payload is not delimited as JSON
    #[error("response is not JSON")]
    NotJson,

    /// JSON did not match the expected shape
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from the HTTP backend.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request exceeded its timeout
    #[error("timeout requesting {url}")]
    Timeout { url: String },

    /// DNS, connection, TLS or body read failure
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// Security-related errors, primarily for SSRF protection.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// URL scheme not allowed (e.g., file://, ftp://)
    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    /// Host is blocked (e.g., localhost, metadata services)
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// IP in blocked CIDR range (e.g., 10.0.0.0/8)
    #[error("blocked IP range: {0}")]
    BlockedCidr(String),

    /// URL has no host
    #[error("URL has no host")]
    NoHost,
}

/// Result type alias for pipeline stages.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for per-source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Result type alias for generative calls.
pub type GenerativeResult<T> = std::result::Result<T, GenerativeError>;

/// Result type alias for security checks.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;
