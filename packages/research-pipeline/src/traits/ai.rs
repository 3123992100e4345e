//! Generative backend trait.
//!
//! The pipeline never talks to an LLM provider directly. Every call goes
//! through [`GenerativeBackend`], and every response is treated as untrusted
//! text until the decode layer has validated it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{GenerativeError, GenerativeResult};

/// Which pipeline call a request belongs to.
///
/// Used for logging and for routing scripted responses in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationTask {
    /// Free-text answer to the user's prompt
    Answer,
    /// Candidate sources plus overall neutrality/persuasion
    Candidates,
    /// Neutrality and sentiment of a source text
    Tone,
    /// Keyword tags for a source text
    Tags,
    /// Short summary of a source text
    Summary,
    /// Critical-thinking insight over the whole result
    BiasInsight,
    /// Last-resort answer after a pipeline failure
    DirectAnswer,
}

impl GenerationTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Answer => "answer",
            Self::Candidates => "candidates",
            Self::Tone => "tone",
            Self::Tags => "tags",
            Self::Summary => "summary",
            Self::BiasInsight => "bias_insight",
            Self::DirectAnswer => "direct_answer",
        }
    }
}

impl fmt::Display for GenerationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request to the generative backend.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Call label
    pub task: GenerationTask,

    /// Model identifier
    pub model: String,

    /// User-facing prompt text
    pub prompt: String,

    /// System instruction
    pub system_instruction: String,

    /// JSON schema the output is expected (not trusted) to follow
    pub output_schema: Option<serde_json::Value>,

    /// Upper bound on generated tokens
    pub max_output_tokens: Option<u32>,

    /// Deadline for the whole call
    pub timeout: Duration,
}

impl GenerationRequest {
    /// Create a free-text request.
    pub fn new(
        task: GenerationTask,
        model: impl Into<String>,
        system_instruction: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            task,
            model: model.into(),
            prompt: prompt.into(),
            system_instruction: system_instruction.into(),
            output_schema: None,
            max_output_tokens: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Attach an output schema.
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Set the token cap.
    pub fn with_max_output_tokens(mut self, max: Option<u32>) -> Self {
        self.max_output_tokens = max;
        self
    }

    /// Set the call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Generative-text capability consumed by the pipeline.
///
/// Implementations wrap specific LLM providers (OpenAI, Anthropic, etc.).
/// They return the raw response text; shape validation is the caller's job.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Run one generation and return the raw response text.
    async fn generate(&self, request: &GenerationRequest) -> GenerativeResult<String>;

    /// Get the backend name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Run a request under its own timeout.
///
/// An elapsed deadline becomes [`GenerativeError::Timeout`], never a hang.
pub async fn generate(
    backend: &dyn GenerativeBackend,
    request: &GenerationRequest,
) -> GenerativeResult<String> {
    debug!(
        task = %request.task,
        model = %request.model,
        backend = backend.name(),
        prompt_chars = request.prompt.len(),
        "Generative call starting"
    );

    match tokio::time::timeout(request.timeout, backend.generate(request)).await {
        Ok(Ok(text)) if text.trim().is_empty() => Err(GenerativeError::EmptyResponse),
        Ok(result) => result,
        Err(_) => {
            warn!(task = %request.task, timeout = ?request.timeout, "Generative call timed out");
            Err(GenerativeError::Timeout {
                task: request.task,
                elapsed: request.timeout,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowBackend;

    #[async_trait]
    impl GenerativeBackend for SlowBackend {
        async fn generate(&self, _request: &GenerationRequest) -> GenerativeResult<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }
    }

    struct BlankBackend;

    #[async_trait]
    impl GenerativeBackend for BlankBackend {
        async fn generate(&self, _request: &GenerationRequest) -> GenerativeResult<String> {
            Ok("   ".to_string())
        }
    }

    #[tokio::test]
    async fn test_timeout_becomes_error() {
        let request = GenerationRequest::new(GenerationTask::Tone, "m", "sys", "text")
            .with_timeout(Duration::from_millis(10));

        let err = generate(&SlowBackend, &request).await.unwrap_err();
        assert!(matches!(
            err,
            GenerativeError::Timeout {
                task: GenerationTask::Tone,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_blank_response_is_empty_error() {
        let request = GenerationRequest::new(GenerationTask::Answer, "m", "sys", "q");
        let err = generate(&BlankBackend, &request).await.unwrap_err();
        assert!(matches!(err, GenerativeError::EmptyResponse));
    }

    #[test]
    fn test_task_labels() {
        assert_eq!(GenerationTask::BiasInsight.to_string(), "bias_insight");
        assert_eq!(GenerationTask::DirectAnswer.as_str(), "direct_answer");
    }
}
