//! OpenAI implementation of the generative backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use research_pipeline::ai::OpenAI;
//!
//! let ai = OpenAI::from_env()?.with_base_url("https://proxy.example/v1");
//! let pipeline = ResearchPipeline::new(Arc::new(ai), http, PipelineConfig::default());
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{GenerativeError, GenerativeResult};
use crate::security::SecretString;
use crate::traits::ai::{GenerationRequest, GenerativeBackend};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions backend. The model comes from each request.
#[derive(Clone)]
pub struct OpenAI {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAI {
    /// Create a client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: SecretString::new(api_key),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> GenerativeResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| GenerativeError::Request("OPENAI_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl GenerativeBackend for OpenAI {
    async fn generate(&self, request: &GenerationRequest) -> GenerativeResult<String> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: 0.0,
            max_tokens: request.max_output_tokens,
            response_format: request.output_schema.as_ref().map(|schema| ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: request.task.as_str(),
                    strict: true,
                    schema,
                },
            }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose())
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerativeError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerativeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerativeError::Request(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerativeError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
