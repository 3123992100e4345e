//! Content analysis: tone, tags and summary of a source text.
//!
//! Three independent generative calls run concurrently over a capped
//! sample. None of them can fail the caller: a backend error or a response
//! that does not decode resolves to a fixed default.

use indexmap::IndexSet;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::ai::schema::output_schema;
use crate::pipeline::decode::decode_json;
use crate::pipeline::prompts::{
    format_summary_prompt, format_tags_prompt, format_tone_prompt, SUMMARY_SYSTEM, TAGS_SYSTEM,
    TONE_SYSTEM,
};
use crate::traits::ai::{generate, GenerationRequest, GenerationTask, GenerativeBackend};
use crate::types::config::PipelineConfig;
use crate::types::source::{unit_score, NEUTRAL_SCORE};
use crate::util::{collapse_whitespace, truncate_chars};

/// Characters of input kept when the summary call cannot be used.
const FALLBACK_SUMMARY_CHARS: usize = 300;

/// Longest tag kept, in characters.
const MAX_TAG_CHARS: usize = 40;

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ToneResponse {
    #[serde(default, alias = "neutrality_score")]
    neutrality_score: Option<f64>,
    #[serde(default, alias = "sentiment_score")]
    sentiment_score: Option<f64>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
struct TagsResponse {
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
struct SummaryResponse {
    #[serde(default)]
    summary: String,
}

/// Neutrality and sentiment of a text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneScores {
    pub neutrality: f64,
    pub sentiment: f64,
}

impl Default for ToneScores {
    fn default() -> Self {
        Self {
            neutrality: NEUTRAL_SCORE,
            sentiment: NEUTRAL_SCORE,
        }
    }
}

/// Combined analysis of one text.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentAnalysis {
    pub tone: ToneScores,
    pub tags: IndexSet<String>,
    pub summary: String,
}

/// Runs the analysis calls for source texts.
#[derive(Clone)]
pub struct ContentAnalyzer {
    ai: Arc<dyn GenerativeBackend>,
    config: Arc<PipelineConfig>,
}

impl ContentAnalyzer {
    pub fn new(ai: Arc<dyn GenerativeBackend>, config: Arc<PipelineConfig>) -> Self {
        Self { ai, config }
    }

    /// Run tone, tags and summary concurrently.
    pub async fn analyze(&self, text: &str) -> ContentAnalysis {
        let (tone, tags, summary) =
            tokio::join!(self.tone(text), self.tags(text), self.summarize(text));

        ContentAnalysis {
            tone,
            tags,
            summary,
        }
    }

    /// Rate neutrality and sentiment. Defaults to 0.5/0.5.
    pub async fn tone(&self, text: &str) -> ToneScores {
        let sample = self.sample(text);
        let request = self
            .request(GenerationTask::Tone, TONE_SYSTEM, format_tone_prompt(sample))
            .with_schema(output_schema::<ToneResponse>());

        match self.call::<ToneResponse>(&request).await {
            Some(response) => ToneScores {
                neutrality: response.neutrality_score.map_or(NEUTRAL_SCORE, unit_score),
                sentiment: response.sentiment_score.map_or(NEUTRAL_SCORE, unit_score),
            },
            None => ToneScores::default(),
        }
    }

    /// Extract keyword tags. Defaults to an empty set.
    pub async fn tags(&self, text: &str) -> IndexSet<String> {
        let sample = self.sample(text);
        let request = self
            .request(
                GenerationTask::Tags,
                TAGS_SYSTEM,
                format_tags_prompt(sample, self.config.max_tags),
            )
            .with_schema(output_schema::<TagsResponse>());

        let Some(response) = self.call::<TagsResponse>(&request).await else {
            return IndexSet::new();
        };

        response
            .tags
            .iter()
            .map(|tag| collapse_whitespace(tag).to_lowercase())
            .filter(|tag| !tag.is_empty() && tag.chars().count() <= MAX_TAG_CHARS)
            .take(self.config.max_tags)
            .collect()
    }

    /// Summarize. Defaults to a truncation of the input.
    pub async fn summarize(&self, text: &str) -> String {
        let sample = self.sample(text);
        let request = self
            .request(GenerationTask::Summary, SUMMARY_SYSTEM, format_summary_prompt(sample))
            .with_schema(output_schema::<SummaryResponse>());

        match self.call::<SummaryResponse>(&request).await {
            Some(response) if !response.summary.trim().is_empty() => {
                collapse_whitespace(&response.summary)
            }
            _ => fallback_summary(text),
        }
    }

    fn sample<'a>(&self, text: &'a str) -> &'a str {
        truncate_chars(text, self.config.analysis_sample_chars)
    }

    fn request(&self, task: GenerationTask, system: &str, prompt: String) -> GenerationRequest {
        GenerationRequest::new(task, &self.config.analysis_model, system, prompt)
            .with_max_output_tokens(self.config.max_output_tokens)
            .with_timeout(self.config.generation_timeout())
    }

    /// Call and decode; `None` means the default applies.
    async fn call<T: serde::de::DeserializeOwned>(&self, request: &GenerationRequest) -> Option<T> {
        let raw = match generate(self.ai.as_ref(), request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(task = %request.task, error = %e, "Analysis call failed, using default");
                return None;
            }
        };

        match decode_json::<T>(&raw, self.config.max_response_chars) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(task = %request.task, error = %e, "Malformed analysis response, using default");
                None
            }
        }
    }
}

/// Deterministic stand-in summary: the start of the text.
pub fn fallback_summary(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let truncated = truncate_chars(&collapsed, FALLBACK_SUMMARY_CHARS);
    if truncated.len() < collapsed.len() {
        format!("{}...", truncated.trim_end())
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGenerator;

    fn analyzer(ai: MockGenerator) -> (ContentAnalyzer, Arc<MockGenerator>) {
        let ai = Arc::new(ai);
        (
            ContentAnalyzer::new(ai.clone(), Arc::new(PipelineConfig::for_testing())),
            ai,
        )
    }

    #[tokio::test]
    async fn test_parses_all_three_calls() {
        let (analyzer, ai) = analyzer(
            MockGenerator::new()
                .with_response(GenerationTask::Tone, r#"{"neutralityScore": 0.8, "sentimentScore": 0.3}"#)
                .with_response(GenerationTask::Tags, r#"{"tags": ["Climate", "policy", "climate", " "]}"#)
                .with_response(GenerationTask::Summary, r#"{"summary": "A short   summary."}"#),
        );

        let analysis = analyzer.analyze("Some article text").await;
        assert_eq!(analysis.tone.neutrality, 0.8);
        assert_eq!(analysis.tone.sentiment, 0.3);
        assert_eq!(
            analysis.tags.iter().collect::<Vec<_>>(),
            vec!["climate", "policy"]
        );
        assert_eq!(analysis.summary, "A short summary.");
        assert_eq!(ai.call_count(), 3);
    }

    #[tokio::test]
    async fn test_defaults_on_backend_failure() {
        let (analyzer, _) = analyzer(MockGenerator::new());

        let analysis = analyzer.analyze("Original text of the page.").await;
        assert_eq!(analysis.tone, ToneScores::default());
        assert!(analysis.tags.is_empty());
        assert_eq!(analysis.summary, "Original text of the page.");
    }

    #[tokio::test]
    async fn test_defaults_on_non_json_and_oversized() {
        let oversized = format!("{{\"tags\": [\"{}\"]}}", "x".repeat(100_001));
        let (analyzer, _) = analyzer(
            MockGenerator::new()
                .with_response(GenerationTask::Tone, "The text seems quite neutral to me.")
                .with_response(GenerationTask::Tags, oversized)
                .with_response(GenerationTask::Summary, r#"{"summary": 42}"#),
        );

        let analysis = analyzer.analyze("Text").await;
        assert_eq!(analysis.tone, ToneScores::default());
        assert!(analysis.tags.is_empty());
        assert_eq!(analysis.summary, "Text");
    }

    #[tokio::test]
    async fn test_scores_clamped_and_missing_default() {
        let (analyzer, _) = analyzer(
            MockGenerator::new().with_response(GenerationTask::Tone, r#"{"neutralityScore": 7.5}"#),
        );

        let tone = analyzer.tone("Text").await;
        assert_eq!(tone.neutrality, 1.0);
        assert_eq!(tone.sentiment, NEUTRAL_SCORE);
    }

    #[tokio::test]
    async fn test_sample_is_capped() {
        let (analyzer, ai) = analyzer(MockGenerator::new());
        let text = "word ".repeat(5_000);

        analyzer.tone(&text).await;
        let calls = ai.calls();
        assert!(calls[0].prompt.len() < 3_200);
    }

    #[test]
    fn test_fallback_summary_truncates() {
        let text = "a".repeat(500);
        let summary = fallback_summary(&text);
        assert_eq!(summary.len(), 303);
        assert!(summary.ends_with("..."));
        assert_eq!(fallback_summary("  short\n text "), "short text");
    }
}
