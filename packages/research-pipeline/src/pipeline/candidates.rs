//! Candidate extraction: one generative call listing sources for an answer.

use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ai::schema::output_schema;
use crate::pipeline::decode::decode_json;
use crate::pipeline::prompts::{format_candidates_prompt, CANDIDATES_SYSTEM};
use crate::traits::ai::{generate, GenerationRequest, GenerationTask, GenerativeBackend};
use crate::types::config::PipelineConfig;
use crate::types::source::{unit_score, CandidateSource, SourceType, NEUTRAL_SCORE};

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct CandidatesResponse {
    #[serde(default)]
    neutrality_score: Option<f64>,
    #[serde(default)]
    persuasion_score: Option<f64>,
    #[serde(default)]
    sources: Vec<CandidateEntry>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct CandidateEntry {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    source_type: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

impl CandidateEntry {
    /// Drop entries with no usable URL. Missing confidence counts as zero.
    fn into_candidate(self) -> Option<CandidateSource> {
        let url = self.url?.trim().to_string();
        if url.is_empty() {
            return None;
        }

        Some(CandidateSource {
            url,
            title: self.title.unwrap_or_default().trim().to_string(),
            snippet: self.snippet.unwrap_or_default().trim().to_string(),
            domain: self.domain.unwrap_or_default().trim().to_lowercase(),
            source_type: self
                .source_type
                .as_deref()
                .map(SourceType::parse)
                .unwrap_or_default(),
            confidence: self.confidence.map_or(0.0, unit_score),
        })
    }
}

/// Candidates plus the generator's read on the answer's tone.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    pub neutrality: f64,
    pub persuasion: f64,
    pub candidates: Vec<CandidateSource>,
}

impl Default for CandidateSet {
    fn default() -> Self {
        Self {
            neutrality: NEUTRAL_SCORE,
            persuasion: NEUTRAL_SCORE,
            candidates: Vec::new(),
        }
    }
}

/// Asks the generator for sources and filters them by confidence.
#[derive(Clone)]
pub struct CandidateExtractor {
    ai: Arc<dyn GenerativeBackend>,
    config: Arc<PipelineConfig>,
}

impl CandidateExtractor {
    pub fn new(ai: Arc<dyn GenerativeBackend>, config: Arc<PipelineConfig>) -> Self {
        Self { ai, config }
    }

    /// Extract candidates for `answer`. Never fails; see [`CandidateSet::default`].
    pub async fn extract(&self, question: &str, answer: &str) -> CandidateSet {
        let request = GenerationRequest::new(
            GenerationTask::Candidates,
            &self.config.model,
            CANDIDATES_SYSTEM,
            format_candidates_prompt(
                question,
                answer,
                self.config.min_candidates,
                self.config.max_candidates,
            ),
        )
        .with_schema(output_schema::<CandidatesResponse>())
        .with_max_output_tokens(self.config.max_output_tokens)
        .with_timeout(self.config.generation_timeout());

        let raw = match generate(self.ai.as_ref(), &request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Candidate call failed, continuing with no candidates");
                return CandidateSet::default();
            }
        };

        let response: CandidatesResponse =
            match decode_json(&raw, self.config.max_response_chars) {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, "Malformed candidate response, continuing with no candidates");
                    return CandidateSet::default();
                }
            };

        let proposed = response.sources.len();
        let candidates = self.filter(
            response
                .sources
                .into_iter()
                .filter_map(CandidateEntry::into_candidate),
        );

        info!(
            proposed,
            kept = candidates.len(),
            threshold = self.config.confidence_threshold,
            "Candidates extracted"
        );

        CandidateSet {
            neutrality: response.neutrality_score.map_or(NEUTRAL_SCORE, unit_score),
            persuasion: response.persuasion_score.map_or(NEUTRAL_SCORE, unit_score),
            candidates,
        }
    }

    /// Keep confident candidates, capped at `max_candidates`.
    fn filter(&self, candidates: impl Iterator<Item = CandidateSource>) -> Vec<CandidateSource> {
        candidates
            .filter(|c| {
                let keep = c.confidence >= self.config.confidence_threshold;
                if !keep {
                    debug!(url = %c.url, confidence = c.confidence, "Dropping low-confidence candidate");
                }
                keep
            })
            .take(self.config.max_candidates)
            .collect()
    }
}
