//! Bias insight: a critical-thinking read of the answer and its sources.

use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::ai::schema::output_schema;
use crate::pipeline::decode::decode_json;
use crate::pipeline::prompts::{format_insight_prompt, INSIGHT_SYSTEM};
use crate::traits::ai::{generate, GenerationRequest, GenerationTask, GenerativeBackend};
use crate::types::config::PipelineConfig;
use crate::types::insight::{BiasIndicators, BiasInsight, ConfidenceLevel, DiversityLabel};
use crate::types::metrics::CorpusMetrics;
use crate::types::source::ValidatedSource;

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct InsightResponse {
    #[serde(default)]
    overall_assessment: String,
    #[serde(default)]
    key_findings: Vec<String>,
    #[serde(default)]
    critical_questions: Vec<String>,
    #[serde(default)]
    research_suggestions: Vec<String>,
    #[serde(default)]
    confidence_level: Option<String>,
    #[serde(default)]
    bias_indicators: IndicatorsResponse,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct IndicatorsResponse {
    #[serde(default)]
    language_patterns: Vec<String>,
    #[serde(default)]
    perspective_gaps: Vec<String>,
    #[serde(default)]
    source_diversity: Option<String>,
}

/// Context the insight call is built from.
pub struct InsightContext<'a> {
    pub question: &'a str,
    pub summary: &'a str,
    pub neutrality: f64,
    pub persuasion: f64,
    pub sources: &'a [ValidatedSource],
    pub metrics: &'a CorpusMetrics,
}

/// Produces a [`BiasInsight`], generated or deterministic.
#[derive(Clone)]
pub struct BiasInsightGenerator {
    ai: Arc<dyn GenerativeBackend>,
    config: Arc<PipelineConfig>,
}

impl BiasInsightGenerator {
    pub fn new(ai: Arc<dyn GenerativeBackend>, config: Arc<PipelineConfig>) -> Self {
        Self { ai, config }
    }

    /// Generate an insight, falling back to [`fallback_insight`] on any failure.
    pub async fn generate(&self, ctx: &InsightContext<'_>) -> BiasInsight {
        let request = GenerationRequest::new(
            GenerationTask::BiasInsight,
            &self.config.model,
            INSIGHT_SYSTEM,
            format_insight_prompt(
                ctx.question,
                ctx.summary,
                ctx.neutrality,
                ctx.persuasion,
                ctx.sources,
            ),
        )
        .with_schema(output_schema::<InsightResponse>())
        .with_max_output_tokens(self.config.max_output_tokens)
        .with_timeout(self.config.generation_timeout());

        let raw = match generate(self.ai.as_ref(), &request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Insight call failed, using fallback insight");
                return fallback_insight(ctx.metrics);
            }
        };

        let response: InsightResponse = match decode_json(&raw, self.config.max_response_chars) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Malformed insight response, using fallback insight");
                return fallback_insight(ctx.metrics);
            }
        };

        if response.overall_assessment.trim().is_empty() {
            warn!("Insight response had no assessment, using fallback insight");
            return fallback_insight(ctx.metrics);
        }

        info!(
            findings = response.key_findings.len(),
            questions = response.critical_questions.len(),
            "Bias insight generated"
        );

        let derived = DiversityLabel::from_score(ctx.metrics.diversity_score);
        BiasInsight {
            overall_assessment: response.overall_assessment.trim().to_string(),
            key_findings: clean_list(response.key_findings),
            critical_questions: clean_list(response.critical_questions),
            research_suggestions: clean_list(response.research_suggestions),
            confidence_level: response
                .confidence_level
                .as_deref()
                .map_or(ConfidenceLevel::Medium, ConfidenceLevel::parse),
            bias_indicators: BiasIndicators {
                language_patterns: clean_list(response.bias_indicators.language_patterns),
                perspective_gaps: clean_list(response.bias_indicators.perspective_gaps),
                source_diversity: response
                    .bias_indicators
                    .source_diversity
                    .as_deref()
                    .map_or(derived, |label| DiversityLabel::parse_or(label, derived)),
            },
            generated: true,
        }
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Deterministic insight with generic critical-thinking guidance.
pub fn fallback_insight(metrics: &CorpusMetrics) -> BiasInsight {
    let to_strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    BiasInsight {
        overall_assessment: "An automated bias assessment is not available for this result. \
            Review the answer and its sources critically before relying on them."
            .to_string(),
        key_findings: to_strings(&[
            "Source verification status is shown for each source",
            "Credibility scores reflect domain and source type only",
        ]),
        critical_questions: to_strings(&[
            "Who produced each source, and what are their interests?",
            "Which perspectives on this topic are missing?",
            "Is the evidence presented recent and directly relevant?",
        ]),
        research_suggestions: to_strings(&[
            "Consult primary sources such as studies or official data",
            "Compare coverage of the topic across outlets with different viewpoints",
        ]),
        confidence_level: ConfidenceLevel::Low,
        bias_indicators: BiasIndicators {
            language_patterns: Vec::new(),
            perspective_gaps: Vec::new(),
            source_diversity: DiversityLabel::from_score(metrics.diversity_score),
        },
        generated: false,
    }
}
