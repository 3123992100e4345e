//! The research pipeline state machine.
//!
//! ```text
//! INIT → GET_ANSWER → EXTRACT_CANDIDATES → VALIDATE_ENRICH
//!   sources > 0:  AGGREGATE → BIAS_INSIGHT → DONE
//!   sources == 0: FALLBACK_SOURCES → AGGREGATE → DONE
//! ```
//!
//! Any error or panic escaping a stage ends the run in `FAILED` with a
//! direct answer and no sources. [`ResearchPipeline::run`] therefore always returns a
//! result.

use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{PipelineError, Result};
use crate::pipeline::candidates::CandidateExtractor;
use crate::pipeline::enrich::SourceEnricher;
use crate::pipeline::fallback::FallbackSourceProvider;
use crate::pipeline::insight::{fallback_insight, BiasInsightGenerator, InsightContext};
use crate::pipeline::metrics::aggregate;
use crate::pipeline::probe::LivenessProber;
use crate::pipeline::prompts::{ANSWER_SYSTEM, DIRECT_ANSWER_SYSTEM};
use crate::pipeline::quality::assess;
use crate::security::HostGuard;
use crate::traits::ai::{generate, GenerationRequest, GenerationTask, GenerativeBackend};
use crate::traits::http::HttpBackend;
use crate::types::config::PipelineConfig;
use crate::types::metrics::CorpusMetrics;
use crate::types::result::{ResearchResult, Stage};
use crate::types::source::NEUTRAL_SCORE;

/// Answer used when even the direct-answer call fails.
pub const APOLOGY_ANSWER: &str = "Sorry, an answer could not be produced for this question right \
now. Please try again later.";

/// One configured pipeline. Holds no per-run state, so a single instance can
/// serve concurrent runs.
#[derive(Clone)]
pub struct ResearchPipeline {
    ai: Arc<dyn GenerativeBackend>,
    config: Arc<PipelineConfig>,
    extractor: CandidateExtractor,
    enricher: SourceEnricher,
    fallback: FallbackSourceProvider,
    insight: BiasInsightGenerator,
}

impl ResearchPipeline {
    pub fn new(
        ai: Arc<dyn GenerativeBackend>,
        http: Arc<dyn HttpBackend>,
        config: PipelineConfig,
    ) -> Self {
        let config = Arc::new(config);
        let prober = LivenessProber::new(http.clone(), config.probe_timeout());

        Self {
            extractor: CandidateExtractor::new(ai.clone(), config.clone()),
            enricher: SourceEnricher::new(ai.clone(), http, config.clone()),
            fallback: FallbackSourceProvider::new(prober, config.predefined_credibility),
            insight: BiasInsightGenerator::new(ai.clone(), config.clone()),
            ai,
            config,
        }
    }

    /// Replace the host guard applied to candidate URLs.
    pub fn with_guard(mut self, guard: HostGuard) -> Self {
        self.enricher = self.enricher.with_guard(guard);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline for one prompt.
    pub async fn run(&self, prompt: &str) -> ResearchResult {
        let mut stages = vec![Stage::Init];
        info!(prompt_chars = prompt.len(), "Research run starting");

        let outcome = AssertUnwindSafe(self.try_run(prompt, &mut stages))
            .catch_unwind()
            .await;

        let failure = match outcome {
            Ok(Ok(result)) => {
                info!(
                    sources = result.sources.len(),
                    fallback_used = result.fallback_used,
                    rating = %result.quality_assessment.rating,
                    "Research run complete"
                );
                return result;
            }
            Ok(Err(e)) => e,
            Err(panic) => PipelineError::Panicked(panic_message(&panic)),
        };

        error!(error = %failure, stage = ?stages.last(), "Research run failed, using direct answer");
        self.failure_result(prompt, stages).await
    }

    async fn try_run(&self, prompt: &str, stages: &mut Vec<Stage>) -> Result<ResearchResult> {
        if prompt.trim().is_empty() {
            return Err(PipelineError::InvalidPrompt {
                reason: "prompt is empty".to_string(),
            });
        }

        enter(stages, Stage::GetAnswer);
        let answer = self.answer(prompt).await?;

        enter(stages, Stage::ExtractCandidates);
        let extracted = self.extractor.extract(prompt, &answer).await;

        enter(stages, Stage::ValidateEnrich);
        let mut sources = self.enricher.enrich_all(extracted.candidates).await;

        let fallback_used = sources.is_empty();
        if fallback_used {
            enter(stages, Stage::FallbackSources);
            sources = self.fallback.sources_for(prompt).await;
        }

        enter(stages, Stage::Aggregate);
        let metrics = aggregate(&sources);
        let quality = assess(extracted.neutrality, &metrics, &self.config.quality);

        let bias_insight = if fallback_used {
            fallback_insight(&metrics)
        } else {
            enter(stages, Stage::BiasInsight);
            self.insight
                .generate(&InsightContext {
                    question: prompt,
                    summary: &answer,
                    neutrality: extracted.neutrality,
                    persuasion: extracted.persuasion,
                    sources: &sources,
                    metrics: &metrics,
                })
                .await
        };

        enter(stages, Stage::Done);
        Ok(ResearchResult {
            prompt: prompt.to_string(),
            summary: answer,
            neutrality_score: extracted.neutrality,
            persuasion_score: extracted.persuasion,
            sources,
            corpus_metrics: metrics,
            quality_assessment: quality,
            bias_insight,
            fallback_used,
            stages: std::mem::take(stages),
            completed_at: Utc::now(),
        })
    }

    /// Free-text answer. The one generative call with no local fallback.
    async fn answer(&self, prompt: &str) -> Result<String> {
        let request = GenerationRequest::new(
            GenerationTask::Answer,
            &self.config.model,
            ANSWER_SYSTEM,
            prompt,
        )
        .with_max_output_tokens(self.config.max_output_tokens)
        .with_timeout(self.config.generation_timeout());

        let text = generate(self.ai.as_ref(), &request).await?;
        Ok(text.trim().to_string())
    }

    /// Terminal result after an unhandled stage error.
    async fn failure_result(&self, prompt: &str, mut stages: Vec<Stage>) -> ResearchResult {
        stages.push(Stage::Failed);

        let summary = if prompt.trim().is_empty() {
            APOLOGY_ANSWER.to_string()
        } else {
            self.direct_answer(prompt).await
        };

        let metrics = CorpusMetrics::default();
        ResearchResult {
            prompt: prompt.to_string(),
            summary,
            neutrality_score: NEUTRAL_SCORE,
            persuasion_score: NEUTRAL_SCORE,
            sources: Vec::new(),
            quality_assessment: assess(NEUTRAL_SCORE, &metrics, &self.config.quality),
            bias_insight: fallback_insight(&metrics),
            corpus_metrics: metrics,
            fallback_used: true,
            stages,
            completed_at: Utc::now(),
        }
    }

    async fn direct_answer(&self, prompt: &str) -> String {
        let request = GenerationRequest::new(
            GenerationTask::DirectAnswer,
            &self.config.model,
            DIRECT_ANSWER_SYSTEM,
            prompt,
        )
        .with_max_output_tokens(self.config.max_output_tokens)
        .with_timeout(self.config.generation_timeout());

        let outcome = AssertUnwindSafe(generate(self.ai.as_ref(), &request))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(text)) => text.trim().to_string(),
            Ok(Err(e)) => {
                warn!(error = %e, "Direct answer failed, using apology text");
                APOLOGY_ANSWER.to_string()
            }
            Err(panic) => {
                warn!(panic = %panic_message(&panic), "Direct answer panicked, using apology text");
                APOLOGY_ANSWER.to_string()
            }
        }
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn enter(stages: &mut Vec<Stage>, stage: Stage) {
    info!(stage = %stage, "Entering stage");
    stages.push(stage);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockGenerator, MockHttp};

    fn pipeline(ai: MockGenerator, http: MockHttp) -> ResearchPipeline {
        ResearchPipeline::new(
            Arc::new(ai),
            Arc::new(http),
            PipelineConfig::for_testing(),
        )
    }

    #[tokio::test]
    async fn test_blank_prompt_fails_without_calls() {
        let ai = Arc::new(MockGenerator::new());
        let pipeline = ResearchPipeline::new(
            ai.clone(),
            Arc::new(MockHttp::new()),
            PipelineConfig::for_testing(),
        );

        let result = pipeline.run("   ").await;
        assert!(result.failed());
        assert!(result.fallback_used);
        assert_eq!(result.summary, APOLOGY_ANSWER);
        assert_eq!(result.stages, vec![Stage::Init, Stage::Failed]);
        assert_eq!(ai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_answer_failure_uses_direct_answer() {
        let ai = MockGenerator::new()
            .fail(GenerationTask::Answer)
            .with_response(GenerationTask::DirectAnswer, "Short unverified answer.");

        let result = pipeline(ai, MockHttp::new()).run("Why is the sky blue?").await;
        assert!(result.failed());
        assert_eq!(result.summary, "Short unverified answer.");
        assert!(result.sources.is_empty());
        assert_eq!(result.neutrality_score, NEUTRAL_SCORE);
        assert!(!result.bias_insight.generated);
        assert_eq!(
            result.stages,
            vec![Stage::Init, Stage::GetAnswer, Stage::Failed]
        );
    }

    #[tokio::test]
    async fn test_apology_when_direct_answer_fails() {
        let ai = MockGenerator::new()
            .fail(GenerationTask::Answer)
            .fail(GenerationTask::DirectAnswer);

        let result = pipeline(ai, MockHttp::new()).run("Why is the sky blue?").await;
        assert_eq!(result.summary, APOLOGY_ANSWER);
    }

    #[tokio::test]
    async fn test_stage_panic_becomes_failed_result() {
        let ai = MockGenerator::new()
            .with_response(GenerationTask::Answer, "Rayleigh scattering.")
            .with_panic(GenerationTask::Candidates)
            .with_response(GenerationTask::DirectAnswer, "Short unverified answer.");

        let pipeline = pipeline(ai, MockHttp::new());
        let result = tokio::spawn(async move { pipeline.run("Why is the sky blue?").await })
            .await
            .expect("run must not propagate a panic");

        assert!(result.failed());
        assert!(result.fallback_used);
        assert!(result.sources.is_empty());
        assert_eq!(result.summary, "Short unverified answer.");
        assert_eq!(
            result.stages,
            vec![
                Stage::Init,
                Stage::GetAnswer,
                Stage::ExtractCandidates,
                Stage::Failed
            ]
        );
    }

    #[tokio::test]
    async fn test_direct_answer_panic_uses_apology() {
        let ai = MockGenerator::new()
            .with_panic(GenerationTask::Answer)
            .with_panic(GenerationTask::DirectAnswer);

        let result = pipeline(ai, MockHttp::new()).run("Why is the sky blue?").await;
        assert!(result.failed());
        assert_eq!(result.summary, APOLOGY_ANSWER);
    }

    #[tokio::test]
    async fn test_no_candidates_takes_fallback_branch() {
        let ai = MockGenerator::new()
            .with_response(GenerationTask::Answer, "Rayleigh scattering.")
            .with_response(GenerationTask::Candidates, r#"{"sources": []}"#);
        let http = MockHttp::new().with_page("https://www.wikipedia.org/", "<html></html>");

        let result = pipeline(ai, http).run("Why is the sky blue?").await;
        assert!(result.fallback_used);
        assert!(!result.failed());
        assert_eq!(
            result.stages,
            vec![
                Stage::Init,
                Stage::GetAnswer,
                Stage::ExtractCandidates,
                Stage::ValidateEnrich,
                Stage::FallbackSources,
                Stage::Aggregate,
                Stage::Done,
            ]
        );
        assert_eq!(result.sources.len(), 1);
        assert!(!result.bias_insight.generated);
    }
}
