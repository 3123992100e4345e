//! The aggregate result of one pipeline invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::insight::BiasInsight;
use super::metrics::{CorpusMetrics, QualityAssessment};
use super::source::{ContentOrigin, ValidatedSource};

/// State-machine stages of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Init,
    GetAnswer,
    ExtractCandidates,
    ValidateEnrich,
    FallbackSources,
    Aggregate,
    BiasInsight,
    Done,
    /// Terminal stage of a run that hit an unhandled error
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Init => "INIT",
            Self::GetAnswer => "GET_ANSWER",
            Self::ExtractCandidates => "EXTRACT_CANDIDATES",
            Self::ValidateEnrich => "VALIDATE_ENRICH",
            Self::FallbackSources => "FALLBACK_SOURCES",
            Self::Aggregate => "AGGREGATE",
            Self::BiasInsight => "BIAS_INSIGHT",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

/// Everything one invocation produced. Built once and handed to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResult {
    pub prompt: String,

    /// Generated answer to the prompt
    pub summary: String,
    pub neutrality_score: f64,
    pub persuasion_score: f64,
    pub sources: Vec<ValidatedSource>,
    pub corpus_metrics: CorpusMetrics,
    pub quality_assessment: QualityAssessment,
    pub bias_insight: BiasInsight,

    /// True when curated sources or the terminal fallback were used
    pub fallback_used: bool,

    /// Stages visited, in order
    pub stages: Vec<Stage>,
    pub completed_at: DateTime<Utc>,
}

impl ResearchResult {
    /// Sources that were fetched and analyzed directly.
    pub fn verified_sources(&self) -> impl Iterator<Item = &ValidatedSource> {
        self.sources
            .iter()
            .filter(|s| s.content_origin == ContentOrigin::DirectFetch)
    }

    /// Whether the run ended in the terminal fallback.
    pub fn failed(&self) -> bool {
        self.stages.last() == Some(&Stage::Failed)
    }
}
