//! Research pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Answer generation and candidate extraction
//! - Validation (canonicalize, guard, probe, fetch)
//! - Per-source analysis and credibility scoring
//! - Curated fallback sources
//! - Corpus metrics, quality rating and bias insight

pub mod analyze;
pub mod candidates;
pub mod canonicalize;
pub mod credibility;
pub mod decode;
pub mod enrich;
pub mod fallback;
pub mod fetch;
pub mod insight;
pub mod metrics;
pub mod orchestrator;
pub mod probe;
pub mod prompts;
pub mod quality;

pub use analyze::{fallback_summary, ContentAnalysis, ContentAnalyzer, ToneScores};
pub use candidates::{CandidateExtractor, CandidateSet};
pub use canonicalize::{canonicalize, CanonicalUrl};
pub use credibility::CredibilityScorer;
pub use decode::decode_json;
pub use enrich::SourceEnricher;
pub use fallback::{FallbackSourceProvider, Topic};
pub use fetch::{ContentFetcher, FetchedContent};
pub use insight::{fallback_insight, BiasInsightGenerator, InsightContext};
pub use metrics::{aggregate, balanced_perspectives, diversity_score};
pub use orchestrator::{ResearchPipeline, APOLOGY_ANSWER};
pub use probe::{LivenessProber, ProbeOutcome};
pub use quality::assess;
