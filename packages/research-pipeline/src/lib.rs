//! Research Source Validation & Synthesis Pipeline
//!
//! Given a free-text prompt, the pipeline asks a generative backend for an
//! answer and a list of supporting sources, treats every suggested source as
//! untrusted, validates and fetches each one independently, scores what it
//! finds and produces a bias and quality assessment of the whole result.
//!
//! # Design Philosophy
//!
//! - Generated output is untrusted until decoded against its schema
//! - A source is never dropped for being unreachable, only downgraded
//! - No stage failure reaches the caller; a run always yields a result
//! - Library handles mechanics, the application supplies the backends
//!
//! # Usage
//!
//! ```rust,ignore
//! use research_pipeline::{PipelineConfig, ResearchPipeline};
//! use research_pipeline::ai::OpenAI;
//! use research_pipeline::backends::ReqwestBackend;
//!
//! let ai = Arc::new(OpenAI::from_env()?);
//! let http = Arc::new(ReqwestBackend::new()?);
//! let pipeline = ResearchPipeline::new(ai, http, PipelineConfig::default());
//!
//! let result = pipeline.run("Does intermittent fasting improve health?").await;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Backend abstractions (GenerativeBackend, HttpBackend)
//! - [`types`] - Sources, metrics, insight, result and configuration
//! - [`pipeline`] - Stages and the orchestrating state machine
//! - [`ai`] - Output schemas and the OpenAI backend
//! - [`backends`] - HTTP backend implementations
//! - [`security`] - SSRF protection and secret handling
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod backends;
pub mod error;
pub mod pipeline;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;
pub mod util;

// Re-export core types at crate root
pub use error::{
    GenerativeError, MalformedResponse, PipelineError, SecurityError, SourceError, TransportError,
};
pub use traits::{
    ai::{GenerationRequest, GenerationTask, GenerativeBackend},
    http::{HttpBackend, HttpMethod, HttpRequest, HttpResponse},
};
pub use types::{
    config::{CredibilityWeights, PipelineConfig, QualityWeights},
    insight::{BiasIndicators, BiasInsight, ConfidenceLevel, DiversityLabel},
    metrics::{CorpusMetrics, QualityAssessment, QualityRating, ScoreRange},
    result::{ResearchResult, Stage},
    source::{CandidateSource, ContentOrigin, SourceType, ValidatedSource},
};

pub use pipeline::ResearchPipeline;
pub use security::HostGuard;

// Re-export testing utilities
pub use testing::{MockGenerator, MockHttp};
