//! Configuration types for the research pipeline.
//!
//! Every tunable the pipeline uses lives here and is passed in at
//! construction. There are no module-level knobs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one research pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Model used for the answer, candidate and insight calls.
    pub model: String,

    /// Model used for per-source analysis calls.
    ///
    /// These run three times per fetched source, so a cheaper model is
    /// usually a good fit. Default: same family as `model`.
    pub analysis_model: String,

    /// Token cap passed with every generative request.
    pub max_output_tokens: Option<u32>,

    /// Timeout for each generative call in milliseconds.
    pub generation_timeout_ms: u64,

    /// Minimum candidate confidence to survive extraction (0.0 to 1.0).
    ///
    /// Primary defense against hallucinated URLs. Default: 0.7.
    pub confidence_threshold: f64,

    /// Candidates requested from the generator (lower bound).
    pub min_candidates: usize,

    /// Candidates kept after filtering (upper bound).
    pub max_candidates: usize,

    /// Liveness probe timeout in milliseconds.
    pub probe_timeout_ms: u64,

    /// Full fetch timeout in milliseconds.
    pub fetch_timeout_ms: u64,

    /// Retries allowed after an HTTP 403. Default: 1.
    pub max_forbidden_retries: u32,

    /// Delay before retrying a 403 in milliseconds.
    pub forbidden_retry_delay_ms: u64,

    /// Text fragments shorter than this are treated as boilerplate.
    pub min_fragment_chars: usize,

    /// Extracted text shorter than this is an extraction failure.
    pub min_content_chars: usize,

    /// Extracted text is truncated to this many characters.
    pub max_content_chars: usize,

    /// Characters of source text sent to each analysis call.
    pub analysis_sample_chars: usize,

    /// Generative payloads longer than this are rejected unparsed.
    pub max_response_chars: usize,

    /// Maximum tags kept per source.
    pub max_tags: usize,

    /// Enrichment slots (concurrent enrichments).
    pub max_concurrent_fetches: usize,

    /// Pause before a freed enrichment slot takes its next candidate, in milliseconds.
    pub batch_pause_ms: u64,

    /// Credibility subtracted from sources that could not be fetched.
    pub unverified_penalty: f64,

    /// Lowest credibility an unverified source can be penalized to.
    pub unverified_floor: f64,

    /// Credibility assigned to curated fallback sources.
    pub predefined_credibility: f64,

    /// Reject candidate URLs pointing at private, loopback or metadata hosts.
    pub block_private_hosts: bool,

    /// Credibility scoring tables.
    #[serde(default)]
    pub credibility: CredibilityWeights,

    /// Quality factor weights.
    #[serde(default)]
    pub quality: QualityWeights,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            analysis_model: "gpt-4o-mini".to_string(),
            max_output_tokens: Some(2048),
            generation_timeout_ms: 60_000,
            confidence_threshold: 0.7,
            min_candidates: 2,
            max_candidates: 6,
            probe_timeout_ms: 6_000,
            fetch_timeout_ms: 10_000,
            max_forbidden_retries: 1,
            forbidden_retry_delay_ms: 1_000,
            min_fragment_chars: 50,
            min_content_chars: 100,
            max_content_chars: 8_000,
            analysis_sample_chars: 3_000,
            max_response_chars: 100_000,
            max_tags: 8,
            max_concurrent_fetches: 3,
            batch_pause_ms: 500,
            unverified_penalty: 0.3,
            unverified_floor: 0.2,
            predefined_credibility: 0.8,
            block_private_hosts: true,
            credibility: CredibilityWeights::default(),
            quality: QualityWeights::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the main model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the analysis model.
    pub fn with_analysis_model(mut self, model: impl Into<String>) -> Self {
        self.analysis_model = model.into();
        self
    }

    /// Set the candidate confidence threshold.
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the enrichment concurrency (at least 1).
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    /// Set the number of 403 retries.
    pub fn with_forbidden_retries(mut self, retries: u32) -> Self {
        self.max_forbidden_retries = retries;
        self
    }

    /// Set the pause before a freed slot is reused.
    pub fn with_batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause_ms = pause.as_millis() as u64;
        self
    }

    /// Set the delay before a 403 retry.
    pub fn with_forbidden_retry_delay(mut self, delay: Duration) -> Self {
        self.forbidden_retry_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Allow or block private hosts.
    pub fn with_block_private_hosts(mut self, block: bool) -> Self {
        self.block_private_hosts = block;
        self
    }

    /// Configuration tuned for tests: no sleeps, short timeouts.
    pub fn for_testing() -> Self {
        Self {
            generation_timeout_ms: 2_000,
            probe_timeout_ms: 500,
            fetch_timeout_ms: 500,
            forbidden_retry_delay_ms: 1,
            batch_pause_ms: 0,
            ..Self::default()
        }
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn forbidden_retry_delay(&self) -> Duration {
        Duration::from_millis(self.forbidden_retry_delay_ms)
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }
}

/// Credibility scoring tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredibilityWeights {
    /// Score for domains matching no table entry.
    pub base: f64,
    pub edu: f64,
    pub gov: f64,
    pub org: f64,
    pub com: f64,

    /// Replaces `com` for commercial domains on the news allowlist.
    pub established_news: f64,

    /// Commercial domains of established news outlets.
    pub news_allowlist: Vec<String>,

    /// Floor for `academic` and `scientific_journal` sources.
    pub academic_floor: f64,
    pub government_floor: f64,
    pub established_news_floor: f64,

    /// Floor for `news` and `organization` sources.
    pub news_floor: f64,
    pub general_floor: f64,
}

impl Default for CredibilityWeights {
    fn default() -> Self {
        Self {
            base: 0.5,
            edu: 0.9,
            gov: 0.85,
            org: 0.7,
            com: 0.6,
            established_news: 0.8,
            news_allowlist: [
                "nytimes.com",
                "washingtonpost.com",
                "wsj.com",
                "reuters.com",
                "apnews.com",
                "bbc.com",
                "bbc.co.uk",
                "theguardian.com",
                "bloomberg.com",
                "economist.com",
                "ft.com",
                "cnn.com",
                "nbcnews.com",
                "cbsnews.com",
                "abcnews.go.com",
                "latimes.com",
                "usatoday.com",
                "aljazeera.com",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            academic_floor: 0.9,
            government_floor: 0.85,
            established_news_floor: 0.8,
            news_floor: 0.7,
            general_floor: 0.5,
        }
    }
}

/// Weights for the six quality factors.
///
/// A factor contributes its full weight when its upper threshold is met and
/// half its weight for the lower tier where one exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityWeights {
    pub neutrality: f64,
    pub diversity: f64,
    pub perspective_range: f64,
    pub credibility: f64,
    pub type_variety: f64,
    pub source_count: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            neutrality: 0.25,
            diversity: 0.20,
            perspective_range: 0.15,
            credibility: 0.20,
            type_variety: 0.10,
            source_count: 0.10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_policy() {
        let config = PipelineConfig::default();
        assert_eq!(config.confidence_threshold, 0.7);
        assert_eq!(config.max_forbidden_retries, 1);
        assert_eq!(config.max_concurrent_fetches, 3);
        assert_eq!(config.max_content_chars, 8_000);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert!(config.probe_timeout() >= Duration::from_secs(5));
        assert!(config.probe_timeout() <= Duration::from_secs(8));
    }

    #[test]
    fn test_quality_weights_sum_to_one() {
        let w = QualityWeights::default();
        let sum = w.neutrality
            + w.diversity
            + w.perspective_range
            + w.credibility
            + w.type_variety
            + w.source_count;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_builder_clamps() {
        let config = PipelineConfig::new()
            .with_confidence_threshold(1.5)
            .with_max_concurrent_fetches(0);
        assert_eq!(config.confidence_threshold, 1.0);
        assert_eq!(config.max_concurrent_fetches, 1);
    }

    #[test]
    fn test_config_deserializes_without_weights() {
        let mut value = serde_json::to_value(PipelineConfig::default()).unwrap();
        let map = value.as_object_mut().unwrap();
        map.remove("credibility");
        map.remove("quality");

        let config: PipelineConfig = serde_json::from_value(value).unwrap();
        assert_eq!(config.credibility.edu, 0.9);
        assert_eq!(config.quality.neutrality, 0.25);
    }
}
