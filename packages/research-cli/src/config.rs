use anyhow::{Context, Result};
use dotenvy::dotenv;
use research_pipeline::security::SecretString;
use research_pipeline::PipelineConfig;
use std::env;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: SecretString,
    pub openai_base_url: Option<String>,
    pub model: Option<String>,
    pub analysis_model: Option<String>,
    pub confidence_threshold: Option<f64>,
    pub max_concurrent_fetches: Option<usize>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let openai_api_key = SecretString::new(
            env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
        );
        if openai_api_key.is_empty() {
            anyhow::bail!("OPENAI_API_KEY must not be empty");
        }

        Ok(Self {
            openai_api_key,
            openai_base_url: env::var("OPENAI_BASE_URL").ok(),
            model: env::var("RESEARCH_MODEL").ok(),
            analysis_model: env::var("RESEARCH_ANALYSIS_MODEL").ok(),
            confidence_threshold: parse_var("RESEARCH_CONFIDENCE_THRESHOLD")?,
            max_concurrent_fetches: parse_var("RESEARCH_MAX_CONCURRENT_FETCHES")?,
        })
    }

    /// Pipeline configuration from the environment. CLI flags are applied on top.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(model) = &self.analysis_model {
            config = config.with_analysis_model(model);
        }
        if let Some(threshold) = self.confidence_threshold {
            config = config.with_confidence_threshold(threshold);
        }
        if let Some(max) = self.max_concurrent_fetches {
            config = config.with_max_concurrent_fetches(max);
        }
        config
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be a valid number")),
        _ => Ok(None),
    }
}
