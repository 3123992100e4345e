//! Research CLI
//!
//! Runs one research pipeline invocation and prints the result as JSON on
//! stdout. Logs go to stderr; set `RUST_LOG` to adjust verbosity.

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use research_pipeline::ai::OpenAI;
use research_pipeline::backends::ReqwestBackend;
use research_pipeline::ResearchPipeline;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "research", about = "Answer a question with validated sources")]
struct Args {
    /// Question to research
    prompt: String,

    /// Model for the answer, candidate and insight calls
    #[arg(long)]
    model: Option<String>,

    /// Model for per-source analysis calls
    #[arg(long)]
    analysis_model: Option<String>,

    /// Minimum candidate confidence (0.0 to 1.0)
    #[arg(long)]
    confidence_threshold: Option<f64>,

    /// Sources enriched concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Allow candidate URLs on private or loopback hosts
    #[arg(long)]
    allow_private_hosts: bool,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,research_pipeline=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let mut pipeline_config = config.pipeline_config();
    if let Some(model) = args.model {
        pipeline_config = pipeline_config.with_model(model);
    }
    if let Some(model) = args.analysis_model {
        pipeline_config = pipeline_config.with_analysis_model(model);
    }
    if let Some(threshold) = args.confidence_threshold {
        pipeline_config = pipeline_config.with_confidence_threshold(threshold);
    }
    if let Some(concurrency) = args.concurrency {
        pipeline_config = pipeline_config.with_max_concurrent_fetches(concurrency);
    }
    if args.allow_private_hosts {
        pipeline_config = pipeline_config.with_block_private_hosts(false);
    }

    let mut ai = OpenAI::new(config.openai_api_key.expose());
    if let Some(base_url) = &config.openai_base_url {
        ai = ai.with_base_url(base_url);
    }
    let http = ReqwestBackend::new().context("Failed to create HTTP backend")?;

    tracing::info!(
        model = %pipeline_config.model,
        analysis_model = %pipeline_config.analysis_model,
        threshold = pipeline_config.confidence_threshold,
        "Starting research run"
    );

    let pipeline = ResearchPipeline::new(Arc::new(ai), Arc::new(http), pipeline_config);
    let result = pipeline.run(&args.prompt).await;

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .context("Failed to serialize result")?;
    println!("{json}");

    Ok(())
}
