//! Source enrichment: turns untrusted candidates into validated sources.
//!
//! Per candidate: canonicalize, guard, probe, fetch, analyze, score. A
//! candidate whose URL fails canonicalization or the host guard is dropped.
//! A candidate that is unreachable or cannot be fetched is kept, degraded to
//! the generator's own description and marked unverified.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use indexmap::IndexSet;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{SourceError, SourceResult};
use crate::pipeline::analyze::ContentAnalyzer;
use crate::pipeline::canonicalize::{canonicalize, CanonicalUrl};
use crate::pipeline::credibility::CredibilityScorer;
use crate::pipeline::fetch::ContentFetcher;
use crate::pipeline::probe::LivenessProber;
use crate::security::HostGuard;
use crate::traits::ai::GenerativeBackend;
use crate::traits::http::HttpBackend;
use crate::types::config::PipelineConfig;
use crate::types::source::{CandidateSource, ContentOrigin, ValidatedSource, NEUTRAL_SCORE};

/// Wires prober, fetcher, analyzer and scorer together.
#[derive(Clone)]
pub struct SourceEnricher {
    guard: HostGuard,
    prober: LivenessProber,
    fetcher: ContentFetcher,
    analyzer: ContentAnalyzer,
    scorer: CredibilityScorer,
    config: Arc<PipelineConfig>,
}

impl SourceEnricher {
    pub fn new(
        ai: Arc<dyn GenerativeBackend>,
        http: Arc<dyn HttpBackend>,
        config: Arc<PipelineConfig>,
    ) -> Self {
        Self {
            guard: HostGuard::new(),
            prober: LivenessProber::new(http.clone(), config.probe_timeout()),
            fetcher: ContentFetcher::new(http, &config),
            analyzer: ContentAnalyzer::new(ai, config.clone()),
            scorer: CredibilityScorer::new(config.credibility.clone()),
            config,
        }
    }

    /// Replace the host guard.
    pub fn with_guard(mut self, guard: HostGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Enrich all candidates through a fixed number of slots.
    ///
    /// At most `max_concurrent_fetches` enrichments are in flight. A slow
    /// candidate holds only its own slot; a freed slot waits `batch_pause`
    /// before taking the next candidate. Output follows input order.
    pub async fn enrich_all(&self, candidates: Vec<CandidateSource>) -> Vec<ValidatedSource> {
        let accepted = self.admit(candidates);
        let slots = self.config.max_concurrent_fetches.max(1);
        let pause = self.config.batch_pause();

        let sources: Vec<ValidatedSource> = stream::iter(accepted.into_iter().enumerate())
            .map(|(i, (url, candidate))| async move {
                if i >= slots && !pause.is_zero() {
                    tokio::time::sleep(pause).await;
                }
                debug!(index = i, url = %url, "Enriching candidate");
                self.enrich(&url, &candidate).await
            })
            .buffered(slots)
            .collect()
            .await;

        let verified = sources.iter().filter(|s| s.verified).count();
        info!(
            total = sources.len(),
            verified,
            unverified = sources.len() - verified,
            slots,
            "Enrichment complete"
        );

        sources
    }

    /// Canonicalize, guard and dedupe. Rejected candidates are dropped here.
    fn admit(&self, candidates: Vec<CandidateSource>) -> Vec<(CanonicalUrl, CandidateSource)> {
        let mut seen = HashSet::new();

        candidates
            .into_iter()
            .filter_map(|candidate| match self.validate(&candidate.url) {
                Ok(url) => Some((url, candidate)),
                Err(e) => {
                    warn!(url = %candidate.url, error = %e, "Dropping candidate");
                    None
                }
            })
            .filter(|(url, _)| {
                let first = seen.insert(url.as_str().to_string());
                if !first {
                    debug!(url = %url, "Duplicate candidate skipped");
                }
                first
            })
            .collect()
    }

    fn validate(&self, raw: &str) -> SourceResult<CanonicalUrl> {
        let url = canonicalize(raw)?;
        if self.config.block_private_hosts {
            self.guard.check(url.as_url()).map_err(SourceError::Blocked)?;
        }
        Ok(url)
    }

    /// Enrich one admitted candidate. Never drops it.
    async fn enrich(&self, url: &CanonicalUrl, candidate: &CandidateSource) -> ValidatedSource {
        let probe = self.prober.probe(url).await;
        if !probe.live {
            let reason = SourceError::Unreachable {
                url: url.to_string(),
                status: probe.status,
            };
            warn!(error = %reason, "Source unreachable, using generator description");
            return self.degraded(url, candidate);
        }

        let content = match self.fetcher.fetch(url).await {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "Source fetch failed, using generator description");
                return self.degraded(url, candidate);
            }
        };

        let analysis = self.analyzer.analyze(&content.text).await;
        let domain = url.domain();

        ValidatedSource {
            url: url.to_string(),
            title: content
                .title
                .unwrap_or_else(|| candidate.title.trim().to_string()),
            excerpt: analysis.summary,
            tags: analysis.tags,
            neutrality_score: analysis.tone.neutrality,
            sentiment_score: analysis.tone.sentiment,
            credibility_score: self.scorer.score(&domain, candidate.source_type),
            domain,
            source_type: candidate.source_type,
            verified: true,
            content_origin: ContentOrigin::DirectFetch,
            last_verified_at: Utc::now(),
        }
    }

    /// Unverified source built from the generator's own description.
    fn degraded(&self, url: &CanonicalUrl, candidate: &CandidateSource) -> ValidatedSource {
        let domain = url.domain();
        let base = self.scorer.score(&domain, candidate.source_type);
        let credibility =
            (base - self.config.unverified_penalty).max(self.config.unverified_floor);

        ValidatedSource {
            url: url.to_string(),
            title: candidate.title.trim().to_string(),
            excerpt: candidate.description().to_string(),
            tags: IndexSet::new(),
            neutrality_score: NEUTRAL_SCORE,
            sentiment_score: NEUTRAL_SCORE,
            domain,
            source_type: candidate.source_type,
            credibility_score: credibility,
            verified: false,
            content_origin: ContentOrigin::AiDescription,
            last_verified_at: Utc::now(),
        }
    }
}
