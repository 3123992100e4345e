//! Corpus statistics over validated sources. Pure functions.

use std::collections::BTreeMap;

use crate::types::metrics::{CorpusMetrics, ScoreRange};
use crate::types::source::ValidatedSource;

/// Variance is scaled by this before capping at 1.
const DIVERSITY_SCALE: f64 = 5.0;

/// Compute all corpus metrics. Empty input yields the zeroed default.
pub fn aggregate(sources: &[ValidatedSource]) -> CorpusMetrics {
    if sources.is_empty() {
        return CorpusMetrics::default();
    }

    let neutrality: Vec<f64> = sources.iter().map(|s| s.neutrality_score).collect();
    let sentiment: Vec<f64> = sources.iter().map(|s| s.sentiment_score).collect();
    let credibility: Vec<f64> = sources.iter().map(|s| s.credibility_score).collect();

    let mut histogram = BTreeMap::new();
    for source in sources {
        *histogram.entry(source.source_type).or_insert(0) += 1;
    }

    CorpusMetrics {
        neutrality: ScoreRange::of(&neutrality),
        sentiment: ScoreRange::of(&sentiment),
        credibility: ScoreRange::of(&credibility),
        diversity_score: diversity_score(&neutrality),
        balanced_perspectives: balanced_perspectives(&neutrality),
        source_type_histogram: histogram,
    }
}

/// `min(populationVariance × 5, 1)`; 0 for empty input.
pub fn diversity_score(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }

    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

    (variance * DIVERSITY_SCALE).min(1.0)
}

/// At least three sources, and either both extremes are present or at
/// least half sit in the middle band [0.4, 0.7].
pub fn balanced_perspectives(scores: &[f64]) -> bool {
    let n = scores.len();
    if n < 3 {
        return false;
    }

    let has_high = scores.iter().any(|&s| s > 0.7);
    let has_low = scores.iter().any(|&s| s < 0.4);
    let moderate = scores.iter().filter(|&&s| (0.4..=0.7).contains(&s)).count();

    (has_high && has_low) || moderate * 2 >= n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::source::{ContentOrigin, SourceType};
    use chrono::Utc;
    use indexmap::IndexSet;

    fn source(neutrality: f64, credibility: f64, source_type: SourceType) -> ValidatedSource {
        ValidatedSource {
            url: "https://example.org/".to_string(),
            title: String::new(),
            excerpt: String::new(),
            tags: IndexSet::new(),
            neutrality_score: neutrality,
            sentiment_score: 0.5,
            domain: "example.org".to_string(),
            source_type,
            credibility_score: credibility,
            verified: true,
            content_origin: ContentOrigin::DirectFetch,
            last_verified_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_is_zeroed() {
        let metrics = aggregate(&[]);
        assert_eq!(metrics, CorpusMetrics::default());
        assert_eq!(metrics.diversity_score, 0.0);
        assert!(!metrics.balanced_perspectives);
    }

    #[test]
    fn test_aggregate() {
        let sources = vec![
            source(0.2, 0.9, SourceType::Academic),
            source(0.8, 0.6, SourceType::News),
            source(0.5, 0.6, SourceType::News),
        ];

        let metrics = aggregate(&sources);
        assert_eq!(metrics.neutrality.min, 0.2);
        assert_eq!(metrics.neutrality.max, 0.8);
        assert!((metrics.credibility.average - 0.7).abs() < 1e-9);
        assert_eq!(metrics.source_type_histogram[&SourceType::News], 2);
        assert_eq!(metrics.source_count(), 3);
        assert!(metrics.balanced_perspectives);
    }

    #[test]
    fn test_diversity_score() {
        assert_eq!(diversity_score(&[0.5, 0.5, 0.5]), 0.0);
        // variance of {0.2, 0.8} is 0.09
        assert!((diversity_score(&[0.2, 0.8]) - 0.45).abs() < 1e-9);
        assert_eq!(diversity_score(&[0.0, 1.0, 0.0, 1.0]), 1.0);
    }

    #[test]
    fn test_balanced_perspectives() {
        assert!(!balanced_perspectives(&[0.1, 0.9]));
        assert!(balanced_perspectives(&[0.1, 0.9, 0.95]));
        assert!(balanced_perspectives(&[0.5, 0.6, 0.9, 0.95]));
        assert!(!balanced_perspectives(&[0.5, 0.8, 0.9, 0.95]));
        assert!(!balanced_perspectives(&[0.8, 0.9, 0.95]));
    }
}
