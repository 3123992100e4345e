//! Corpus-level statistics and quality assessment types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::source::SourceType;

/// Min/max/average of one score over the source set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

impl ScoreRange {
    /// Compute the range of a set of scores. Empty input yields all zeros.
    pub fn of(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }

        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = scores.iter().sum::<f64>() / scores.len() as f64;

        Self { min, max, average }
    }

    /// Distance between the highest and lowest score.
    pub fn spread(&self) -> f64 {
        self.max - self.min
    }
}

/// Statistics over the validated source set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusMetrics {
    pub neutrality: ScoreRange,
    pub sentiment: ScoreRange,
    pub credibility: ScoreRange,

    /// Normalized spread of neutrality scores (0.0 to 1.0)
    pub diversity_score: f64,

    /// Whether the set represents more than one side
    pub balanced_perspectives: bool,

    /// Declared source types and how often each occurs
    pub source_type_histogram: BTreeMap<SourceType, usize>,
}

impl CorpusMetrics {
    /// Number of sources the metrics were computed over.
    pub fn source_count(&self) -> usize {
        self.source_type_histogram.values().sum()
    }

    /// Number of distinct declared source types.
    pub fn distinct_types(&self) -> usize {
        self.source_type_histogram.len()
    }
}

/// Coarse quality label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityRating {
    Low,
    Medium,
    High,
}

impl QualityRating {
    /// Rate a quality score: `High` above 0.7, `Medium` above 0.4.
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            Self::High
        } else if score > 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for QualityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Weighted quality rating of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAssessment {
    /// Always within [0, 1]
    pub quality_score: f64,

    /// Human-readable reasons, in factor order
    pub factors: Vec<String>,
    pub rating: QualityRating,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_range_empty_is_zero() {
        assert_eq!(ScoreRange::of(&[]), ScoreRange::default());
    }

    #[test]
    fn test_score_range() {
        let range = ScoreRange::of(&[0.2, 0.8, 0.5]);
        assert_eq!(range.min, 0.2);
        assert_eq!(range.max, 0.8);
        assert!((range.average - 0.5).abs() < 1e-9);
        assert!((range.spread() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(QualityRating::from_score(0.71), QualityRating::High);
        assert_eq!(QualityRating::from_score(0.7), QualityRating::Medium);
        assert_eq!(QualityRating::from_score(0.41), QualityRating::Medium);
        assert_eq!(QualityRating::from_score(0.4), QualityRating::Low);
        assert_eq!(QualityRating::from_score(0.0), QualityRating::Low);
    }

    #[test]
    fn test_histogram_serializes_with_type_keys() {
        let mut metrics = CorpusMetrics::default();
        metrics
            .source_type_histogram
            .insert(SourceType::Government, 2);
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["sourceTypeHistogram"]["government"], 2);
        assert_eq!(metrics.source_count(), 2);
    }
}
