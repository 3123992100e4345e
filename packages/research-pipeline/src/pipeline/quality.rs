//! Weighted quality rating of a research result.

use crate::types::config::QualityWeights;
use crate::types::metrics::{CorpusMetrics, QualityAssessment, QualityRating};

/// Full weight above the upper bound, half above the lower one.
fn tier(value: f64, upper: f64, lower: f64, weight: f64) -> Option<f64> {
    if value > upper {
        Some(weight)
    } else if value > lower {
        Some(weight / 2.0)
    } else {
        None
    }
}

/// Rate a result from the answer's neutrality and the corpus metrics.
pub fn assess(
    overall_neutrality: f64,
    metrics: &CorpusMetrics,
    weights: &QualityWeights,
) -> QualityAssessment {
    let mut score = 0.0;
    let mut factors = Vec::new();

    if let Some(w) = tier(overall_neutrality, 0.7, 0.5, weights.neutrality) {
        score += w;
        factors.push(if overall_neutrality > 0.7 {
            format!("Answer is highly neutral ({overall_neutrality:.2})")
        } else {
            format!("Answer is moderately neutral ({overall_neutrality:.2})")
        });
    }

    let diversity = metrics.diversity_score;
    if let Some(w) = tier(diversity, 0.7, 0.5, weights.diversity) {
        score += w;
        factors.push(if diversity > 0.7 {
            format!("High viewpoint diversity across sources ({diversity:.2})")
        } else {
            format!("Moderate viewpoint diversity across sources ({diversity:.2})")
        });
    }

    let range = metrics.neutrality.spread();
    if range > 0.3 {
        score += weights.perspective_range;
        factors.push(format!("Sources span a broad neutrality range ({range:.2})"));
    }

    let credibility = metrics.credibility.average;
    if let Some(w) = tier(credibility, 0.7, 0.5, weights.credibility) {
        score += w;
        factors.push(if credibility > 0.7 {
            format!("High average source credibility ({credibility:.2})")
        } else {
            format!("Moderate average source credibility ({credibility:.2})")
        });
    }

    let types = metrics.distinct_types();
    if types >= 3 {
        score += weights.type_variety;
        factors.push(format!("{types} distinct source types"));
    }

    let count = metrics.source_count();
    if count >= 3 {
        score += weights.source_count;
        factors.push(format!("{count} sources consulted"));
    }

    let quality_score = if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    };

    QualityAssessment {
        quality_score,
        factors,
        rating: QualityRating::from_score(quality_score),
    }
}
