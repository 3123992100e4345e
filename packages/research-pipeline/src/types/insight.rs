//! Bias insight types.

use serde::{Deserialize, Serialize};

/// Confidence the insight generator has in its own assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Parse a free-form label. Unknown labels are `Medium`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }
}

/// How varied the source set looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiversityLabel {
    Low,
    Moderate,
    High,
}

impl DiversityLabel {
    /// Label a diversity score: `High` from 0.6, `Moderate` from 0.3.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.6 {
            Self::High
        } else if score >= 0.3 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Parse a free-form label, falling back to `fallback`.
    pub fn parse_or(label: &str, fallback: Self) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "moderate" | "medium" => Self::Moderate,
            "high" => Self::High,
            _ => fallback,
        }
    }
}

/// Signals of bias in the answer and its sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasIndicators {
    pub language_patterns: Vec<String>,
    pub perspective_gaps: Vec<String>,
    pub source_diversity: DiversityLabel,
}

/// Structured critical-thinking output for a research result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasInsight {
    pub overall_assessment: String,
    pub key_findings: Vec<String>,
    pub critical_questions: Vec<String>,
    pub research_suggestions: Vec<String>,
    pub confidence_level: ConfidenceLevel,
    pub bias_indicators: BiasIndicators,

    /// False when this is the deterministic fallback
    pub generated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_parse() {
        assert_eq!(ConfidenceLevel::parse("HIGH"), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::parse(" low "), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::parse("very sure"), ConfidenceLevel::Medium);
    }

    #[test]
    fn test_diversity_label() {
        assert_eq!(DiversityLabel::from_score(0.0), DiversityLabel::Low);
        assert_eq!(DiversityLabel::from_score(0.3), DiversityLabel::Moderate);
        assert_eq!(DiversityLabel::from_score(0.9), DiversityLabel::High);
        assert_eq!(
            DiversityLabel::parse_or("medium", DiversityLabel::Low),
            DiversityLabel::Moderate
        );
        assert_eq!(
            DiversityLabel::parse_or("???", DiversityLabel::High),
            DiversityLabel::High
        );
    }
}
