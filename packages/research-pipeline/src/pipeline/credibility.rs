//! Credibility scoring from domain and declared source type.

use crate::types::config::CredibilityWeights;
use crate::types::source::SourceType;

const MIN_CREDIBILITY: f64 = 0.1;
const MAX_CREDIBILITY: f64 = 1.0;

/// Pure scorer over the configured weight tables.
#[derive(Debug, Clone, Default)]
pub struct CredibilityScorer {
    weights: CredibilityWeights,
}

impl CredibilityScorer {
    pub fn new(weights: CredibilityWeights) -> Self {
        Self { weights }
    }

    /// Combined score: the better of domain and type, within [0.1, 1].
    pub fn score(&self, domain: &str, source_type: SourceType) -> f64 {
        let combined = self.domain_score(domain).max(self.type_floor(source_type));
        if combined.is_finite() {
            combined.clamp(MIN_CREDIBILITY, MAX_CREDIBILITY)
        } else {
            MIN_CREDIBILITY
        }
    }

    /// Score from the domain alone.
    pub fn domain_score(&self, domain: &str) -> f64 {
        let domain = normalize_domain(domain);
        if domain.is_empty() {
            return self.weights.base;
        }

        let labels: Vec<&str> = domain.rsplit('.').collect();
        let tld = labels.first().copied().unwrap_or_default();
        let second = labels.get(1).copied().unwrap_or_default();

        // Country-code domains such as `gov.uk` or `ac.nz` carry the
        // category in the second-level label.
        let category = if tld.len() == 2 && labels.len() > 2 {
            second
        } else {
            tld
        };

        match category {
            "edu" | "ac" => self.weights.edu,
            "gov" | "mil" => self.weights.gov,
            "org" => self.weights.org,
            // Allowlisted outlets lift only the commercial tier.
            "com" | "co" if self.is_established_news(&domain) => self.weights.established_news,
            "com" | "co" => self.weights.com,
            _ => self.weights.base,
        }
    }

    /// Minimum score implied by the declared type.
    pub fn type_floor(&self, source_type: SourceType) -> f64 {
        match source_type {
            SourceType::Academic | SourceType::ScientificJournal => self.weights.academic_floor,
            SourceType::Government => self.weights.government_floor,
            SourceType::EstablishedNews => self.weights.established_news_floor,
            SourceType::News | SourceType::Organization => self.weights.news_floor,
            SourceType::General => self.weights.general_floor,
        }
    }

    fn is_established_news(&self, domain: &str) -> bool {
        self.weights.news_allowlist.iter().any(|entry| {
            domain == entry
                || domain
                    .strip_suffix(entry.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

fn normalize_domain(domain: &str) -> String {
    let lower = domain.trim().trim_end_matches('.').to_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> CredibilityScorer {
        CredibilityScorer::default()
    }

    #[test]
    fn test_suffix_table() {
        let s = scorer();
        assert_eq!(s.domain_score("mit.edu"), 0.9);
        assert_eq!(s.domain_score("www.cdc.gov"), 0.85);
        assert_eq!(s.domain_score("wikipedia.org"), 0.7);
        assert_eq!(s.domain_score("example.com"), 0.6);
        assert_eq!(s.domain_score("example.io"), 0.5);
        assert_eq!(s.domain_score(""), 0.5);
    }

    #[test]
    fn test_second_level_country_domains() {
        let s = scorer();
        assert_eq!(s.domain_score("nhs.gov.uk"), 0.85);
        assert_eq!(s.domain_score("ox.ac.uk"), 0.9);
        assert_eq!(s.domain_score("unimelb.edu.au"), 0.9);
        assert_eq!(s.domain_score("shop.co.uk"), 0.6);
        // A bare ccTLD has no second-level category.
        assert_eq!(s.domain_score("gov.uk"), 0.5);
    }

    #[test]
    fn test_news_allowlist() {
        let s = scorer();
        assert_eq!(s.domain_score("reuters.com"), 0.8);
        assert_eq!(s.domain_score("www.bbc.co.uk"), 0.8);
        assert_eq!(s.domain_score("edition.cnn.com"), 0.8);
        assert_eq!(s.domain_score("notreuters.com"), 0.6);
        // Outside the commercial tier the suffix table still applies.
        assert_eq!(s.domain_score("npr.org"), 0.7);
        assert_eq!(s.domain_score("pbs.org"), 0.7);
    }

    #[test]
    fn test_type_floor_raises_score() {
        let s = scorer();
        assert_eq!(s.score("randomblog.io", SourceType::Academic), 0.9);
        assert_eq!(s.score("randomblog.io", SourceType::News), 0.7);
        assert_eq!(s.score("mit.edu", SourceType::General), 0.9);
        assert_eq!(s.score("example.com", SourceType::General), 0.6);
    }

    #[test]
    fn test_score_is_clamped() {
        let s = CredibilityScorer::new(CredibilityWeights {
            base: -2.0,
            general_floor: -1.0,
            edu: 3.0,
            ..CredibilityWeights::default()
        });
        assert_eq!(s.score("unknown.xyz", SourceType::General), 0.1);
        assert_eq!(s.score("mit.edu", SourceType::General), 1.0);
    }
}
