//! Source types: untrusted candidates and validated sources.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared kind of a source.
///
/// Parsed leniently from whatever label the generator used; anything
/// unrecognised is `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum SourceType {
    Academic,
    ScientificJournal,
    Government,
    EstablishedNews,
    News,
    Organization,
    General,
}

impl SourceType {
    /// Map a free-form label to a source type.
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "academic" | "university" | "education" | "educational" => Self::Academic,
            "scientific_journal" | "journal" | "scientific" | "peer_reviewed" | "research" => {
                Self::ScientificJournal
            }
            "government" | "gov" | "governmental" | "public_agency" => Self::Government,
            "established_news" | "major_news" => Self::EstablishedNews,
            "news" | "media" | "newspaper" | "magazine" => Self::News,
            "organization" | "organisation" | "nonprofit" | "ngo" => Self::Organization,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::ScientificJournal => "scientific_journal",
            Self::Government => "government",
            Self::EstablishedNews => "established_news",
            Self::News => "news",
            Self::Organization => "organization",
            Self::General => "general",
        }
    }
}

impl Default for SourceType {
    fn default() -> Self {
        Self::General
    }
}

impl From<String> for SourceType {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<&str> for SourceType {
    fn from(label: &str) -> Self {
        Self::parse(label)
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unvalidated source suggestion from the generator.
///
/// Never trusted and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSource {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub domain: String,
    pub source_type: SourceType,

    /// Generator's confidence that the source exists (0.0 to 1.0)
    pub confidence: f64,
}

impl CandidateSource {
    /// Create a candidate with minimal fields.
    pub fn new(url: impl Into<String>, confidence: f64) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            snippet: String::new(),
            domain: String::new(),
            source_type: SourceType::General,
            confidence,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// Set the declared source type.
    pub fn with_source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = source_type;
        self
    }

    /// Text the generator supplied to describe this source.
    pub fn description(&self) -> &str {
        if self.snippet.trim().is_empty() {
            self.title.trim()
        } else {
            self.snippet.trim()
        }
    }
}

/// Where a validated source's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentOrigin {
    /// Page was fetched and analyzed
    DirectFetch,
    /// Page could not be fetched; generator's description was used
    AiDescription,
    /// Curated fallback source
    Predefined,
}

/// A candidate that passed canonicalization and was enriched.
///
/// Every score is always populated; an unmeasured score is 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedSource {
    /// Canonical URL
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub tags: IndexSet<String>,

    /// 0 = strongly biased, 1 = strongly neutral
    pub neutrality_score: f64,

    /// 0 = negative extreme, 1 = positive extreme
    pub sentiment_score: f64,
    pub domain: String,
    pub source_type: SourceType,

    /// Always within [0.1, 1]
    pub credibility_score: f64,
    pub verified: bool,
    pub content_origin: ContentOrigin,
    pub last_verified_at: DateTime<Utc>,
}

/// Score used wherever a measurement is missing.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Clamp a score into [0, 1], replacing non-finite values with 0.5.
pub fn unit_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        NEUTRAL_SCORE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_type_parse_is_lenient() {
        assert_eq!(SourceType::parse("Government"), SourceType::Government);
        assert_eq!(
            SourceType::parse("scientific journal"),
            SourceType::ScientificJournal
        );
        assert_eq!(
            SourceType::parse("established-news"),
            SourceType::EstablishedNews
        );
        assert_eq!(SourceType::parse("nonprofit"), SourceType::Organization);
        assert_eq!(SourceType::parse("blog"), SourceType::General);
        assert_eq!(SourceType::parse(""), SourceType::General);
    }

    #[test]
    fn test_source_type_serde() {
        let json = serde_json::to_string(&SourceType::ScientificJournal).unwrap();
        assert_eq!(json, "\"scientific_journal\"");

        let parsed: SourceType = serde_json::from_str("\"University\"").unwrap();
        assert_eq!(parsed, SourceType::Academic);
    }

    #[test]
    fn test_candidate_description_falls_back_to_title() {
        let candidate = CandidateSource::new("https://example.com", 0.9).with_title("Example");
        assert_eq!(candidate.description(), "Example");

        let candidate = candidate.with_snippet("  A page about things.  ");
        assert_eq!(candidate.description(), "A page about things.");
    }

    #[test]
    fn test_unit_score() {
        assert_eq!(unit_score(1.4), 1.0);
        assert_eq!(unit_score(-0.2), 0.0);
        assert_eq!(unit_score(f64::NAN), NEUTRAL_SCORE);
        assert_eq!(unit_score(0.3), 0.3);
    }

    #[test]
    fn test_content_origin_serializes_snake_case() {
        let json = serde_json::to_string(&ContentOrigin::AiDescription).unwrap();
        assert_eq!(json, "\"ai_description\"");
    }
}
