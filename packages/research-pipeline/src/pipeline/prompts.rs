//! Prompt templates for every generative call.

use crate::types::source::ValidatedSource;

pub const ANSWER_SYSTEM: &str = "You are a careful research assistant. Answer the user's question \
accurately and even-handedly. Present the main perspectives where the topic is contested, \
distinguish evidence from opinion, and avoid persuasive framing.";

pub const CANDIDATES_SYSTEM: &str = "You identify real, publicly accessible web sources that support \
or challenge an answer. Only list a source if you are highly confident the exact URL exists. \
Omit any source you are unsure about; an empty list is better than an invented URL. \
Respond with JSON only.";

pub const TONE_SYSTEM: &str = "You rate the tone of a text. neutralityScore: 0 = strongly biased, \
1 = strongly neutral. sentimentScore: 0 = very negative, 1 = very positive. \
Respond with JSON only.";

pub const TAGS_SYSTEM: &str = "You label a text with short topical keywords (one to three words each). \
Respond with JSON only.";

pub const SUMMARY_SYSTEM: &str = "You summarize a text in two or three plain sentences without \
adding opinions. Respond with JSON only.";

pub const INSIGHT_SYSTEM: &str = "You help readers think critically about research results. \
Assess bias in the answer and its sources, point out missing perspectives, and suggest \
questions and further research. Respond with JSON only.";

pub const DIRECT_ANSWER_SYSTEM: &str = "You are a helpful assistant. Answer briefly and note that \
the answer could not be checked against external sources.";

/// Prompt asking for candidate sources and overall tone estimates.
pub fn format_candidates_prompt(question: &str, answer: &str, min: usize, max: usize) -> String {
    format!(
        "Question:\n{question}\n\nAnswer:\n{answer}\n\n\
         List between {min} and {max} sources relevant to this answer. For each give url, title, \
         snippet (one or two sentences describing the page), domain, sourceType (one of: academic, \
         scientific_journal, government, established_news, news, organization, general) and \
         confidence (0 to 1) that the URL exists exactly as written. Also rate the answer's \
         neutralityScore (0 = strongly biased, 1 = strongly neutral) and persuasionScore \
         (0 = purely informative, 1 = highly persuasive)."
    )
}

pub fn format_tone_prompt(text: &str) -> String {
    format!("Rate the tone of this text:\n\n{text}")
}

pub fn format_tags_prompt(text: &str, max_tags: usize) -> String {
    format!("Give at most {max_tags} keyword tags for this text:\n\n{text}")
}

pub fn format_summary_prompt(text: &str) -> String {
    format!("Summarize this text:\n\n{text}")
}

/// Prompt for the bias insight call, with every source rendered.
pub fn format_insight_prompt(
    question: &str,
    summary: &str,
    neutrality: f64,
    persuasion: f64,
    sources: &[ValidatedSource],
) -> String {
    format!(
        "Question:\n{question}\n\nAnswer summary:\n{summary}\n\n\
         Answer neutrality: {neutrality:.2}\nAnswer persuasion: {persuasion:.2}\n\n\
         Sources ({count}):\n{listing}\n\
         Provide overallAssessment, keyFindings, criticalQuestions, researchSuggestions, \
         confidenceLevel (low, medium or high) and biasIndicators with languagePatterns, \
         perspectiveGaps and sourceDiversity (low, moderate or high).",
        count = sources.len(),
        listing = render_sources(sources),
    )
}

/// One block per source: title, domain, type, scores and tags.
pub fn render_sources(sources: &[ValidatedSource]) -> String {
    if sources.is_empty() {
        return "(none)\n".to_string();
    }

    sources
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let tags = if s.tags.is_empty() {
                "none".to_string()
            } else {
                s.tags.iter().cloned().collect::<Vec<_>>().join(", ")
            };
            format!(
                "{n}. {title}\n   domain: {domain}\n   type: {kind}\n   credibility: {cred:.2}\n   \
                 neutrality: {neu:.2}\n   sentiment: {sen:.2}\n   tags: {tags}\n",
                n = i + 1,
                title = s.title,
                domain = s.domain,
                kind = s.source_type,
                cred = s.credibility_score,
                neu = s.neutrality_score,
                sen = s.sentiment_score,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::source::{ContentOrigin, SourceType};
    use chrono::Utc;
    use indexmap::IndexSet;

    #[test]
    fn test_render_sources_lists_every_field() {
        let source = ValidatedSource {
            url: "https://nasa.gov/".to_string(),
            title: "NASA".to_string(),
            excerpt: String::new(),
            tags: IndexSet::from(["space".to_string(), "science".to_string()]),
            neutrality_score: 0.8,
            sentiment_score: 0.6,
            domain: "nasa.gov".to_string(),
            source_type: SourceType::Government,
            credibility_score: 0.85,
            verified: true,
            content_origin: ContentOrigin::DirectFetch,
            last_verified_at: Utc::now(),
        };

        let rendered = render_sources(&[source]);
        assert!(rendered.starts_with("1. NASA"));
        assert!(rendered.contains("domain: nasa.gov"));
        assert!(rendered.contains("type: government"));
        assert!(rendered.contains("credibility: 0.85"));
        assert!(rendered.contains("tags: space, science"));
    }

    #[test]
    fn test_render_no_sources() {
        assert_eq!(render_sources(&[]), "(none)\n");
    }
}
