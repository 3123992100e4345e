//! URL canonicalization for candidate sources.
//!
//! Cleans a generator-supplied URL string and checks that it is an absolute
//! `http`/`https` URL. Canonicalization is idempotent.

use serde::{Serialize, Serializer};
use std::fmt;
use url::Url;

use crate::error::{SourceError, SourceResult};

/// Query parameters that only carry tracking information.
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// A URL that passed canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Lowercase host without a leading `www.`.
    pub fn domain(&self) -> String {
        let host = self.0.host_str().unwrap_or_default().to_lowercase();
        match host.strip_prefix("www.") {
            Some(rest) => rest.to_string(),
            None => host,
        }
    }

    pub fn into_string(self) -> String {
        self.0.into()
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CanonicalUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Canonicalize a raw URL string.
///
/// - Trims whitespace; a bare `host/path` gets an `https://` scheme
/// - Removes `fbclid`, `utm_*` and similar tracking parameters
/// - Drops empty query segments, an empty `?` and an empty `#`
///
/// Fails with [`SourceError::InvalidUrl`] unless the result is an absolute
/// `http`/`https` URL with a host.
pub fn canonicalize(raw: &str) -> SourceResult<CanonicalUrl> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid(raw, "empty URL"));
    }

    let with_scheme = add_missing_scheme(trimmed);
    let mut url = Url::parse(&with_scheme).map_err(|e| invalid(raw, e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(raw, format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid(raw, "missing host"));
    }

    if let Some(query) = url.query().map(str::to_string) {
        let kept: Vec<&str> = query
            .split('&')
            .filter(|segment| !segment.is_empty() && !is_tracking_param(segment))
            .collect();
        let cleaned = kept.join("&");

        if cleaned.is_empty() {
            url.set_query(None);
        } else if cleaned != query {
            url.set_query(Some(&cleaned));
        }
    }

    if url.fragment() == Some("") {
        url.set_fragment(None);
    }

    Ok(CanonicalUrl(url))
}

/// Prefix `https://` onto scheme-less URLs such as `example.org/page`.
fn add_missing_scheme(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    if url.contains(':') {
        return url.to_string();
    }

    let host = url.split('/').next().unwrap_or_default();
    if host.contains('.') && !host.contains(char::is_whitespace) {
        format!("https://{}", url)
    } else {
        url.to_string()
    }
}

fn is_tracking_param(segment: &str) -> bool {
    let key = segment.split('=').next().unwrap_or_default().to_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}

fn invalid(url: &str, reason: impl Into<String>) -> SourceError {
    SourceError::InvalidUrl {
        url: url.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(url: &str) -> String {
        canonicalize(url).unwrap().into_string()
    }

    #[test]
    fn test_strips_tracking_params() {
        assert_eq!(
            canon("https://x.com/a?fbclid=123&utm_source=y"),
            "https://x.com/a"
        );
        assert_eq!(
            canon("https://x.com/a?id=7&utm_medium=email&page=2"),
            "https://x.com/a?id=7&page=2"
        );
    }

    #[test]
    fn test_trims_empty_separators() {
        assert_eq!(canon("https://x.com/a?"), "https://x.com/a");
        assert_eq!(canon("https://x.com/a#"), "https://x.com/a");
        assert_eq!(canon("https://x.com/a?b=1&&c=2&"), "https://x.com/a?b=1&c=2");
        assert_eq!(canon("  https://x.com/a  "), "https://x.com/a");
    }

    #[test]
    fn test_keeps_meaningful_parts() {
        assert_eq!(
            canon("https://x.com/a?q=rust%20lang#section"),
            "https://x.com/a?q=rust%20lang#section"
        );
    }

    #[test]
    fn test_rejects_non_http() {
        for bad in [
            "javascript:alert(1)",
            "ftp://example.com/file",
            "mailto:someone@example.com",
            "file:///etc/passwd",
            "",
            "not a url",
        ] {
            assert!(
                matches!(canonicalize(bad), Err(SourceError::InvalidUrl { .. })),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_adds_scheme_to_bare_hosts() {
        assert_eq!(canon("example.org/page"), "https://example.org/page");
        assert_eq!(canon("//cdc.gov/flu"), "https://cdc.gov/flu");
    }

    #[test]
    fn test_idempotent() {
        for raw in [
            "https://x.com/a?fbclid=123&utm_source=y",
            "HTTPS://WWW.Example.COM/Path?b=1&&utm_x=2#",
            "example.org",
            "https://x.com/a?q=a+b&r=%20",
        ] {
            let once = canon(raw);
            assert_eq!(canon(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_domain_strips_www() {
        let url = canonicalize("https://WWW.NASA.gov/topics").unwrap();
        assert_eq!(url.domain(), "nasa.gov");
        let url = canonicalize("https://data.nasa.gov/").unwrap();
        assert_eq!(url.domain(), "data.nasa.gov");
    }
}
