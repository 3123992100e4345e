//! Host guard for generator-supplied URLs (SSRF protection).
//!
//! Candidate URLs come from a generative backend and are untrusted. Before a
//! probe or fetch is issued the guard rejects:
//! - Non-HTTP(S) schemes
//! - Loopback and metadata hostnames
//! - Literal IPs in private, loopback and link-local ranges

use std::collections::HashSet;
use std::net::IpAddr;
use url::{Host, Url};

use crate::error::{SecurityError, SecurityResult};

/// Rejects URLs that point at internal infrastructure.
#[derive(Debug, Clone)]
pub struct HostGuard {
    allowed_schemes: HashSet<String>,
    blocked_hosts: HashSet<String>,
    blocked_suffixes: Vec<String>,
    blocked_cidrs: Vec<ipnet::IpNet>,
    allowed_hosts: HashSet<String>,
}

impl Default for HostGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl HostGuard {
    /// Create a guard with default rules.
    pub fn new() -> Self {
        Self {
            allowed_schemes: ["http", "https"].into_iter().map(String::from).collect(),
            blocked_hosts: [
                "localhost",
                "metadata.google.internal",
                "metadata.gke.internal",
                "instance-data",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            blocked_suffixes: [".localhost", ".local", ".internal"]
                .into_iter()
                .map(String::from)
                .collect(),
            blocked_cidrs: [
                "0.0.0.0/8",
                "10.0.0.0/8",
                "100.64.0.0/10",
                "127.0.0.0/8",
                "169.254.0.0/16",
                "172.16.0.0/12",
                "192.168.0.0/16",
                "::1/128",
                "fc00::/7",
                "fe80::/10",
            ]
            .into_iter()
            .filter_map(|cidr| cidr.parse().ok())
            .collect(),
            allowed_hosts: HashSet::new(),
        }
    }

    /// Add an allowed host (bypasses the other checks).
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_hosts.insert(host.into());
        self
    }

    /// Block every host ending in `suffix`.
    pub fn block_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.blocked_suffixes.push(suffix.into().to_lowercase());
        self
    }

    /// Check a parsed URL.
    pub fn check(&self, url: &Url) -> SecurityResult<()> {
        if !self.allowed_schemes.contains(url.scheme()) {
            return Err(SecurityError::DisallowedScheme(url.scheme().to_string()));
        }

        let host = url.host().ok_or(SecurityError::NoHost)?;
        let host_str = url.host_str().ok_or(SecurityError::NoHost)?;

        if self.allowed_hosts.contains(host_str) {
            return Ok(());
        }

        let ip = match host {
            Host::Domain(domain) => {
                let domain = domain.to_lowercase();
                if self.blocked_hosts.contains(&domain)
                    || self.blocked_suffixes.iter().any(|s| domain.ends_with(s))
                {
                    return Err(SecurityError::BlockedHost(domain));
                }
                return Ok(());
            }
            Host::Ipv4(v4) => IpAddr::V4(v4),
            Host::Ipv6(v6) => IpAddr::V6(v6),
        };

        match self.blocked_cidrs.iter().find(|cidr| cidr.contains(&ip)) {
            Some(cidr) => Err(SecurityError::BlockedCidr(format!("{} in {}", ip, cidr))),
            None => Ok(()),
        }
    }

    /// Parse and check a URL string.
    pub fn check_str(&self, url: &str) -> SecurityResult<()> {
        let parsed = Url::parse(url).map_err(|_| SecurityError::NoHost)?;
        self.check(&parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_hosts_pass() {
        let guard = HostGuard::new();
        assert!(guard.check_str("https://www.nasa.gov/topics").is_ok());
        assert!(guard.check_str("http://8.8.8.8/").is_ok());
    }

    #[test]
    fn test_blocks_localhost() {
        let guard = HostGuard::new();
        assert!(matches!(
            guard.check_str("http://localhost:8080/admin"),
            Err(SecurityError::BlockedHost(_))
        ));
        assert!(matches!(
            guard.check_str("http://printer.local/"),
            Err(SecurityError::BlockedHost(_))
        ));
    }

    #[test]
    fn test_blocks_private_ips() {
        let guard = HostGuard::new();
        for url in [
            "http://127.0.0.1/",
            "http://10.1.2.3/",
            "http://192.168.1.1/",
            "http://169.254.169.254/latest/meta-data",
            "http://[::1]/",
        ] {
            assert!(
                matches!(guard.check_str(url), Err(SecurityError::BlockedCidr(_))),
                "{} should be blocked",
                url
            );
        }
    }

    #[test]
    fn test_blocks_schemes() {
        let guard = HostGuard::new();
        assert!(matches!(
            guard.check_str("ftp://example.com/file"),
            Err(SecurityError::DisallowedScheme(_))
        ));
    }

    #[test]
    fn test_block_suffix() {
        let guard = HostGuard::new().block_suffix(".corp.example");
        assert!(guard.check_str("https://wiki.corp.example/").is_err());
        assert!(guard.check_str("https://corp.example.org/").is_ok());
    }

    #[test]
    fn test_allow_host_bypasses_rules() {
        let guard = HostGuard::new().allow_host("localhost");
        assert!(guard.check_str("http://localhost/").is_ok());
    }
}
