//! URL handling module for seo-audit
//!
//! This module provides target normalization, domain extraction, link
//! resolution and same-site classification.

mod domain;
mod normalize;

use crate::{UrlError, UrlResult};
use serde::{Deserialize, Serialize};
use url::Url;

// Re-export main functions
pub use domain::extract_domain;
pub use normalize::{is_page_candidate, normalize_target, resolve_link};

/// Where a resolved link points relative to the audited site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkScope {
    /// Same authority as the audit target
    Internal,
    /// Any other web host
    External,
}

/// The site under audit
///
/// Built once from user input and immutable for the rest of the audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTarget {
    url: Url,
    domain: String,
}

impl AuditTarget {
    /// Parses user input (scheme optional) into an audit target
    ///
    /// # Examples
    ///
    /// ```
    /// use seo_audit::url::AuditTarget;
    ///
    /// let target = AuditTarget::parse("Example.com/shop").unwrap();
    /// assert_eq!(target.as_str(), "https://example.com/shop");
    /// assert_eq!(target.domain(), "example.com");
    /// ```
    pub fn parse(input: &str) -> UrlResult<Self> {
        let url = normalize_target(input)?;
        let domain = extract_domain(&url).ok_or(UrlError::MissingDomain)?;
        Ok(Self { url, domain })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Host (with explicit port) used for same-site classification
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn is_https(&self) -> bool {
        self.url.scheme() == "https"
    }

    /// Resolves an href found on the root page
    pub fn resolve(&self, href: &str) -> Option<Url> {
        resolve_link(href, &self.url)
    }

    /// Classifies a resolved link as internal or external
    pub fn scope_of(&self, url: &Url) -> LinkScope {
        match extract_domain(url) {
            Some(domain) if domain == self.domain => LinkScope::Internal,
            _ => LinkScope::External,
        }
    }

    pub fn is_same_site(&self, url: &Url) -> bool {
        self.scope_of(url) == LinkScope::Internal
    }

    /// Absolute URL of a well-known file at the site root (robots.txt, sitemap.xml)
    pub fn root_file(&self, name: &str) -> Option<Url> {
        self.url.join(&format!("/{}", name.trim_start_matches('/'))).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_adds_scheme() {
        let target = AuditTarget::parse("example.com").unwrap();
        assert_eq!(target.as_str(), "https://example.com/");
        assert!(target.is_https());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(AuditTarget::parse("ftp://example.com").is_err());
        assert!(AuditTarget::parse("").is_err());
    }

    #[test]
    fn test_scope_internal_and_external() {
        let target = AuditTarget::parse("https://example.com/").unwrap();

        let internal = target.resolve("/about").unwrap();
        assert_eq!(target.scope_of(&internal), LinkScope::Internal);

        let external = target.resolve("https://other.com/").unwrap();
        assert_eq!(target.scope_of(&external), LinkScope::External);
    }

    #[test]
    fn test_subdomain_is_external() {
        let target = AuditTarget::parse("https://example.com/").unwrap();
        let blog = Url::parse("https://blog.example.com/").unwrap();
        assert!(!target.is_same_site(&blog));
    }

    #[test]
    fn test_port_distinguishes_sites() {
        let target = AuditTarget::parse("http://127.0.0.1:8080/").unwrap();
        let same = Url::parse("http://127.0.0.1:8080/page").unwrap();
        let other = Url::parse("http://127.0.0.1:9090/page").unwrap();
        assert!(target.is_same_site(&same));
        assert!(!target.is_same_site(&other));
    }

    #[test]
    fn test_root_file() {
        let target = AuditTarget::parse("https://example.com/deep/page").unwrap();
        assert_eq!(
            target.root_file("robots.txt").unwrap().as_str(),
            "https://example.com/robots.txt"
        );
        assert_eq!(
            target.root_file("/sitemap.xml").unwrap().as_str(),
            "https://example.com/sitemap.xml"
        );
    }
}
