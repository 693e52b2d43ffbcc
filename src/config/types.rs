use serde::Deserialize;

/// Main configuration structure for seo-audit
///
/// Every section is optional in the TOML file; missing sections fall back
/// to the defaults an audit uses when no file is given at all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub fetch: FetchConfig,
    pub crawl: CrawlConfig,
    pub links: LinkConfig,
    pub output: OutputConfig,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the audit bot
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the audit bot
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the bot
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SeoAuditBot".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/seo-audit/seo-audit".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the identifying client signature sent with every request
    pub fn header_value(&self) -> String {
        format!(
            "Mozilla/5.0 (compatible; {}/{}; +{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Timeouts and redirect handling for the fetch layer
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Timeout for the audited root page (seconds)
    #[serde(rename = "root-timeout")]
    pub root_timeout: u64,

    /// Timeout for auxiliary probes: robots.txt, sitemap.xml, link checks (seconds)
    #[serde(rename = "probe-timeout")]
    pub probe_timeout: u64,

    /// Timeout for internal pages fetched by the crawl (seconds)
    #[serde(rename = "crawl-timeout")]
    pub crawl_timeout: u64,

    /// Maximum number of redirect hops followed per request
    #[serde(rename = "max-redirects")]
    pub max_redirects: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            root_timeout: 15,
            probe_timeout: 5,
            crawl_timeout: 10,
            max_redirects: 10,
        }
    }
}

/// Internal-page crawl configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum number of same-domain pages inspected per audit
    #[serde(rename = "max-pages")]
    pub max_pages: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self { max_pages: 5 }
    }
}

/// Link analysis configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Number of internal links probed for existence
    #[serde(rename = "probe-sample")]
    pub probe_sample: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self { probe_sample: 10 }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database audits are saved to
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}
