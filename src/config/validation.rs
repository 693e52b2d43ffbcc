use crate::config::types::{Config, CrawlConfig, FetchConfig, LinkConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_user_agent_config(&config.user_agent)?;
    validate_fetch_config(&config.fetch)?;
    validate_crawl_config(&config.crawl)?;
    validate_link_config(&config.links)?;
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates fetch timeouts and redirect limits
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("root_timeout", config.root_timeout),
        ("probe_timeout", config.probe_timeout),
        ("crawl_timeout", config.crawl_timeout),
    ] {
        if !(1..=120).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and 120 seconds, got {}",
                name, value
            )));
        }
    }

    if config.max_redirects < 1 || config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be between 1 and 20, got {}",
            config.max_redirects
        )));
    }

    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_pages > 50 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be <= 50, got {}",
            config.max_pages
        )));
    }
    Ok(())
}

/// Validates link analysis configuration
fn validate_link_config(config: &LinkConfig) -> Result<(), ConfigError> {
    if config.probe_sample > 50 {
        return Err(ConfigError::Validation(format!(
            "probe_sample must be <= 50, got {}",
            config.probe_sample
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_crawler_name() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "Bad Name!".to_string();
        assert!(validate(&config).is_err());

        config.user_agent.crawler_name = String::new();
        assert!(validate(&config).is_err());

        config.user_agent.crawler_name = "Audit-Bot2".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_contact_url() {
        let mut config = Config::default();
        config.user_agent.contact_url = "not a url".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_validate_timeouts() {
        let mut config = Config::default();
        config.fetch.probe_timeout = 0;
        assert!(validate(&config).is_err());

        config.fetch.probe_timeout = 121;
        assert!(validate(&config).is_err());

        config.fetch.probe_timeout = 120;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_redirect_limit() {
        let mut config = Config::default();
        config.fetch.max_redirects = 0;
        assert!(validate(&config).is_err());

        config.fetch.max_redirects = 21;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_crawl_and_link_bounds() {
        let mut config = Config::default();
        config.crawl.max_pages = 0;
        assert!(validate(&config).is_ok());

        config.crawl.max_pages = 51;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.links.probe_sample = 51;
        assert!(validate(&config).is_err());
    }
}
