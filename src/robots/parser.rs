//! Robots.txt parser implementation
//!
//! Allow/disallow matching is delegated to the robotstxt crate; sitemap
//! directives are collected separately since the matcher ignores them.

use robotstxt::DefaultMatcher;

/// Rules and sitemap directives from one robots.txt body
#[derive(Debug, Clone, Default)]
pub struct ParsedRobots {
    /// Raw rules; `None` permits every path
    rules: Option<String>,
    /// Sitemap URLs in order of appearance
    sitemaps: Vec<String>,
}

impl ParsedRobots {
    pub fn from_content(content: &str) -> Self {
        let rules = Some(content.to_string()).filter(|c| !c.trim().is_empty());
        Self {
            rules,
            sitemaps: parse_sitemaps(content),
        }
    }

    /// Permissive rules, used when robots.txt is missing or unreachable
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks a path (with optional query) for the given product token
    pub fn is_allowed(&self, path: &str, user_agent: &str) -> bool {
        match &self.rules {
            Some(rules) => {
                DefaultMatcher::default().one_agent_allowed_by_robots(rules, user_agent, path)
            }
            None => true,
        }
    }

    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }
}

fn parse_sitemaps(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("sitemap"))
        .map(|(_, value)| value.split('#').next().unwrap_or("").trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: &str = "SeoAuditBot";

    #[test]
    fn test_permissive_rules() {
        for robots in [ParsedRobots::allow_all(), ParsedRobots::from_content("  \n")] {
            assert!(robots.is_allowed("/checkout", BOT));
            assert!(robots.sitemaps().is_empty());
        }
    }

    #[test]
    fn test_prefix_rules_for_every_agent() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /cart\nAllow: /cart/help");
        assert!(robots.is_allowed("/", BOT));
        assert!(!robots.is_allowed("/cart", BOT));
        assert!(!robots.is_allowed("/cart/items?id=3", BOT));
        assert!(robots.is_allowed("/cart/help", BOT));
    }

    #[test]
    fn test_group_for_audit_bot_wins() {
        let robots = ParsedRobots::from_content(
            "User-agent: SeoAuditBot\nDisallow: /\n\nUser-agent: *\nAllow: /",
        );
        assert!(!robots.is_allowed("/pricing", BOT));
        assert!(robots.is_allowed("/pricing", "Googlebot"));
    }

    #[test]
    fn test_garbage_allows() {
        let robots = ParsedRobots::from_content("<html>not a robots file</html>");
        assert!(robots.is_allowed("/any/path", BOT));
    }

    #[test]
    fn test_sitemap_directives() {
        let content = "User-agent: *\nDisallow:\n\
                       Sitemap: https://example.com/sitemap_index.xml\n\
                       # Sitemap: https://example.com/commented.xml\n\
                       sitemap:   https://example.com/news.xml  # news\n";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(
            robots.sitemaps(),
            &[
                "https://example.com/sitemap_index.xml".to_string(),
                "https://example.com/news.xml".to_string(),
            ]
        );
    }
}
