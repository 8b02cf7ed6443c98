use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Sent on every outbound request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_rss_items_per_source")]
    pub rss_items_per_source: usize,
    #[serde(default = "default_community_posts_per_source")]
    pub community_posts_per_source: usize,
    /// Posts scoring at or below this are dropped
    #[serde(default = "default_min_score")]
    pub min_score: i64,
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    #[serde(default = "default_description_max_chars")]
    pub description_max_chars: usize,
    /// Prefixed to each post's relative permalink
    #[serde(default = "default_community_site_url")]
    pub community_site_url: String,
    #[serde(default = "default_fallback_image_url")]
    pub fallback_image_url: String,
    #[serde(default = "default_rss_sources")]
    pub rss_sources: Vec<SourceConfig>,
    #[serde(default = "default_community_sources")]
    pub community_sources: Vec<SourceConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
}

impl SourceConfig {
    pub fn new(url: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_user_agent() -> String {
    "NewsApp/1.0".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_rss_items_per_source() -> usize {
    10
}

fn default_community_posts_per_source() -> usize {
    8
}

fn default_min_score() -> i64 {
    50
}

fn default_max_articles() -> usize {
    50
}

fn default_description_max_chars() -> usize {
    200
}

fn default_community_site_url() -> String {
    "https://reddit.com".to_string()
}

fn default_fallback_image_url() -> String {
    "https://storage.googleapis.com/workspace-0f70711f-8b4e-4d94-86f1-2a93ccde5887/image/8dadb76c-7e71-4a2c-b748-55f4eb7e7623.png"
        .to_string()
}

fn default_rss_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new("http://feeds.bbci.co.uk/news/world/rss.xml", "BBC World News"),
        SourceConfig::new("http://feeds.reuters.com/Reuters/worldNews", "Reuters World News"),
        SourceConfig::new("https://feeds.npr.org/1004/rss.xml", "NPR World News"),
        SourceConfig::new("https://rss.cnn.com/rss/edition.rss", "CNN International"),
    ]
}

fn default_community_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new(
            "https://www.reddit.com/r/geopolitics/.json?limit=10",
            "Reddit Geopolitics",
        ),
        SourceConfig::new(
            "https://www.reddit.com/r/worldnews/.json?limit=10",
            "Reddit World News",
        ),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            rss_items_per_source: default_rss_items_per_source(),
            community_posts_per_source: default_community_posts_per_source(),
            min_score: default_min_score(),
            max_articles: default_max_articles(),
            description_max_chars: default_description_max_chars(),
            community_site_url: default_community_site_url(),
            fallback_image_url: default_fallback_image_url(),
            rss_sources: default_rss_sources(),
            community_sources: default_community_sources(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the built-in sources.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn source_count(&self) -> usize {
        self.rss_sources.len() + self.community_sources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_builtin_sources() {
        let config = Config::default();

        assert_eq!(config.rss_sources.len(), 4);
        assert_eq!(config.community_sources.len(), 2);
        assert_eq!(config.source_count(), 6);
        assert_eq!(config.rss_sources[0].name, "BBC World News");
        assert_eq!(config.community_sources[1].name, "Reddit World News");
        assert_eq!(config.user_agent, "NewsApp/1.0");
        assert_eq!(config.rss_items_per_source, 10);
        assert_eq!(config.community_posts_per_source, 8);
        assert_eq!(config.min_score, 50);
        assert_eq!(config.max_articles, 50);
        assert_eq!(config.description_max_chars, 200);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
            listen_addr = "127.0.0.1:8080"
            max_articles = 20

            [[rss_sources]]
            name = "Test Feed"
            url = "https://example.com/feed.xml"

            [[community_sources]]
            name = "Test Community"
            url = "https://example.org/r/test/.json"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.max_articles, 20);
        assert_eq!(
            config.rss_sources,
            vec![SourceConfig::new("https://example.com/feed.xml", "Test Feed")]
        );
        assert_eq!(config.community_sources[0].name, "Test Community");
    }

    #[test]
    fn test_missing_source_lists_fall_back_to_defaults() {
        let config = Config::from_str("min_score = 100").unwrap();

        assert_eq!(config.min_score, 100);
        assert_eq!(config.rss_sources, default_rss_sources());
        assert_eq!(config.community_sources, default_community_sources());
    }

    #[test]
    fn test_empty_source_lists() {
        let content = r#"
            rss_sources = []
            community_sources = []
        "#;

        let config = Config::from_str(content).unwrap();
        assert_eq!(config.source_count(), 0);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = Config::load("/nonexistent/path/sources.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/path/sources.toml").unwrap();
        assert_eq!(config.source_count(), 6);
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let content = "this is not valid toml {{{";

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        assert!(Config::load(temp_file.path()).is_err());
        assert!(Config::load_or_default(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_config_missing_required_fields() {
        let content = r#"
            [[rss_sources]]
            name = "Test Feed"
            # Missing url field
        "#;

        let result = Config::from_str(content);
        assert!(result.is_err());
    }
}
