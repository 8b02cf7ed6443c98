use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::Client;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::community::{articles_from_listing, Listing, PostRules};
use crate::config::{Config, SourceConfig};
use crate::model::{merge_articles, Article};

/// Why a single source produced nothing.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("feed parse error: {0}")]
    Feed(#[from] feed_rs::parser::ParseFeedError),

    #[error("listing decode error: {0}")]
    Listing(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: Arc<Config>,
}

impl Fetcher {
    pub fn new(config: Arc<Config>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches every configured source concurrently and merges the results
    /// newest first. Per-source failures only shrink the result; an error
    /// here means a fetch task itself died.
    pub async fn aggregate(&self) -> anyhow::Result<Vec<Article>> {
        let rss_tasks: Vec<JoinHandle<Vec<Article>>> = self
            .config
            .rss_sources
            .iter()
            .cloned()
            .map(|source| {
                let fetcher = self.clone();
                tokio::spawn(async move { fetcher.rss_articles(&source).await })
            })
            .collect();

        let community_tasks: Vec<JoinHandle<Vec<Article>>> = self
            .config
            .community_sources
            .iter()
            .cloned()
            .map(|source| {
                let fetcher = self.clone();
                tokio::spawn(async move { fetcher.community_articles(&source).await })
            })
            .collect();

        let mut batches = Vec::with_capacity(rss_tasks.len() + community_tasks.len());
        for task in rss_tasks.into_iter().chain(community_tasks) {
            batches.push(task.await?);
        }

        let fetched: usize = batches.iter().map(Vec::len).sum();
        let articles = merge_articles(batches, self.config.max_articles);
        info!(
            "Aggregated {} articles from {} sources, returning {}",
            fetched,
            self.config.source_count(),
            articles.len()
        );

        Ok(articles)
    }

    /// [`Fetcher::fetch_rss`], with failures logged and turned into an empty list.
    pub async fn rss_articles(&self, source: &SourceConfig) -> Vec<Article> {
        match self.fetch_rss(source).await {
            Ok(articles) => articles,
            Err(e) => {
                error!("Error fetching RSS from {} ({}): {}", source.name, source.url, e);
                Vec::new()
            }
        }
    }

    /// [`Fetcher::fetch_community`], with failures logged and turned into an empty list.
    pub async fn community_articles(&self, source: &SourceConfig) -> Vec<Article> {
        match self.fetch_community(source).await {
            Ok(articles) => articles,
            Err(e) => {
                error!(
                    "Error fetching community posts from {} ({}): {}",
                    source.name, source.url, e
                );
                Vec::new()
            }
        }
    }

    pub async fn fetch_rss(&self, source: &SourceConfig) -> Result<Vec<Article>, FetchError> {
        info!("Fetching feed: {} ({})", source.name, source.url);

        let fetched_at = Utc::now();
        let bytes = self
            .client
            .get(&source.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let parsed = parser::parse(&bytes[..])?;
        let articles: Vec<Article> = parsed
            .entries
            .iter()
            .take(self.config.rss_items_per_source)
            .map(|entry| Self::article_from_entry(&source.name, entry, fetched_at))
            .collect();

        info!("Got {} items from feed '{}'", articles.len(), source.name);
        Ok(articles)
    }

    pub async fn fetch_community(
        &self,
        source: &SourceConfig,
    ) -> Result<Vec<Article>, FetchError> {
        info!("Fetching listing: {} ({})", source.name, source.url);

        let bytes = self
            .client
            .get(&source.url)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let listing: Listing = serde_json::from_slice(&bytes)?;
        let rules = PostRules {
            source_name: &source.name,
            site_url: &self.config.community_site_url,
            min_score: self.config.min_score,
            max_posts: self.config.community_posts_per_source,
            description_max_chars: self.config.description_max_chars,
        };
        let articles = articles_from_listing(listing, &rules);

        info!("Got {} posts from listing '{}'", articles.len(), source.name);
        Ok(articles)
    }

    pub fn article_from_entry(
        source_name: &str,
        entry: &Entry,
        fetched_at: DateTime<Utc>,
    ) -> Article {
        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "No title".to_string());

        let link = entry
            .links
            .first()
            .map(|l| l.href.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "#".to_string());

        let pub_date = entry.published.or(entry.updated).unwrap_or(fetched_at);

        Article {
            source: source_name.to_string(),
            title,
            link,
            pub_date,
            description: Self::entry_description(entry),
            image_url: Self::entry_image(entry),
        }
    }

    /// Plain-text summary, falling back to the raw content body.
    pub fn entry_description(entry: &Entry) -> String {
        let snippet = entry
            .summary
            .as_ref()
            .map(|s| strip_html(&s.content))
            .filter(|s| !s.is_empty());

        snippet
            .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
            .unwrap_or_default()
    }

    /// Enclosure URL if the item has one, else a media thumbnail.
    pub fn entry_image(entry: &Entry) -> Option<String> {
        let enclosure = entry
            .media
            .iter()
            .flat_map(|m| m.content.iter())
            .find_map(|c| c.url.as_ref().map(|u| u.to_string()));

        enclosure.or_else(|| {
            entry
                .media
                .iter()
                .flat_map(|m| m.thumbnails.iter())
                .map(|t| t.image.uri.trim())
                .find(|uri| uri.starts_with("http://") || uri.starts_with("https://"))
                .map(str::to_string)
        })
    }
}

const BLOCK_TAGS: &[&str] = &[
    "p", "br", "div", "li", "ul", "ol", "tr", "td", "blockquote", "h1", "h2", "h3", "h4", "h5",
    "h6",
];

/// Drops markup, decodes entities and collapses whitespace. Only block-level
/// tags separate words; inline tags like `<em>` join their neighbours.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut tag = String::new();
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let name: String = tag
                    .trim_start_matches('/')
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_ascii_lowercase();
                if BLOCK_TAGS.contains(&name.as_str()) {
                    text.push(' ');
                }
            }
            _ if in_tag => tag.push(c),
            _ => text.push(c),
        }
    }

    html_escape::decode_html_entities(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
