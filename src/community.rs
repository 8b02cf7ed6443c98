//! Reddit listing decoding and post selection.
//!
//! A listing is `{ data: { children: [ { data: Post } ] } }`. Only the
//! fields needed to build an [`Article`] are decoded; everything else in
//! the payload is ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::model::Article;

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
pub struct Child {
    pub data: Post,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Post {
    pub title: String,
    pub permalink: String,
    /// Unix seconds; Reddit sends this as a float
    pub created_utc: f64,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub stickied: bool,
    #[serde(default)]
    pub score: i64,
}

/// Selection and mapping knobs, taken from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct PostRules<'a> {
    pub source_name: &'a str,
    pub site_url: &'a str,
    pub min_score: i64,
    pub max_posts: usize,
    pub description_max_chars: usize,
}

impl Post {
    pub fn qualifies(&self, min_score: i64) -> bool {
        !self.stickied && self.score > min_score
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis((self.created_utc * 1000.0) as i64)
    }
}

/// Maps a decoded listing into articles: drops stickied and low-score posts,
/// then keeps the first `max_posts` survivors in listing order.
pub fn articles_from_listing(listing: Listing, rules: &PostRules<'_>) -> Vec<Article> {
    listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(|post| post.qualifies(rules.min_score))
        .take(rules.max_posts)
        .filter_map(|post| {
            let Some(pub_date) = post.published_at() else {
                warn!(
                    "Skipping post '{}' from {}: timestamp {} out of range",
                    post.title, rules.source_name, post.created_utc
                );
                return None;
            };

            Some(Article {
                source: rules.source_name.to_string(),
                link: format!("{}{}", rules.site_url.trim_end_matches('/'), post.permalink),
                pub_date,
                description: truncate_description(&post.selftext, rules.description_max_chars),
                image_url: usable_thumbnail(post.thumbnail.as_deref()),
                title: post.title,
            })
        })
        .collect()
}

/// First `max_chars` characters followed by `...`; empty text stays empty.
pub fn truncate_description(text: &str, max_chars: usize) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// Reddit fills `thumbnail` with tokens like `self`, `default` or `nsfw`
/// when there is no image; only absolute http(s) URLs are kept.
pub fn usable_thumbnail(thumbnail: Option<&str>) -> Option<String> {
    thumbnail
        .map(str::trim)
        .filter(|t| t.starts_with("http://") || t.starts_with("https://"))
        .map(str::to_string)
}
