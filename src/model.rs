use chrono::{DateTime, Utc};
use serde::Serialize;

/// A headline normalized from either an RSS item or a community post.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: String,
    pub title: String,
    pub link: String,
    pub pub_date: DateTime<Utc>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub articles: Vec<Article>,
    pub total_count: usize,
    pub last_updated: DateTime<Utc>,
}

impl NewsResponse {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            total_count: articles.len(),
            articles,
            last_updated: Utc::now(),
        }
    }
}

/// Flattens per-source batches in the order given, sorts newest first and
/// keeps at most `max` articles. The sort is stable, so equal dates keep
/// their batch order.
pub fn merge_articles(batches: Vec<Vec<Article>>, max: usize) -> Vec<Article> {
    let mut all: Vec<Article> = batches.into_iter().flatten().collect();
    all.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
    all.truncate(max);
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn article(source: &str, title: &str, hours_ago: i64) -> Article {
        let base = Utc.with_ymd_and_hms(2024, 12, 9, 12, 0, 0).unwrap();
        Article {
            source: source.to_string(),
            title: title.to_string(),
            link: format!("https://{}.example.com/{}", source, title),
            pub_date: base - Duration::hours(hours_ago),
            description: String::new(),
            image_url: None,
        }
    }

    mod merge_tests {
        use super::*;

        #[test]
        fn test_sorted_newest_first_across_batches() {
            let batches = vec![
                vec![article("a", "a1", 5), article("a", "a2", 1)],
                vec![article("b", "b1", 3), article("b", "b2", 0)],
            ];

            let merged = merge_articles(batches, 50);
            let titles: Vec<&str> = merged.iter().map(|a| a.title.as_str()).collect();
            assert_eq!(titles, vec!["b2", "a2", "b1", "a1"]);

            for pair in merged.windows(2) {
                assert!(pair[0].pub_date >= pair[1].pub_date);
            }
        }

        #[test]
        fn test_truncates_to_max() {
            let batch: Vec<Article> = (0..60)
                .map(|i| article("a", &format!("t{}", i), i))
                .collect();

            let merged = merge_articles(vec![batch], 50);
            assert_eq!(merged.len(), 50);
            assert_eq!(merged[0].title, "t0");
            assert_eq!(merged[49].title, "t49");
        }

        #[test]
        fn test_fewer_than_max_kept_whole() {
            let merged = merge_articles(
                vec![vec![article("a", "a1", 1)], vec![], vec![article("c", "c1", 2)]],
                50,
            );
            assert_eq!(merged.len(), 2);
        }

        #[test]
        fn test_equal_dates_keep_batch_order() {
            let batches = vec![
                vec![article("rss", "first", 2)],
                vec![article("community", "second", 2)],
            ];

            let merged = merge_articles(batches, 50);
            assert_eq!(merged[0].title, "first");
            assert_eq!(merged[1].title, "second");
        }

        #[test]
        fn test_empty_input() {
            assert!(merge_articles(Vec::new(), 50).is_empty());
        }
    }

    mod serialization_tests {
        use super::*;

        #[test]
        fn test_article_uses_camel_case_keys() {
            let mut a = article("BBC", "Headline", 0);
            a.image_url = Some("https://img.example.com/a.jpg".to_string());

            let json = serde_json::to_value(&a).unwrap();
            assert_eq!(json["source"], "BBC");
            assert_eq!(json["pubDate"], "2024-12-09T12:00:00Z");
            assert_eq!(json["imageUrl"], "https://img.example.com/a.jpg");
            assert_eq!(json["description"], "");
        }

        #[test]
        fn test_missing_image_is_omitted() {
            let json = serde_json::to_value(article("BBC", "Headline", 0)).unwrap();
            assert!(json.get("imageUrl").is_none());
        }

        #[test]
        fn test_response_count_matches_articles() {
            let response = NewsResponse::new(vec![article("a", "1", 0), article("b", "2", 1)]);
            let json = serde_json::to_value(&response).unwrap();

            assert_eq!(json["totalCount"], 2);
            assert_eq!(json["articles"].as_array().unwrap().len(), 2);
            assert!(json["lastUpdated"].is_string());
        }
    }
}
