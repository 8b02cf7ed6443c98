use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::fetcher::Fetcher;
use crate::model::{Article, NewsResponse};

const CARD_DESCRIPTION_CHARS: usize = 150;

pub struct AppState {
    pub fetcher: Fetcher,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/news/cards", get(news_cards))
        .route("/api/news", get(news))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Template structs
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub source_count: usize,
}

#[derive(Template)]
#[template(path = "news_cards.html")]
pub struct NewsCardsTemplate {
    pub cards: Vec<ArticleCard>,
    pub last_updated: String,
    pub max_articles: usize,
    pub fallback_image_url: String,
}

#[derive(Template)]
#[template(path = "news_error.html")]
pub struct NewsErrorTemplate {
    pub message: String,
}

/// An [`Article`] prepared for display.
pub struct ArticleCard {
    pub source: String,
    pub title: String,
    pub link: String,
    pub date: String,
    pub description: String,
    pub image_url: Option<String>,
}

impl From<&Article> for ArticleCard {
    fn from(article: &Article) -> Self {
        Self {
            source: article.source.clone(),
            title: article.title.clone(),
            link: article.link.clone(),
            date: format_date(article.pub_date),
            description: shorten(&article.description, CARD_DESCRIPTION_CHARS),
            image_url: article.image_url.clone(),
        }
    }
}

/// `Dec 9, 2024, 12:00 PM`, always in UTC.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Cuts to `max_chars` plus `...` only when the text is longer.
pub fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push_str("...");
        out
    } else {
        text.to_string()
    }
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

// Aggregation failures reach the caller only as a generic message
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Error in news API: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "Failed to fetch news articles".to_string(),
            }),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

// Route handlers
pub async fn news(State(state): State<Arc<AppState>>) -> Result<Json<NewsResponse>, AppError> {
    let articles = state.fetcher.aggregate().await?;
    Ok(Json(NewsResponse::new(articles)))
}

pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    HtmlTemplate(IndexTemplate {
        source_count: state.fetcher.config().source_count(),
    })
}

pub async fn news_cards(State(state): State<Arc<AppState>>) -> Response {
    match state.fetcher.aggregate().await {
        Ok(articles) => {
            let response = NewsResponse::new(articles);
            HtmlTemplate(NewsCardsTemplate {
                cards: response.articles.iter().map(ArticleCard::from).collect(),
                last_updated: format_date(response.last_updated),
                max_articles: state.fetcher.config().max_articles,
                fallback_image_url: state.fetcher.config().fallback_image_url.clone(),
            })
            .into_response()
        }
        Err(e) => {
            error!("Error rendering news cards: {:#}", e);
            HtmlTemplate(NewsErrorTemplate {
                message: "Failed to load news articles".to_string(),
            })
            .into_response()
        }
    }
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
