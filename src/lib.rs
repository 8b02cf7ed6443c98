//! Newsdesk - A World News Headline Aggregator
//!
//! This crate pulls headlines from RSS feeds and Reddit listings,
//! merges them newest first and serves them as JSON and as a web page.

pub mod community;
pub mod config;
pub mod fetcher;
pub mod model;
pub mod routes;
