use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::models::{Article, TopicQuery};

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";

/// Anything that can produce articles for a topic. An empty list means
/// "nothing found", whatever the underlying cause.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch(&self, query: &TopicQuery) -> Vec<Article>;
}

#[derive(Debug, Deserialize)]
pub struct RawArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    articles: Vec<RawArticle>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: String, base_url: &str, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("daily-news/0.1")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn everything_url(&self, query: &TopicQuery, api_key: &str) -> String {
        format!(
            "{}/v2/everything?q={}&language=en&sortBy=publishedAt&pageSize={}&apiKey={}",
            self.base_url,
            urlencoding::encode(&query.topic),
            query.page_size,
            urlencoding::encode(api_key)
        )
    }

    async fn try_fetch(&self, query: &TopicQuery) -> Result<Vec<Article>> {
        tracing::debug!("GET {}", self.everything_url(query, "<redacted>"));

        let response = self
            .client
            .get(self.everything_url(query, &self.api_key))
            .send()
            .await
            .context("Failed to fetch articles from news provider")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read news provider response")?;

        // Error bodies are JSON too, so parse before judging the HTTP status
        let parsed = serde_json::from_str::<EverythingResponse>(&body);

        if !status.is_success() {
            let detail = parsed
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_else(|| String::from("unknown error"));
            anyhow::bail!("News provider returned error: {} - {}", status, detail);
        }

        let parsed = parsed.context("Failed to parse news provider response")?;

        if parsed.status != "ok" {
            anyhow::bail!(
                "News provider reported status {}: {} - {}",
                parsed.status,
                parsed.code.unwrap_or_default(),
                parsed.message.unwrap_or_default()
            );
        }

        let raw_count = parsed.articles.len();
        let articles = filter_articles(parsed.articles);
        tracing::debug!(
            "Kept {}/{} articles after filtering incomplete entries",
            articles.len(),
            raw_count
        );

        Ok(articles)
    }
}

#[async_trait]
impl ArticleSource for NewsApiClient {
    async fn fetch(&self, query: &TopicQuery) -> Vec<Article> {
        match self.try_fetch(query).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!("Fetching \"{}\" failed: {:#}", query.topic, e);
                Vec::new()
            }
        }
    }
}

/// Keeps entries with a title, a description and an absolute URL, in order.
/// URLs are stored in their ASCII form (punycode host, percent-encoded path).
pub fn filter_articles(raw: Vec<RawArticle>) -> Vec<Article> {
    raw.into_iter()
        .filter_map(|item| {
            let title = item.title.filter(|t| !t.trim().is_empty())?;
            let summary = item.description.filter(|d| !d.trim().is_empty())?;
            let url = item.url.and_then(|u| url::Url::parse(&u).ok())?.to_string();
            Some(Article {
                title,
                summary,
                url,
            })
        })
        .collect()
}
