use serde::{Deserialize, Serialize};

/// Number of articles requested from the provider when none is configured
pub const DEFAULT_FETCH_SIZE: usize = 30;

/// A single news item as shown to the user and written to exports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub url: String,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicQuery {
    pub topic: String,
    pub page_size: usize,
}

impl TopicQuery {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            page_size: DEFAULT_FETCH_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

/// Narrative produced for one fetch cycle. An empty narrative is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub topic: String,
    pub narrative: String,
}

impl SummaryResult {
    pub fn new(topic: impl Into<String>, narrative: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            narrative: narrative.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.narrative.trim().is_empty()
    }
}

/// Which articles an export covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    CurrentPage(usize),
    All,
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub topic: String,
    pub narrative: String,
    pub articles: Vec<Article>,
    pub scope: ExportScope,
}

impl ExportRequest {
    /// Suggested download name, e.g. `news_summary_technology_page_2.pdf`
    pub fn file_name(&self) -> String {
        let topic = file_safe(&self.topic);
        match self.scope {
            ExportScope::CurrentPage(page) => format!("news_summary_{}_page_{}.pdf", topic, page),
            ExportScope::All => format!("news_summary_{}_full.pdf", topic),
        }
    }
}

fn file_safe(topic: &str) -> String {
    let cleaned: String = topic
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "news".to_string()
    } else {
        cleaned
    }
}
