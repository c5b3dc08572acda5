use anyhow::Result;
use std::num::NonZeroUsize;

use crate::exporter::PdfExporter;
use crate::models::{Article, ExportRequest, ExportScope, SummaryResult, TopicQuery};
use crate::newsapi::ArticleSource;
use crate::pagination::{self, Paginator};
use crate::summarizer::{NarrativeSummarizer, MAX_EXCERPTS};

/// Everything the user is currently looking at. A new fetch builds a new
/// session; nothing carries over from the previous one.
#[derive(Debug, Clone)]
pub struct Session {
    articles: Vec<Article>,
    summary: SummaryResult,
    pager: Paginator,
}

/// An export ready to hand to the user
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Session {
    pub fn new(summary: SummaryResult, articles: Vec<Article>, page_size: NonZeroUsize) -> Self {
        let pager = Paginator::new(articles.len(), page_size);
        Self {
            articles,
            summary,
            pager,
        }
    }

    pub fn topic(&self) -> &str {
        &self.summary.topic
    }

    pub fn summary(&self) -> &SummaryResult {
        &self.summary
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn pager(&self) -> &Paginator {
        &self.pager
    }

    pub fn current_page(&self) -> &[Article] {
        self.pager.slice(&self.articles)
    }

    pub fn next_page(&mut self) -> usize {
        self.pager.next()
    }

    pub fn previous_page(&mut self) -> usize {
        self.pager.previous()
    }

    pub fn export_request(&self, scope: ExportScope) -> ExportRequest {
        let articles = match scope {
            ExportScope::CurrentPage(number) => {
                pagination::page(&self.articles, number, self.pager.page_size()).to_vec()
            }
            ExportScope::All => self.articles.clone(),
        };
        ExportRequest {
            topic: self.summary.topic.clone(),
            narrative: self.summary.narrative.clone(),
            articles,
            scope,
        }
    }

    pub fn export_current_page(&self) -> Result<ExportedDocument> {
        self.export(ExportScope::CurrentPage(self.pager.current_page()))
    }

    pub fn export_all(&self) -> Result<ExportedDocument> {
        self.export(ExportScope::All)
    }

    fn export(&self, scope: ExportScope) -> Result<ExportedDocument> {
        let request = self.export_request(scope);
        let bytes = PdfExporter::export_request(&request)?;
        tracing::info!(
            "Exported {} article(s) as {} ({} bytes)",
            request.articles.len(),
            request.file_name(),
            bytes.len()
        );
        Ok(ExportedDocument {
            file_name: request.file_name(),
            bytes,
        })
    }
}

/// Fetch then summarize, one step after the other
pub struct NewsPipeline {
    source: Box<dyn ArticleSource>,
    summarizer: NarrativeSummarizer,
    fetch_size: usize,
    page_size: NonZeroUsize,
}

impl NewsPipeline {
    pub fn new(
        source: Box<dyn ArticleSource>,
        summarizer: NarrativeSummarizer,
        fetch_size: usize,
        page_size: NonZeroUsize,
    ) -> Self {
        Self {
            source,
            summarizer,
            fetch_size,
            page_size,
        }
    }

    /// Builds a fresh session for `topic`, or `None` when no articles were found
    pub async fn refresh(&self, topic: &str) -> Option<Session> {
        let query = TopicQuery::new(topic).with_page_size(self.fetch_size);
        let articles = self.source.fetch(&query).await;

        if articles.is_empty() {
            tracing::info!("No articles found for \"{}\"", topic);
            return None;
        }
        tracing::info!("Fetched {} article(s) for \"{}\"", articles.len(), topic);

        let excerpts: Vec<String> = articles
            .iter()
            .take(MAX_EXCERPTS)
            .map(|a| a.summary.clone())
            .collect();
        let narrative = self.summarizer.summarize(topic, &excerpts).await;

        Some(Session::new(
            SummaryResult::new(topic, narrative),
            articles,
            self.page_size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::{GenerationError, TextGenerator};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct FixedSource {
        articles: Vec<Article>,
        queries: Arc<Mutex<Vec<TopicQuery>>>,
    }

    #[async_trait]
    impl ArticleSource for FixedSource {
        async fn fetch(&self, query: &TopicQuery) -> Vec<Article> {
            self.queries.lock().unwrap().push(query.clone());
            self.articles.clone()
        }
    }

    /// Replies with the number of excerpt lines it was given
    struct CountingGenerator;

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate(&self, _model: &str, prompt: &str) -> Result<String, GenerationError> {
            Ok(format!("{} excerpts", prompt.matches("\n- ").count()))
        }
    }

    struct BrokenGenerator;

    #[async_trait]
    impl TextGenerator for BrokenGenerator {
        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::TimedOut(std::time::Duration::from_secs(1)))
        }
    }

    fn articles(n: usize) -> Vec<Article> {
        (1..=n)
            .map(|i| {
                Article::new(
                    format!("Title {}", i),
                    format!("Summary {}", i),
                    format!("https://example.com/{}", i),
                )
            })
            .collect()
    }

    fn pipeline(
        n: usize,
        generator: Box<dyn TextGenerator>,
    ) -> (NewsPipeline, Arc<Mutex<Vec<TopicQuery>>>) {
        let queries = Arc::new(Mutex::new(Vec::new()));
        let source = FixedSource {
            articles: articles(n),
            queries: Arc::clone(&queries),
        };
        let pipeline = NewsPipeline::new(
            Box::new(source),
            NarrativeSummarizer::new(generator, "mistral"),
            30,
            NonZeroUsize::new(10).unwrap(),
        );
        (pipeline, queries)
    }

    #[tokio::test]
    async fn test_refresh_builds_session_on_first_page() {
        let (pipeline, queries) = pipeline(23, Box::new(CountingGenerator));
        let session = pipeline.refresh("technology").await.unwrap();

        assert_eq!(session.topic(), "technology");
        assert_eq!(session.articles().len(), 23);
        assert_eq!(session.pager().current_page(), 1);
        assert_eq!(session.pager().total_pages(), 3);
        assert_eq!(queries.lock().unwrap()[0].page_size, 30);
    }

    #[tokio::test]
    async fn test_summary_sees_at_most_twenty_excerpts() {
        let (pipeline, _) = pipeline(23, Box::new(CountingGenerator));
        let session = pipeline.refresh("technology").await.unwrap();
        assert_eq!(session.summary().narrative, "20 excerpts");
    }

    #[tokio::test]
    async fn test_refetch_resets_to_first_page() {
        let (pipeline, _) = pipeline(23, Box::new(CountingGenerator));
        let mut session = pipeline.refresh("technology").await.unwrap();
        session.next_page();
        session.next_page();
        assert_eq!(session.pager().current_page(), 3);

        let session = pipeline.refresh("technology").await.unwrap();
        assert_eq!(session.pager().current_page(), 1);
    }

    #[tokio::test]
    async fn test_no_articles_yields_no_session() {
        let (pipeline, _) = pipeline(0, Box::new(CountingGenerator));
        assert!(pipeline.refresh("nothing").await.is_none());
    }

    #[tokio::test]
    async fn test_broken_generator_leaves_empty_narrative() {
        let (pipeline, _) = pipeline(5, Box::new(BrokenGenerator));
        let session = pipeline.refresh("technology").await.unwrap();
        assert!(session.summary().is_empty());
        assert_eq!(session.articles().len(), 5);
    }

    #[test]
    fn test_export_request_scopes() {
        let mut session = Session::new(
            SummaryResult::new("technology", "Narrative"),
            articles(23),
            NonZeroUsize::new(10).unwrap(),
        );
        session.next_page();
        session.next_page();

        let page = session.export_request(ExportScope::CurrentPage(3));
        assert_eq!(page.articles.len(), 3);
        assert_eq!(page.articles[0].title, "Title 21");
        assert_eq!(page.narrative, "Narrative");

        let all = session.export_request(ExportScope::All);
        assert_eq!(all.articles.len(), 23);
    }

    #[test]
    fn test_export_request_slices_the_requested_page() {
        let session = Session::new(
            SummaryResult::new("tech", "Narrative"),
            articles(23),
            NonZeroUsize::new(10).unwrap(),
        );
        assert_eq!(session.pager().current_page(), 1);

        let page = session.export_request(ExportScope::CurrentPage(3));
        assert_eq!(page.file_name(), "news_summary_tech_page_3.pdf");
        assert_eq!(page.articles.len(), 3);
        assert_eq!(page.articles[0].title, "Title 21");
    }

    #[test]
    fn test_export_documents_are_named_by_scope() {
        let mut session = Session::new(
            SummaryResult::new("technology", ""),
            articles(12),
            NonZeroUsize::new(10).unwrap(),
        );
        session.next_page();

        let page = session.export_current_page().unwrap();
        assert_eq!(page.file_name, "news_summary_technology_page_2.pdf");
        assert!(page.bytes.starts_with(b"%PDF-"));

        let all = session.export_all().unwrap();
        assert_eq!(all.file_name, "news_summary_technology_full.pdf");
        assert!(all.bytes.len() > page.bytes.len());
    }
}
