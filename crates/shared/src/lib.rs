// Public modules
pub mod config;
pub mod exporter;
pub mod io;
pub mod logging;
pub mod models;
pub mod newsapi;
pub mod pagination;
pub mod pdf;
pub mod sanitize;
pub mod session;
pub mod summarizer;

// Re-export commonly used types
pub use config::Config;
pub use exporter::PdfExporter;
pub use io::{get_default_download_dir, save_document};
pub use logging::init_logging;
pub use models::{Article, ExportRequest, ExportScope, SummaryResult, TopicQuery};
pub use newsapi::{ArticleSource, NewsApiClient};
pub use pagination::Paginator;
pub use session::{ExportedDocument, NewsPipeline, Session};
pub use summarizer::{GenerationError, LocalModelProcess, NarrativeSummarizer, TextGenerator};
