use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use shared::exporter::capitalize;
use shared::{
    get_default_download_dir, init_logging, save_document, Config, ExportedDocument,
    LocalModelProcess, NarrativeSummarizer, NewsApiClient, NewsPipeline, Session,
};
use std::io::{self as stdio, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

const DEFAULT_TOPIC: &str = "technology";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportMode {
    /// First page of results only
    Page,
    /// Every fetched article
    All,
}

#[derive(Parser)]
#[command(name = "daily-news")]
#[command(about = "Fetch today's news on a topic, summarize it with a local model, and export PDFs")]
struct Args {
    /// Topic to search for (prompted if omitted)
    #[arg(short, long)]
    topic: Option<String>,

    /// Local model used for the narrative summary
    #[arg(short, long)]
    model: Option<String>,

    /// Articles shown per page
    #[arg(long)]
    page_size: Option<NonZeroUsize>,

    /// Articles requested from the news provider
    #[arg(long)]
    fetch_size: Option<NonZeroUsize>,

    /// Export once and exit instead of starting the interactive session
    #[arg(short, long, value_enum)]
    export: Option<ExportMode>,

    /// Directory for exported PDFs (defaults to your Downloads folder)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    stdio::stdout().flush()?;

    let mut input = String::new();
    if stdio::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn prompt_topic() -> Result<Option<String>> {
    let answer = prompt_line(&format!(
        "\n🔎 Enter a topic (e.g., technology, politics, football) [{}]: ",
        DEFAULT_TOPIC
    ))?;
    Ok(answer.map(|topic| {
        if topic.is_empty() {
            DEFAULT_TOPIC.to_string()
        } else {
            topic
        }
    }))
}

fn render(session: &Session) {
    let pager = session.pager();

    println!("\n{}", "─".repeat(60));
    if !session.summary().is_empty() {
        println!("📌 Today's News About {}\n", capitalize(session.topic()));
        println!("{}", session.summary().narrative);
        println!("\n{}", "─".repeat(60));
    }

    println!("📰 Top Articles\n");
    for (offset, article) in session.current_page().iter().enumerate() {
        println!("{}. {}", pager.first_ordinal() + offset, article.title);
        println!("   {}", article.summary);
        println!("   🔗 {}\n", article.url);
    }

    if pager.total_pages() > 1 {
        println!(
            "Page {} of {}",
            pager.current_page(),
            pager.total_pages()
        );
    }
}

fn menu(session: &Session) -> String {
    let pager = session.pager();
    let mut options = Vec::new();
    if pager.has_previous() {
        options.push("[p] ◀ Previous");
    }
    if pager.has_next() {
        options.push("[n] Next ▶");
    }
    options.extend([
        "[e] 📥 Export page",
        "[a] 📥 Export all",
        "[t] New topic",
        "[q] Quit",
    ]);
    format!("\n{}\n> ", options.join("  "))
}

async fn fetch(pipeline: &NewsPipeline, topic: &str) -> Option<Session> {
    println!("\n📡 Fetching and summarizing the latest news on \"{}\"...", topic);
    println!("  (This may take a minute...)");

    let session = pipeline.refresh(topic).await;
    match &session {
        Some(session) => println!("✓ Found {} articles", session.articles().len()),
        None => println!("❌ No articles found. Try a different topic."),
    }
    session
}

fn confirm_download(document: &ExportedDocument, dir: &Path) -> Result<()> {
    let target = dir.join(&document.file_name);
    let answer = prompt_line(&format!("⬇️  Save {}? [Y/n] ", target.display()))?;
    if matches!(answer.as_deref(), Some("n") | Some("N") | None) {
        println!("Skipped.");
        return Ok(());
    }

    let path = save_document(document, dir)?;
    println!("✅ Saved to: {}", path.display());
    Ok(())
}

fn export_and_confirm(result: Result<ExportedDocument>, dir: &Path) {
    let outcome = result
        .context("Failed to build PDF")
        .and_then(|document| confirm_download(&document, dir));
    if let Err(e) = outcome {
        tracing::error!("{:#}", e);
        println!("⚠ Export failed: {:#}", e);
    }
}

async fn interactive(pipeline: &NewsPipeline, first_topic: String, output_dir: PathBuf) -> Result<()> {
    let mut session = fetch(pipeline, &first_topic).await;

    loop {
        let current = match session.as_mut() {
            Some(current) => current,
            None => {
                match prompt_topic()? {
                    Some(topic) => session = fetch(pipeline, &topic).await,
                    None => return Ok(()),
                }
                continue;
            }
        };

        render(current);
        let Some(choice) = prompt_line(&menu(current))? else {
            return Ok(());
        };

        match choice.as_str() {
            "n" => {
                current.next_page();
            }
            "p" => {
                current.previous_page();
            }
            "e" => export_and_confirm(current.export_current_page(), &output_dir),
            "a" => export_and_confirm(current.export_all(), &output_dir),
            "t" => {
                let Some(topic) = prompt_topic()? else {
                    return Ok(());
                };
                // A failed fetch keeps what is on screen
                if let Some(fresh) = fetch(pipeline, &topic).await {
                    session = Some(fresh);
                }
            }
            "q" => return Ok(()),
            other => println!("Unknown choice: {:?}", other),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::from_env()?;
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    if let Some(fetch_size) = args.fetch_size {
        config.fetch_size = fetch_size;
    }

    let source = NewsApiClient::new(
        config.news_api_key.clone(),
        &config.news_api_url,
        config.http_timeout,
    )?;
    let generator = LocalModelProcess::new(config.model_command.clone(), config.summary_timeout)
        .with_args(config.model_args.clone());
    let pipeline = NewsPipeline::new(
        Box::new(source),
        NarrativeSummarizer::new(Box::new(generator), config.model.clone()),
        config.fetch_size.get(),
        config.page_size,
    );
    tracing::debug!(
        "Using model {} via {} {}",
        config.model,
        config.model_command,
        config.model_args.join(" ")
    );

    let output_dir = args.output.unwrap_or_else(get_default_download_dir);

    println!("🗞️  Daily News Summarizer");

    let topic = match args.topic {
        Some(topic) => topic,
        None => match prompt_topic()? {
            Some(topic) => topic,
            None => return Ok(()),
        },
    };

    let Some(mode) = args.export else {
        return interactive(&pipeline, topic, output_dir).await;
    };

    let Some(session) = fetch(&pipeline, &topic).await else {
        return Ok(());
    };

    let document = match mode {
        ExportMode::Page => session.export_current_page(),
        ExportMode::All => session.export_all(),
    }
    .context("Failed to build PDF")?;

    let path = save_document(&document, &output_dir)?;
    println!("\n✅ PDF saved to: {}", path.display());

    Ok(())
}
