use anyhow::{Context, Result};
use std::env;
use std::num::{NonZeroU64, NonZeroUsize};
use std::str::FromStr;
use std::time::Duration;

use crate::models::DEFAULT_FETCH_SIZE;
use crate::newsapi::DEFAULT_BASE_URL;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::summarizer::{DEFAULT_MODEL, DEFAULT_MODEL_ARGS};

const APP_DIR: &str = "daily-news";

#[derive(Debug, Clone)]
pub struct Config {
    pub news_api_key: String,
    pub news_api_url: String,
    pub fetch_size: NonZeroUsize,
    pub page_size: NonZeroUsize,
    pub model: String,
    pub model_command: String,
    pub model_args: Vec<String>,
    pub summary_timeout: Duration,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let news_api_key = lookup("NEWS_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .context(
                "NEWS_API_KEY not found.\n\n\
                To fix this, create ~/.config/daily-news/.env with:\n  \
                NEWS_API_KEY=your_key_here\n\n\
                Get your News API key from: https://newsapi.org/register",
            )?;

        let fetch_size = parse_or(&lookup, "NEWS_FETCH_SIZE", default_size(DEFAULT_FETCH_SIZE))?;
        let page_size = parse_or(&lookup, "NEWS_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let summary_timeout = parse_or(&lookup, "SUMMARY_TIMEOUT_SECS", default_secs(300))?;
        let http_timeout = parse_or(&lookup, "HTTP_TIMEOUT_SECS", default_secs(30))?;

        // Whitespace-separated; `{model}` is replaced with the model name
        let model_args: Vec<String> = match lookup("OLLAMA_ARGS") {
            Some(raw) if !raw.trim().is_empty() => {
                raw.split_whitespace().map(String::from).collect()
            }
            _ => DEFAULT_MODEL_ARGS.iter().map(|arg| arg.to_string()).collect(),
        };

        Ok(Self {
            news_api_key,
            news_api_url: lookup("NEWS_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            fetch_size,
            page_size,
            model: lookup("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            model_command: lookup("OLLAMA_COMMAND").unwrap_or_else(|| "ollama".to_string()),
            model_args,
            summary_timeout: Duration::from_secs(summary_timeout.get()),
            http_timeout: Duration::from_secs(http_timeout.get()),
        })
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/daily-news/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join(APP_DIR).join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
    }
}

fn default_size(size: usize) -> NonZeroUsize {
    NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN)
}

fn default_secs(secs: u64) -> NonZeroU64 {
    NonZeroU64::new(secs).unwrap_or(NonZeroU64::MIN)
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a positive number, got \"{}\"", key, raw)),
        None => Ok(default),
    }
}
