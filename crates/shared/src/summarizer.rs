use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Upper bound on article excerpts fed into one prompt
pub const MAX_EXCERPTS: usize = 20;

pub const DEFAULT_MODEL: &str = "mistral";

/// Arguments for `ollama`; `{model}` is substituted at call time
pub const DEFAULT_MODEL_ARGS: [&str; 2] = ["run", "{model}"];

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Text generation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Text generation exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("IO error while talking to the model: {0}")]
    Io(#[from] std::io::Error),
}

/// A synchronous-looking text generation service: one prompt in, one
/// complete response out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}

/// Runs a local inference command (by default `ollama run <model>`) with the
/// prompt on stdin and collects stdout.
#[derive(Debug, Clone)]
pub struct LocalModelProcess {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl LocalModelProcess {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: DEFAULT_MODEL_ARGS.iter().map(|arg| arg.to_string()).collect(),
            timeout,
        }
    }

    /// Replaces the argument list; `{model}` is substituted at call time
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    fn command_args(&self, model: &str) -> Vec<String> {
        self.args.iter().map(|arg| arg.replace("{model}", model)).collect()
    }
}

#[async_trait]
impl TextGenerator for LocalModelProcess {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let mut child = Command::new(&self.program)
            .args(self.command_args(model))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GenerationError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let run = async move {
            if let Some(mut stdin) = stdin {
                // A process that exits without reading its input is judged by its exit status
                match stdin.write_all(prompt.as_bytes()).await {
                    Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e),
                    _ => {}
                }
            }
            child.wait_with_output().await
        };

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| GenerationError::TimedOut(self.timeout))??;

        if !output.status.success() {
            return Err(GenerationError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

pub fn build_prompt(topic: &str, excerpts: &[String]) -> String {
    let mut prompt = format!(
        "Create a concise paragraph (4-5 sentences) summarizing the key developments in {topic} today. \
        Combine all the news into one coherent summary that captures the main trends and important events. \
        Focus on what's most significant and newsworthy. Start with: \"Today's news about {topic} reveals...\"\n\n\
        Here are the article summaries to analyze:\n"
    );

    let lines: Vec<String> = excerpts
        .iter()
        .take(MAX_EXCERPTS)
        .map(|excerpt| format!("- {}", excerpt))
        .collect();
    prompt.push_str(&lines.join("\n"));

    prompt
}

pub struct NarrativeSummarizer {
    generator: Box<dyn TextGenerator>,
    model: String,
}

impl NarrativeSummarizer {
    pub fn new(generator: Box<dyn TextGenerator>, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn try_summarize(
        &self,
        topic: &str,
        excerpts: &[String],
    ) -> Result<String, GenerationError> {
        let prompt = build_prompt(topic, excerpts);
        tracing::debug!(
            "Prompting {} with {} excerpt(s), {} bytes",
            self.model,
            excerpts.len().min(MAX_EXCERPTS),
            prompt.len()
        );

        let narrative = self.generator.generate(&self.model, &prompt).await?;
        Ok(narrative.trim().to_string())
    }

    /// Like [`try_summarize`](Self::try_summarize), but any failure becomes an
    /// empty narrative
    pub async fn summarize(&self, topic: &str, excerpts: &[String]) -> String {
        match self.try_summarize(topic, excerpts).await {
            Ok(narrative) => {
                if narrative.is_empty() {
                    tracing::warn!("{} returned no output for \"{}\"", self.model, topic);
                }
                narrative
            }
            Err(e) => {
                tracing::warn!("Summarizing \"{}\" failed: {}", topic, e);
                String::new()
            }
        }
    }
}
