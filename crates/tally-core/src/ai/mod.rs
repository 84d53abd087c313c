//! Pluggable local AI summarizer
//!
//! Turns [`PeriodStats`] into a short markdown analysis written by a local
//! model. The import pipeline never depends on this module.
//!
//! # Architecture
//!
//! - `Summarizer` trait: the interface every backend implements
//! - `SummaryClient` enum: Clone + compile-time dispatch over the backends
//! - Backends: `OllamaSummarizer`, `OpenAICompatibleSummarizer`, `MockSummarizer`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = Config::load(None)?;
//! if let Some(client) = SummaryClient::from_config(&config.ai) {
//!     let text = client.summarize(&stats).await?;
//!     println!("{}", markdown::render_terminal(&markdown::parse(&text)));
//! }
//! ```

mod mock;
mod ollama;
mod openai_compatible;

pub use mock::MockSummarizer;
pub use ollama::OllamaSummarizer;
pub use openai_compatible::OpenAICompatibleSummarizer;

use async_trait::async_trait;

use crate::analysis::PeriodStats;
use crate::config::{AiConfig, BackendKind};
use crate::error::Result;

/// Interface for all summarizer backends
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Write a markdown analysis of the period
    async fn summarize(&self, stats: &PeriodStats) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Model name (for logging)
    fn model(&self) -> &str;

    /// Host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete summarizer client
#[derive(Clone)]
pub enum SummaryClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaSummarizer),
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleSummarizer),
    /// Mock backend for testing
    Mock(MockSummarizer),
}

impl SummaryClient {
    /// Build a client from config.
    ///
    /// Returns None when the selected backend has no host configured; the
    /// AI analysis is then simply skipped.
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        match config.backend {
            BackendKind::Ollama => config.ollama_host.as_deref().map(|host| {
                SummaryClient::Ollama(OllamaSummarizer::new(
                    host,
                    &config.ollama_model,
                    config.timeout,
                ))
            }),
            BackendKind::OpenAICompatible => config.openai_host.as_deref().map(|host| {
                SummaryClient::OpenAICompatible(OpenAICompatibleSummarizer::new(
                    host,
                    &config.openai_model,
                    config.openai_api_key.as_deref(),
                    config.timeout,
                ))
            }),
            BackendKind::Mock => Some(SummaryClient::Mock(MockSummarizer::new())),
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        SummaryClient::Mock(MockSummarizer::new())
    }
}

#[async_trait]
impl Summarizer for SummaryClient {
    async fn summarize(&self, stats: &PeriodStats) -> Result<String> {
        match self {
            SummaryClient::Ollama(b) => b.summarize(stats).await,
            SummaryClient::OpenAICompatible(b) => b.summarize(stats).await,
            SummaryClient::Mock(b) => b.summarize(stats).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            SummaryClient::Ollama(b) => b.health_check().await,
            SummaryClient::OpenAICompatible(b) => b.health_check().await,
            SummaryClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            SummaryClient::Ollama(b) => b.model(),
            SummaryClient::OpenAICompatible(b) => b.model(),
            SummaryClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            SummaryClient::Ollama(b) => b.host(),
            SummaryClient::OpenAICompatible(b) => b.host(),
            SummaryClient::Mock(b) => b.host(),
        }
    }
}

/// Render the analysis prompt for a period.
///
/// Amounts use two decimals and a dot separator regardless of locale.
pub fn build_prompt(stats: &PeriodStats) -> String {
    let mut prompt = format!(
        "You are a personal finance assistant. Analyze the household budget for {}.\n\n",
        stats.period
    );
    prompt.push_str("Totals:\n");
    prompt.push_str(&format!("- Income: {:.2}\n", stats.income));
    prompt.push_str(&format!("- Expenses: {:.2}\n", stats.expenses));
    prompt.push_str(&format!("- Net: {:.2}\n", stats.net));
    prompt.push_str(&format!("- Transactions: {}\n", stats.transaction_count));
    if let Some(rate) = stats.savings_rate {
        prompt.push_str(&format!("- Savings rate: {:.1}%\n", rate * 100.0));
    }

    if !stats.categories.is_empty() {
        prompt.push_str("\nExpenses by category:\n");
        for c in &stats.categories {
            prompt.push_str(&format!(
                "- {}: {:.2} ({} transactions, {:.1}%)\n",
                c.name,
                c.total,
                c.count,
                c.share * 100.0
            ));
        }
    }

    if let Some(ref largest) = stats.largest_expense {
        prompt.push_str(&format!(
            "\nLargest expense: {} ({:.2}) on {}\n",
            largest.description, largest.amount, largest.date
        ));
    }

    prompt.push_str(
        "\nWrite a short analysis in markdown using `##` headings, `-` bullet points \
         and **bold** for key figures. Point out where the money went and suggest \
         one or two concrete ways to save. Do not invent numbers.",
    );
    prompt
}
