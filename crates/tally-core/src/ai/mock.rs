//! Mock backend for testing
//!
//! Builds a predictable markdown analysis straight from the stats, so tests
//! and offline development work without a running model.

use async_trait::async_trait;

use crate::analysis::PeriodStats;
use crate::error::{Error, Result};

use super::Summarizer;

#[derive(Clone, Default)]
pub struct MockSummarizer {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Fixed reply; generated from the stats when None
    pub reply: Option<String>,
}

impl MockSummarizer {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            reply: None,
        }
    }

    /// Create an unhealthy mock backend whose calls fail
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            reply: None,
        }
    }

    pub fn with_reply(reply: &str) -> Self {
        Self {
            healthy: true,
            reply: Some(reply.to_string()),
        }
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, stats: &PeriodStats) -> Result<String> {
        if !self.healthy {
            return Err(Error::Ai("Mock backend is unhealthy".into()));
        }
        if let Some(ref reply) = self.reply {
            return Ok(reply.clone());
        }

        let mut text = format!(
            "## Summary for {}\n\nYou spent **{:.2}** against **{:.2}** of income.\n",
            stats.period, stats.expenses, stats.income
        );
        if let Some(top) = stats.categories.first() {
            text.push_str(&format!(
                "\n## Where it went\n\n- **{}** is the largest category at {:.2}\n",
                top.name, top.total
            ));
        }
        Ok(text)
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
