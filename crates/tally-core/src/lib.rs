//! Tally Core Library
//!
//! Shared functionality for the Tally household ledger:
//! - CSV import parsing and row validation
//! - Duplicate detection against recorded transactions
//! - Commit planning, including categories discovered during import
//! - Period statistics and pluggable local AI summaries (Ollama, OpenAI-compatible)
//! - A small markdown renderer for the AI output
//! - Layered TOML + environment configuration

pub mod ai;
pub mod analysis;
pub mod commit;
pub mod config;
pub mod error;
pub mod import;
pub mod markdown;
pub mod models;
pub mod signature;
pub mod summary;

/// Test utilities including a mock AI server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    build_prompt, MockSummarizer, OllamaSummarizer, OpenAICompatibleSummarizer, Summarizer,
    SummaryClient,
};
pub use analysis::{CategoryTotal, LargestExpense, Period, PeriodStats, UNCATEGORIZED};
pub use commit::{
    commit_plan, prepare_commit, ColorPicker, CommitPlan, CommitSink, PaletteCycle, RandomPalette,
    DEFAULT_PALETTE,
};
pub use config::{AiConfig, BackendKind, Config};
pub use error::{Error, Result};
pub use import::{parse_import, read_import_file};
pub use models::*;
pub use signature::{Signature, SignatureSet};
pub use summary::ImportSummary;
