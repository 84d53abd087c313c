//! CLI argument definitions using clap
//!
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Import bank CSVs into a household ledger
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Household ledger with validated CSV import and local AI analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Ledger file (JSON snapshot)
    #[arg(long, default_value = "tally.json", global = true)]
    pub ledger: PathBuf,

    /// Config file (defaults to ~/.config/tally/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty ledger
    Init {
        /// Account to create (repeatable)
        #[arg(short, long = "account")]
        accounts: Vec<String>,
    },

    /// Validate a CSV file and optionally import it
    ///
    /// Expected columns: data, descrizione, importo, tipo, nome_conto and
    /// optionally categoria. Without --apply nothing is written.
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Write accepted rows and new categories to the ledger
        #[arg(long)]
        apply: bool,

        /// Seed for new category colors (deterministic output)
        #[arg(long)]
        seed: Option<u64>,

        /// Print rows, summary and plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show statistics for a period, with an AI analysis when configured
    Analyze {
        /// Calendar month (YYYY-MM); defaults to the current month
        #[arg(short, long, conflicts_with_all = ["from", "to"])]
        month: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// End date (YYYY-MM-DD), inclusive
        #[arg(long, requires = "from")]
        to: Option<String>,

        /// Skip the AI analysis
        #[arg(long)]
        no_ai: bool,
    },

    /// List accounts
    Accounts,

    /// List categories
    Categories,
}
