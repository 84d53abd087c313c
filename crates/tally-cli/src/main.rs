//! Tally CLI - household ledger with validated CSV import
//!
//! Usage:
//!   tally init --account "Conto Corrente"   Create a ledger
//!   tally import --file gennaio.csv         Validate a CSV (dry run)
//!   tally import --file gennaio.csv --apply Import it
//!   tally analyze --month 2024-01           Period statistics + AI analysis

mod cli;
mod commands;
mod ledger;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init { accounts } => commands::cmd_init(&cli.ledger, &accounts),
        Commands::Import {
            file,
            apply,
            seed,
            json,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_import(&cli.ledger, &config, &file, apply, seed, json)
        }
        Commands::Analyze {
            month,
            from,
            to,
            no_ai,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let period = commands::resolve_period(
                month.as_deref(),
                from.as_deref(),
                to.as_deref(),
                chrono::Local::now().date_naive(),
            )?;
            commands::cmd_analyze(&cli.ledger, &config, period, no_ai).await
        }
        Commands::Accounts => commands::cmd_accounts(&cli.ledger),
        Commands::Categories => commands::cmd_categories(&cli.ledger),
    }
}
