//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_ledger` / `load_config` - Shared loaders
//! - `cmd_init` - Create a ledger
//! - `cmd_accounts`, `cmd_categories` - List reference data

use std::path::Path;

use anyhow::{bail, Context, Result};
use tally_core::Config;

use crate::ledger::Ledger;

use super::truncate;

pub fn open_ledger(path: &Path) -> Result<Ledger> {
    Ledger::load(path)
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).context("Failed to load configuration")
}

pub fn cmd_init(ledger_path: &Path, accounts: &[String]) -> Result<()> {
    if ledger_path.exists() {
        bail!("Ledger already exists at {}", ledger_path.display());
    }

    println!("🔧 Creating ledger at {}...", ledger_path.display());

    let ledger = Ledger::with_accounts(accounts)?;
    ledger.save(ledger_path)?;

    for account in &ledger.accounts {
        println!("   Added account: {}", account.name);
    }

    println!("✅ Ledger initialized successfully!");
    println!();
    println!("Next steps:");
    if ledger.accounts.is_empty() {
        println!("  0. Re-run with --account NAME for each account in your files");
    }
    println!("  1. Check a file: tally import --file statement.csv");
    println!("  2. Import it:    tally import --file statement.csv --apply");
    println!("  3. Analyze:      tally analyze --month YYYY-MM");

    Ok(())
}

pub fn cmd_accounts(ledger_path: &Path) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;

    if ledger.accounts.is_empty() {
        println!("No accounts. Create the ledger with: tally init --account NAME");
        return Ok(());
    }

    println!("🏦 Accounts");
    println!("   ─────────────────────────────");
    for account in &ledger.accounts {
        let count = ledger
            .transactions
            .iter()
            .filter(|t| t.account_id == account.id)
            .count();
        println!(
            "   {:>3}  {:<24} {} transactions",
            account.id,
            truncate(&account.name, 24),
            count
        );
    }

    Ok(())
}

pub fn cmd_categories(ledger_path: &Path) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;

    if ledger.categories.is_empty() {
        println!("No categories yet. They are created when an import names them.");
        return Ok(());
    }

    println!("🏷️  Categories");
    println!("   ─────────────────────────────");
    for category in &ledger.categories {
        println!(
            "   {:>3}  {:<24} {}",
            category.id,
            truncate(&category.name, 24),
            category.color
        );
    }

    Ok(())
}
