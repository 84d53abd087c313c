//! CSV import command

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use tally_core::{
    commit_plan, parse_import, prepare_commit, read_import_file, ColorPicker, CommitPlan, Config,
    ImportSummary, ParsedRow, RandomPalette, RowStatus,
};

use crate::ledger::Ledger;

use super::{money, open_ledger, truncate};

/// Everything one import run produced, as printed by `--json`
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub rows: Vec<ParsedRow>,
    pub summary: ImportSummary,
    pub plan: CommitPlan,
    pub applied: bool,
}

/// Color strategy for new categories; seeded runs are reproducible
pub fn color_picker(config: &Config, seed: Option<u64>) -> RandomPalette {
    match seed {
        Some(seed) => RandomPalette::seeded(config.palette.clone(), seed),
        None => RandomPalette::new(config.palette.clone()),
    }
}

/// Validate `text` against the ledger and plan the commit
pub fn plan_import(
    ledger: &Ledger,
    text: &str,
    colors: &dyn ColorPicker,
) -> Result<(Vec<ParsedRow>, CommitPlan)> {
    let existing = ledger.signatures();
    let rows = parse_import(text, &ledger.accounts, &ledger.categories, &existing)?;
    let plan = prepare_commit(&rows, &ledger.categories, colors);
    Ok((rows, plan))
}

pub fn cmd_import(
    ledger_path: &Path,
    config: &Config,
    file: &Path,
    apply: bool,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut ledger = open_ledger(ledger_path)?;

    let text = read_import_file(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let (rows, plan) = plan_import(&ledger, &text, &color_picker(config, seed))
        .with_context(|| format!("Failed to import {}", file.display()))?;
    let summary = ImportSummary::from_rows(&rows);

    if !json {
        println!("📥 Checking {}...", file.display());
        print_rows(&ledger, &rows);
        println!();
        println!("📊 {}", summary);
        for category in &plan.new_categories {
            println!("   🏷️  New category: {} ({})", category.name, category.color);
        }
    }

    let applied = apply && !plan.is_empty();
    let report_plan = json.then(|| plan.clone());

    if applied {
        let imported = plan.transactions.len();
        let created = plan.new_categories.len();
        commit_plan(plan, &mut ledger)?;
        ledger.save(ledger_path)?;
        if !json {
            println!();
            println!(
                "✅ Imported {} transactions, created {} categories",
                imported, created
            );
        }
    } else if !json {
        println!();
        if !summary.has_importable() {
            println!("Nothing to import.");
        } else {
            println!("💡 Dry run. Re-run with --apply to import.");
        }
    }

    if json {
        let report = ImportReport {
            rows,
            summary,
            plan: report_plan.unwrap_or_default(),
            applied,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn print_rows(ledger: &Ledger, rows: &[ParsedRow]) {
    for row in rows {
        match row.status {
            RowStatus::Ok => {
                let Some(ref tx) = row.transaction else {
                    continue;
                };
                let account = ledger
                    .accounts
                    .iter()
                    .find(|a| a.id == tx.account_id)
                    .map(|a| a.name.as_str())
                    .unwrap_or("?");
                let category = tx
                    .category_id
                    .and_then(|id| ledger.categories.iter().find(|c| c.id == id))
                    .map(|c| c.name.as_str())
                    .or(tx.category_name.as_deref())
                    .unwrap_or("");
                println!(
                    "   {} {:>4}  {}  {:<28} {:>10}  {:<7} {:<14} {}",
                    "✓".green(),
                    row.row,
                    tx.date.format("%Y-%m-%d"),
                    truncate(&tx.description, 28),
                    money(tx.amount),
                    tx.kind.as_str(),
                    truncate(account, 14),
                    category
                );
            }
            RowStatus::Duplicate => println!(
                "   {} {}",
                "⏭".yellow(),
                row.message.as_deref().unwrap_or_default()
            ),
            RowStatus::Error => println!(
                "   {} {}",
                "✗".red(),
                row.message.as_deref().unwrap_or_default()
            ),
        }
    }
}
