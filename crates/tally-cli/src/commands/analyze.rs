//! Period analysis command

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tally_core::{markdown, Config, Period, PeriodStats, Summarizer, SummaryClient};
use tracing::warn;

use super::{money, open_ledger, truncate};

/// Resolve the analyze flags into a period.
///
/// `--from`/`--to` win over `--month`; with neither, the month containing
/// `today` is used.
pub fn resolve_period(
    month: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<Period> {
    match (from, to) {
        (Some(from), Some(to)) => {
            let from_date = NaiveDate::parse_from_str(from, "%Y-%m-%d")
                .context("Invalid --from date format (use YYYY-MM-DD)")?;
            let to_date = NaiveDate::parse_from_str(to, "%Y-%m-%d")
                .context("Invalid --to date format (use YYYY-MM-DD)")?;
            Ok(Period::new(from_date, to_date)?)
        }
        (Some(_), None) | (None, Some(_)) => bail!("--from and --to must be used together"),
        (None, None) => match month {
            Some(month) => Ok(Period::parse_month(month)?),
            None => Ok(Period::current_month(today)),
        },
    }
}

pub async fn cmd_analyze(
    ledger_path: &Path,
    config: &Config,
    period: Period,
    no_ai: bool,
) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;
    let stats = PeriodStats::compute(&ledger.transactions, &ledger.categories, period);

    print_stats(&stats);

    if stats.is_empty() || no_ai {
        return Ok(());
    }

    let Some(client) = SummaryClient::from_config(&config.ai) else {
        println!();
        println!("💡 Tip: Set OLLAMA_HOST to enable the AI analysis");
        return Ok(());
    };

    println!();
    println!("🤖 Asking {} at {}...", client.model(), client.host());

    // The analysis is optional; a failing backend never fails the command
    match client.summarize(&stats).await {
        Ok(text) => {
            println!();
            println!("{}", markdown::render_terminal(&markdown::parse(&text)));
        }
        Err(e) => {
            warn!("AI analysis failed: {}", e);
            println!("   ⚠️  AI analysis unavailable: {}", e);
        }
    }

    Ok(())
}

fn print_stats(stats: &PeriodStats) {
    println!("📊 {}", stats.period);
    println!("   ─────────────────────────────");

    if stats.is_empty() {
        println!("   No transactions in this period.");
        return;
    }

    println!("   Income:       {:>12}", money(stats.income));
    println!("   Expenses:     {:>12}", money(stats.expenses));
    println!("   Net:          {:>12}", money(stats.net));
    if let Some(rate) = stats.savings_rate {
        println!("   Savings rate: {:>11.1}%", rate * 100.0);
    }
    println!("   Transactions: {:>12}", stats.transaction_count);

    if !stats.categories.is_empty() {
        println!();
        println!("   By category:");
        for c in &stats.categories {
            println!(
                "   {:<24} {:>12}  {:>5.1}%  ({})",
                truncate(&c.name, 24),
                money(c.total),
                c.share * 100.0,
                c.count
            );
        }
    }

    if let Some(ref largest) = stats.largest_expense {
        println!();
        println!(
            "   Largest expense: {} ({}) on {}",
            largest.description,
            money(largest.amount),
            largest.date
        );
    }
}
