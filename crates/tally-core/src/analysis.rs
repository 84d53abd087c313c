//! Period statistics fed to the AI analysis
//!
//! Aggregates recorded transactions over an inclusive day range into income
//! and expense totals plus a per-category expense breakdown.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Category, Transaction, TransactionType};

/// Label for expenses without a (known) category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidData(format!(
                "Period start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Whole calendar month
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::InvalidData(format!("Invalid month: {}-{:02}", year, month)))?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| Error::InvalidData(format!("Invalid month: {}-{:02}", year, month)))?;
        Ok(Self { start, end })
    }

    /// Parse a `YYYY-MM` month
    pub fn parse_month(s: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map_err(|_| Error::InvalidData(format!("Invalid month (use YYYY-MM): {}", s)))?;
        Self::month(date.year(), date.month())
    }

    /// Month containing `today`
    pub fn current_month(today: NaiveDate) -> Self {
        // day 1 of a valid date's month always exists
        Self::month(today.year(), today.month()).unwrap_or(Self {
            start: today,
            end: today,
        })
    }

    pub fn contains(&self, date: &DateTime<Utc>) -> bool {
        let day = date.date_naive();
        day >= self.start && day <= self.end
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Expense total for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
    pub count: usize,
    /// Fraction of all expenses in the period (0.0 to 1.0)
    pub share: f64,
}

/// Single largest expense in the period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LargestExpense {
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
}

/// Aggregated statistics for one period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStats {
    pub period: Period,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    pub transaction_count: usize,
    /// Sorted by total, largest first
    pub categories: Vec<CategoryTotal>,
    pub largest_expense: Option<LargestExpense>,
    /// Net over income, when there was any income
    pub savings_rate: Option<f64>,
}

impl PeriodStats {
    pub fn compute(transactions: &[Transaction], categories: &[Category], period: Period) -> Self {
        let names: HashMap<i64, &str> = categories
            .iter()
            .map(|c| (c.id, c.name.as_str()))
            .collect();

        let mut income = 0.0;
        let mut expenses = 0.0;
        let mut count = 0;
        let mut by_category: HashMap<&str, (f64, usize)> = HashMap::new();
        let mut largest: Option<&Transaction> = None;

        for tx in transactions.iter().filter(|t| period.contains(&t.date)) {
            count += 1;
            match tx.kind {
                TransactionType::Income => income += tx.amount,
                TransactionType::Expense => {
                    expenses += tx.amount;
                    let label = tx
                        .category_id
                        .and_then(|id| names.get(&id).copied())
                        .unwrap_or(UNCATEGORIZED);
                    let entry = by_category.entry(label).or_insert((0.0, 0));
                    entry.0 += tx.amount;
                    entry.1 += 1;
                    if largest.map_or(true, |l| tx.amount > l.amount) {
                        largest = Some(tx);
                    }
                }
            }
        }

        let mut categories: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(name, (total, count))| CategoryTotal {
                name: name.to_string(),
                total,
                count,
                share: if expenses > 0.0 { total / expenses } else { 0.0 },
            })
            .collect();
        categories.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });

        let net = income - expenses;
        Self {
            period,
            income,
            expenses,
            net,
            transaction_count: count,
            categories,
            largest_expense: largest.map(|t| LargestExpense {
                description: t.description.clone(),
                amount: t.amount,
                date: t.date.date_naive(),
            }),
            savings_rate: (income > 0.0).then(|| net / income),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }
}
