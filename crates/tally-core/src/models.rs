//! Data models for Tally

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bank or cash account known to the host application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
}

impl Account {
    /// Case-insensitive exact name match
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// An expense category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Display color, e.g. "#3b82f6"
    pub color: String,
}

impl Category {
    /// Case-insensitive exact name match
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// A category discovered during import that the host still has to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
}

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Classify a `tipo` column value.
    ///
    /// `entrata` and `income` (any case) are income; anything else,
    /// including an empty value, is an expense.
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "entrata" | "income" => Self::Income,
            _ => Self::Expense,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    pub description: String,
    /// Always positive; direction is carried by `kind`
    pub amount: f64,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub category_id: Option<i64>,
}

/// A transaction that has not been committed yet (no id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub account_id: i64,
    pub description: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Category named in the import that does not exist yet; the host
    /// resolves it once the category is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

impl NewTransaction {
    /// Attach a host-assigned id
    pub fn into_transaction(self, id: i64) -> Transaction {
        Transaction {
            id,
            account_id: self.account_id,
            description: self.description,
            amount: self.amount,
            date: self.date,
            kind: self.kind,
            category_id: self.category_id,
        }
    }
}

/// Classification of one import row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Ok,
    Error,
    Duplicate,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Duplicate => "duplicate",
        }
    }
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of validating a single CSV data row.
///
/// Rows only live for one import session. `error` rows carry no candidate
/// transaction; `ok` and `duplicate` rows always do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRow {
    /// 1-based row number, the header being row 1
    pub row: usize,
    pub status: RowStatus,
    pub message: Option<String>,
    pub transaction: Option<NewTransaction>,
}

impl ParsedRow {
    pub fn ok(row: usize, transaction: NewTransaction) -> Self {
        Self {
            row,
            status: RowStatus::Ok,
            message: None,
            transaction: Some(transaction),
        }
    }

    pub fn duplicate(row: usize, transaction: NewTransaction) -> Self {
        Self {
            row,
            status: RowStatus::Duplicate,
            message: Some(format!("Row {}: duplicate of an existing transaction", row)),
            transaction: Some(transaction),
        }
    }

    pub fn error(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            status: RowStatus::Error,
            message: Some(message.into()),
            transaction: None,
        }
    }

    /// Category name still waiting to be created, if any
    pub fn pending_category(&self) -> Option<&str> {
        self.transaction
            .as_ref()
            .and_then(|tx| tx.category_name.as_deref())
    }

    pub fn is_ok(&self) -> bool {
        self.status == RowStatus::Ok
    }
}
