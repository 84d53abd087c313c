//! Deduplication signatures
//!
//! Two transactions describe the same real-world event when they share the
//! day, the account, the amount to the cent and the description (ignoring
//! case and surrounding whitespace). Existing transactions and freshly parsed
//! rows go through the same normalization so detection is symmetric.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::{NewTransaction, Transaction};

/// Normalized dedup key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Day in ISO form (YYYY-MM-DD)
    pub day: String,
    pub account_id: i64,
    /// Amount fixed to two decimals
    pub amount: String,
    /// Lower-cased, trimmed description
    pub description: String,
}

impl Signature {
    pub fn new(date: &DateTime<Utc>, account_id: i64, amount: f64, description: &str) -> Self {
        Self {
            day: date.date_naive().format("%Y-%m-%d").to_string(),
            account_id,
            amount: format!("{:.2}", amount),
            description: description.trim().to_lowercase(),
        }
    }
}

impl From<&Transaction> for Signature {
    fn from(tx: &Transaction) -> Self {
        Signature::new(&tx.date, tx.account_id, tx.amount, &tx.description)
    }
}

impl From<&NewTransaction> for Signature {
    fn from(tx: &NewTransaction) -> Self {
        Signature::new(&tx.date, tx.account_id, tx.amount, &tx.description)
    }
}

/// Precomputed signatures of the recorded transaction history.
///
/// Built once per import and handed to the validator for O(1) lookups.
#[derive(Debug, Clone, Default)]
pub struct SignatureSet {
    inner: HashSet<Signature>,
}

impl SignatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        Self {
            inner: transactions.into_iter().map(Signature::from).collect(),
        }
    }

    pub fn contains(&self, signature: &Signature) -> bool {
        self.inner.contains(signature)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
