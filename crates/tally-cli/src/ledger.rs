//! JSON ledger snapshot
//!
//! The CLI's stand-in for a host application: it supplies accounts,
//! categories and recorded transactions to the importer, and receives
//! commits through [`CommitSink`].

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tally_core::{
    Account, Category, CommitSink, NewCategory, NewTransaction, SignatureSet, Transaction,
};
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Ledger {
    /// New ledger with the given accounts, ids starting at 1
    pub fn with_accounts(names: &[String]) -> Result<Self> {
        let mut ledger = Self::default();
        for name in names {
            ledger.add_account(name)?;
        }
        Ok(ledger)
    }

    pub fn add_account(&mut self, name: &str) -> Result<&Account> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Account name cannot be empty");
        }
        if self.account(name).is_some() {
            bail!("Account '{}' already exists", name);
        }
        let id = next_id(self.accounts.iter().map(|a| a.id));
        self.accounts.push(Account {
            id,
            name: name.to_string(),
        });
        Ok(&self.accounts[self.accounts.len() - 1])
    }

    pub fn account(&self, name: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.matches_name(name))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "Ledger not found at {}. Run 'tally init' first.",
                path.display()
            );
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read ledger {}", path.display()))?;
        let ledger: Self = serde_json::from_str(&content)
            .with_context(|| format!("Ledger {} is not valid JSON", path.display()))?;
        debug!(
            accounts = ledger.accounts.len(),
            categories = ledger.categories.len(),
            transactions = ledger.transactions.len(),
            "Loaded ledger"
        );
        Ok(ledger)
    }

    /// Write the snapshot atomically (temp file in the same directory, then rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, self).context("Failed to encode ledger")?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        tmp.persist(path)
            .with_context(|| format!("Failed to write ledger {}", path.display()))?;
        Ok(())
    }

    pub fn signatures(&self) -> SignatureSet {
        SignatureSet::from_transactions(&self.transactions)
    }
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

impl CommitSink for Ledger {
    fn commit(
        &mut self,
        transactions: Vec<NewTransaction>,
        new_categories: Vec<NewCategory>,
    ) -> tally_core::Result<()> {
        for category in new_categories {
            let id = next_id(self.categories.iter().map(|c| c.id));
            self.categories.push(Category {
                id,
                name: category.name,
                color: category.color,
            });
        }

        let mut id = next_id(self.transactions.iter().map(|t| t.id));
        for mut tx in transactions {
            if let Some(name) = tx.category_name.take() {
                // exact spelling first: "Svago" and "svago" may both be new
                tx.category_id = self
                    .categories
                    .iter()
                    .find(|c| c.name == name)
                    .or_else(|| self.categories.iter().find(|c| c.matches_name(&name)))
                    .map(|c| c.id);
            }
            self.transactions.push(tx.into_transaction(id));
            id += 1;
        }
        Ok(())
    }
}
