//! Import result counts shown to the user before committing

use serde::Serialize;

use crate::models::{ParsedRow, RowStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub ok: usize,
    pub errors: usize,
    pub duplicates: usize,
    pub total: usize,
}

impl ImportSummary {
    pub fn from_rows(rows: &[ParsedRow]) -> Self {
        rows.iter().fold(Self::default(), |mut acc, row| {
            match row.status {
                RowStatus::Ok => acc.ok += 1,
                RowStatus::Error => acc.errors += 1,
                RowStatus::Duplicate => acc.duplicates += 1,
            }
            acc.total += 1;
            acc
        })
    }

    /// Whether anything can be imported
    pub fn has_importable(&self) -> bool {
        self.ok > 0
    }
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rows: {} ok, {} errors, {} duplicates",
            self.total, self.ok, self.errors, self.duplicates
        )
    }
}
