//! Commit planning for validated import rows
//!
//! Selects the rows worth importing, discovers categories that have to be
//! created, and hands both lists to the host through a [`CommitSink`]. Ids
//! and persistence belong to the host.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Category, NewCategory, NewTransaction, ParsedRow, TransactionType};

/// Colors assigned to newly discovered categories
pub const DEFAULT_PALETTE: &[&str] = &[
    "#ef4444", "#f97316", "#eab308", "#22c55e", "#14b8a6", "#3b82f6", "#8b5cf6", "#ec4899",
];

/// Strategy for choosing a category color.
///
/// `index` is the position of the new category within one commit plan.
pub trait ColorPicker {
    fn pick(&self, index: usize) -> String;
}

/// Deterministic: walks the palette in order, wrapping around
#[derive(Debug, Clone)]
pub struct PaletteCycle {
    palette: Vec<String>,
}

impl PaletteCycle {
    pub fn new(palette: Vec<String>) -> Self {
        Self { palette }
    }
}

impl Default for PaletteCycle {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect())
    }
}

impl ColorPicker for PaletteCycle {
    fn pick(&self, index: usize) -> String {
        if self.palette.is_empty() {
            return DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()].to_string();
        }
        self.palette[index % self.palette.len()].clone()
    }
}

/// Uniform random choice from the palette.
///
/// With a seed the choice is a pure function of `(seed, index)`; without one
/// it draws from the thread-local generator.
#[derive(Debug, Clone)]
pub struct RandomPalette {
    palette: Vec<String>,
    seed: Option<u64>,
}

impl RandomPalette {
    pub fn new(palette: Vec<String>) -> Self {
        Self {
            palette,
            seed: None,
        }
    }

    pub fn seeded(palette: Vec<String>, seed: u64) -> Self {
        Self {
            palette,
            seed: Some(seed),
        }
    }
}

impl Default for RandomPalette {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect())
    }
}

impl ColorPicker for RandomPalette {
    fn pick(&self, index: usize) -> String {
        let palette: Vec<&str> = if self.palette.is_empty() {
            DEFAULT_PALETTE.to_vec()
        } else {
            self.palette.iter().map(String::as_str).collect()
        };

        let choice = match self.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
                palette.choose(&mut rng).copied()
            }
            None => palette.choose(&mut rand::thread_rng()).copied(),
        };
        // palette is never empty here
        choice.unwrap_or(DEFAULT_PALETTE[0]).to_string()
    }
}

/// What the host is asked to persist
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommitPlan {
    pub transactions: Vec<NewTransaction>,
    pub new_categories: Vec<NewCategory>,
}

impl CommitPlan {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.new_categories.is_empty()
    }
}

/// Host-side persistence of a commit plan
pub trait CommitSink {
    /// Persist accepted transactions and create the new categories.
    ///
    /// The sink assigns ids, including resolving the category of
    /// transactions whose category is created in the same commit.
    fn commit(
        &mut self,
        transactions: Vec<NewTransaction>,
        new_categories: Vec<NewCategory>,
    ) -> Result<()>;
}

/// Build a commit plan from validated rows.
///
/// Only `ok` rows are imported. Category names that did not resolve are
/// deduplicated by exact spelling, filtered against existing categories
/// ignoring case, and given a color from `colors`.
pub fn prepare_commit(
    rows: &[ParsedRow],
    categories: &[Category],
    colors: &dyn ColorPicker,
) -> CommitPlan {
    let selected: Vec<&ParsedRow> = rows.iter().filter(|r| r.is_ok()).collect();

    let mut names: Vec<&str> = Vec::new();
    for tx in selected.iter().filter_map(|r| r.transaction.as_ref()) {
        if tx.kind != TransactionType::Expense || tx.category_id.is_some() {
            continue;
        }
        if let Some(name) = tx.category_name.as_deref() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    let new_categories: Vec<NewCategory> = names
        .into_iter()
        .filter(|name| !categories.iter().any(|c| c.matches_name(name)))
        .enumerate()
        .map(|(i, name)| NewCategory {
            name: name.to_string(),
            color: colors.pick(i),
        })
        .collect();

    let transactions: Vec<NewTransaction> = selected
        .iter()
        .filter_map(|r| r.transaction.clone())
        .collect();

    debug!(
        skipped = rows.len() - transactions.len(),
        "Prepared commit of {} transactions and {} new categories",
        transactions.len(),
        new_categories.len()
    );
    CommitPlan {
        transactions,
        new_categories,
    }
}

/// Hand a plan to the sink, skipping the call entirely when there is nothing
/// to persist.
pub fn commit_plan(plan: CommitPlan, sink: &mut dyn CommitSink) -> Result<()> {
    if plan.is_empty() {
        debug!("Nothing to commit");
        return Ok(());
    }
    info!(
        "Committing {} transactions, {} new categories",
        plan.transactions.len(),
        plan.new_categories.len()
    );
    sink.commit(plan.transactions, plan.new_categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn expense(description: &str, category_id: Option<i64>) -> NewTransaction {
        NewTransaction {
            account_id: 1,
            description: description.into(),
            amount: 10.0,
            date: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            kind: TransactionType::Expense,
            category_id,
            category_name: None,
        }
    }

    fn expense_in(description: &str, category: &str) -> NewTransaction {
        NewTransaction {
            category_name: Some(category.into()),
            ..expense(description, None)
        }
    }

    fn existing_categories() -> Vec<Category> {
        vec![Category {
            id: 1,
            name: "Spesa".into(),
            color: "#22c55e".into(),
        }]
    }

    #[test]
    fn test_only_ok_rows_are_selected() {
        let rows = vec![
            ParsedRow::error(2, "Row 2: invalid date \"x\""),
            ParsedRow::ok(3, expense("Pane", None)),
            ParsedRow::duplicate(4, expense("Latte", None)),
            ParsedRow::ok(5, expense("Uova", None)),
        ];
        let plan = prepare_commit(&rows, &[], &PaletteCycle::default());
        let descriptions: Vec<&str> = plan
            .transactions
            .iter()
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["Pane", "Uova"]);
    }

    #[test]
    fn test_new_categories_deduplicated_and_filtered() {
        let rows = vec![
            ParsedRow::ok(2, expense_in("Cinema", "Svago")),
            ParsedRow::ok(3, expense_in("Teatro", "Svago")),
            ParsedRow::ok(4, expense_in("Concerto", "svago")),
            ParsedRow::ok(5, expense_in("Mercato", "SPESA")),
            ParsedRow::duplicate(6, expense_in("Palestra", "Sport")),
        ];
        let plan = prepare_commit(&rows, &existing_categories(), &PaletteCycle::default());
        let names: Vec<&str> = plan
            .new_categories
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        // exact-spelling dedup keeps both casings; "SPESA" already exists;
        // duplicates never contribute
        assert_eq!(names, vec!["Svago", "svago"]);
        assert_eq!(plan.new_categories[0].color, DEFAULT_PALETTE[0]);
        assert_eq!(plan.new_categories[1].color, DEFAULT_PALETTE[1]);
    }

    #[test]
    fn test_resolved_categories_are_not_recreated() {
        let rows = vec![ParsedRow::ok(2, expense("Mercato", Some(1)))];
        let plan = prepare_commit(&rows, &existing_categories(), &PaletteCycle::default());
        assert!(plan.new_categories.is_empty());
        assert_eq!(plan.transactions.len(), 1);
    }

    #[test]
    fn test_palette_cycle_wraps() {
        let picker = PaletteCycle::new(vec!["#000".into(), "#fff".into()]);
        assert_eq!(picker.pick(0), "#000");
        assert_eq!(picker.pick(1), "#fff");
        assert_eq!(picker.pick(2), "#000");
    }

    #[test]
    fn test_seeded_random_palette_is_deterministic() {
        let palette: Vec<String> = DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect();
        let a = RandomPalette::seeded(palette.clone(), 42);
        let b = RandomPalette::seeded(palette.clone(), 42);
        for i in 0..16 {
            assert_eq!(a.pick(i), b.pick(i));
            assert!(palette.contains(&a.pick(i)));
        }
    }

    #[test]
    fn test_unseeded_random_palette_stays_in_palette() {
        let picker = RandomPalette::new(vec!["#123456".into()]);
        assert_eq!(picker.pick(0), "#123456");
        assert_eq!(picker.pick(9), "#123456");
    }

    struct RecordingSink {
        calls: Vec<(usize, usize)>,
    }

    impl CommitSink for RecordingSink {
        fn commit(
            &mut self,
            transactions: Vec<NewTransaction>,
            new_categories: Vec<NewCategory>,
        ) -> Result<()> {
            self.calls.push((transactions.len(), new_categories.len()));
            Ok(())
        }
    }

    #[test]
    fn test_commit_plan_skips_empty_plans() {
        let mut sink = RecordingSink { calls: Vec::new() };
        commit_plan(CommitPlan::default(), &mut sink).unwrap();
        assert!(sink.calls.is_empty());

        let rows = vec![ParsedRow::ok(2, expense_in("Cinema", "Svago"))];
        let plan = prepare_commit(&rows, &[], &PaletteCycle::default());
        commit_plan(plan, &mut sink).unwrap();
        assert_eq!(sink.calls, vec![(1, 1)]);
    }
}
