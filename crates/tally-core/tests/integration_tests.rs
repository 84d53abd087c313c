//! Integration tests for tally-core
//!
//! These tests exercise the full read → parse → plan → commit workflow and
//! the period analysis that follows it.

use chrono::{TimeZone, Utc};
use tally_core::{
    commit_plan, parse_import, prepare_commit, read_import_file, Account, Category, CommitSink,
    Error, ImportSummary, NewCategory, NewTransaction, PaletteCycle, Period, PeriodStats,
    RandomPalette, RowStatus, SignatureSet, Transaction, TransactionType, DEFAULT_PALETTE,
};

fn accounts() -> Vec<Account> {
    vec![
        Account {
            id: 1,
            name: "A1".into(),
        },
        Account {
            id: 2,
            name: "Carta".into(),
        },
    ]
}

fn categories() -> Vec<Category> {
    vec![
        Category {
            id: 1,
            name: "Spesa".into(),
            color: "#22c55e".into(),
        },
        Category {
            id: 2,
            name: "Trasporti".into(),
            color: "#3b82f6".into(),
        },
    ]
}

fn history() -> Vec<Transaction> {
    vec![Transaction {
        id: 1,
        account_id: 1,
        description: "Coffee".into(),
        amount: 25.0,
        date: Utc.with_ymd_and_hms(2024, 1, 5, 8, 30, 0).unwrap(),
        kind: TransactionType::Expense,
        category_id: None,
    }]
}

/// Mixed file: ok rows, a duplicate, bad rows, a short row and a new category
fn mixed_csv() -> &'static str {
    "data,descrizione,importo,tipo,nome_conto,categoria
2024-01-05,\" coffee \",\"25,00\",uscita,a1,
2024-01-06,Esselunga,82.40,uscita,A1,spesa
2024-01-07,Cinema,12.50,uscita,Carta,Svago
2024-01-08,Rimborso,0,entrata,A1,
2024-01-09,Treno,-3.20,uscita,A1,Trasporti

2024-01-10,Palestra,40,uscita,Sconosciuto,Sport
2024-01-11,Teatro,30,uscita,Carta,svago
short,row
2024-01-27,Stipendio,1500,Entrata,A1,Svago
"
}

#[derive(Default)]
struct MemoryLedger {
    next_id: i64,
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
}

impl CommitSink for MemoryLedger {
    fn commit(
        &mut self,
        transactions: Vec<NewTransaction>,
        new_categories: Vec<NewCategory>,
    ) -> tally_core::Result<()> {
        for cat in new_categories {
            self.next_id += 1;
            self.categories.push(Category {
                id: 100 + self.next_id,
                name: cat.name,
                color: cat.color,
            });
        }
        for mut tx in transactions {
            if let Some(name) = tx.category_name.take() {
                tx.category_id = self
                    .categories
                    .iter()
                    .find(|c| c.name == name)
                    .map(|c| c.id);
            }
            self.next_id += 1;
            self.transactions.push(tx.into_transaction(self.next_id));
        }
        Ok(())
    }
}

#[test]
fn test_full_import_workflow() {
    let existing = SignatureSet::from_transactions(&history());
    let rows = parse_import(mixed_csv(), &accounts(), &categories(), &existing)
        .expect("Failed to parse CSV");

    // the blank line and the short row vanish
    assert_eq!(rows.len(), 8);
    let statuses: Vec<RowStatus> = rows.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            RowStatus::Duplicate,
            RowStatus::Ok,
            RowStatus::Ok,
            RowStatus::Error,
            RowStatus::Error,
            RowStatus::Error,
            RowStatus::Ok,
            RowStatus::Ok,
        ]
    );

    // row numbers count non-blank lines, header included
    let numbers: Vec<usize> = rows.iter().map(|r| r.row).collect();
    assert_eq!(numbers, vec![2, 3, 4, 5, 6, 7, 8, 10]);
    assert_eq!(
        rows[5].message.as_deref(),
        Some("Row 7: account \"Sconosciuto\" not found")
    );

    let summary = ImportSummary::from_rows(&rows);
    assert_eq!(summary.total, 8);
    assert_eq!(summary.ok, 4);
    assert_eq!(summary.errors, 3);
    assert_eq!(summary.duplicates, 1);

    let plan = prepare_commit(&rows, &categories(), &PaletteCycle::default());
    assert_eq!(plan.transactions.len(), 4);
    let new_names: Vec<&str> = plan
        .new_categories
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    // income rows never carry a category, so "Svago" on the salary row is ignored
    assert_eq!(new_names, vec!["Svago", "svago"]);

    let mut ledger = MemoryLedger::default();
    commit_plan(plan, &mut ledger).unwrap();
    assert_eq!(ledger.categories.len(), 2);
    assert_eq!(ledger.transactions.len(), 4);

    let cinema = ledger
        .transactions
        .iter()
        .find(|t| t.description == "Cinema")
        .unwrap();
    assert_eq!(cinema.category_id, Some(ledger.categories[0].id));

    let salary = ledger
        .transactions
        .iter()
        .find(|t| t.description == "Stipendio")
        .unwrap();
    assert_eq!(salary.kind, TransactionType::Income);
    assert_eq!(salary.category_id, None);
}

#[test]
fn test_reimport_after_commit_is_all_duplicates() {
    let csv = "data,descrizione,importo,tipo,nome_conto
2024-02-01,Affitto,700,uscita,A1
2024-02-02,Bolletta,55.3,uscita,A1
";
    let rows = parse_import(csv, &accounts(), &[], &SignatureSet::new()).unwrap();
    let plan = prepare_commit(&rows, &[], &PaletteCycle::default());
    let mut ledger = MemoryLedger::default();
    commit_plan(plan, &mut ledger).unwrap();

    let existing = SignatureSet::from_transactions(&ledger.transactions);
    let again = parse_import(csv, &accounts(), &[], &existing).unwrap();
    assert!(again.iter().all(|r| r.status == RowStatus::Duplicate));
    assert!(prepare_commit(&again, &[], &PaletteCycle::default()).is_empty());
}

#[test]
fn test_non_positive_amounts_are_always_errors() {
    let csv = "data,descrizione,importo,tipo,nome_conto
2024-01-05,Coffee,0,uscita,A1
2024-01-05,Coffee,-25,uscita,A1
2024-01-05,Coffee,\"0,00\",entrata,A1
2024-01-05,Coffee,-0.01,uscita,A1
";
    let existing = SignatureSet::from_transactions(&history());
    let rows = parse_import(csv, &accounts(), &[], &existing).unwrap();
    assert_eq!(rows.len(), 4);
    for row in &rows {
        assert_eq!(row.status, RowStatus::Error);
        assert!(row.message.as_deref().unwrap().contains("invalid amount"));
    }
}

#[test]
fn test_missing_account_column_is_fatal() {
    let csv = "data,descrizione,importo,tipo
2024-01-05,Coffee,25,uscita
";
    let err = parse_import(csv, &accounts(), &[], &SignatureSet::new()).unwrap_err();
    match err {
        Error::MissingHeaders(missing) => assert_eq!(missing, vec!["nome_conto".to_string()]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_header_only_file_is_fatal() {
    let csv = "data,descrizione,importo,tipo,nome_conto\n\n";
    assert!(matches!(
        parse_import(csv, &accounts(), &[], &SignatureSet::new()),
        Err(Error::EmptyFile)
    ));
}

#[test]
fn test_single_new_category_proposed() {
    let csv = "data,descrizione,importo,tipo,nome_conto,categoria
2024-03-01,Cinema,9,uscita,A1,Svago
2024-03-02,Concerto,35,uscita,A1,Svago
";
    let rows = parse_import(csv, &accounts(), &categories(), &SignatureSet::new()).unwrap();
    assert!(rows.iter().all(|r| r.is_ok()));

    let palette: Vec<String> = DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect();
    let plan = prepare_commit(&rows, &categories(), &RandomPalette::seeded(palette, 7));
    assert_eq!(plan.new_categories.len(), 1);
    assert_eq!(plan.new_categories[0].name, "Svago");
    assert!(DEFAULT_PALETTE.contains(&plan.new_categories[0].color.as_str()));
}

#[test]
fn test_parsing_and_planning_are_deterministic() {
    let existing = SignatureSet::from_transactions(&history());
    let palette: Vec<String> = DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect();

    let run = || {
        let rows = parse_import(mixed_csv(), &accounts(), &categories(), &existing).unwrap();
        let plan = prepare_commit(&rows, &categories(), &RandomPalette::seeded(palette.clone(), 42));
        (rows, plan)
    };

    let (rows_a, plan_a) = run();
    let (rows_b, plan_b) = run();
    assert_eq!(rows_a, rows_b);
    assert_eq!(plan_a, plan_b);
}

#[test]
fn test_read_import_file_then_parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gennaio.CSV");
    std::fs::write(
        &path,
        "\u{feff}\"Data\",\"Descrizione\",\"Importo\",\"Tipo\",\"Nome_Conto\"\n2024-01-05,Pane,2.10,uscita,A1\n",
    )
    .unwrap();

    let text = read_import_file(&path).unwrap();
    let rows = parse_import(&text, &accounts(), &[], &SignatureSet::new()).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_ok());

    let bad = dir.path().join("gennaio.xlsx");
    std::fs::write(&bad, "x").unwrap();
    assert!(matches!(read_import_file(&bad), Err(Error::InvalidCsv(_))));
}

#[test]
fn test_imported_transactions_feed_period_stats() {
    let rows = parse_import(mixed_csv(), &accounts(), &categories(), &SignatureSet::new()).unwrap();
    let plan = prepare_commit(&rows, &categories(), &PaletteCycle::default());
    let mut ledger = MemoryLedger {
        categories: categories(),
        ..MemoryLedger::default()
    };
    commit_plan(plan, &mut ledger).unwrap();

    let stats = PeriodStats::compute(
        &ledger.transactions,
        &ledger.categories,
        Period::parse_month("2024-01").unwrap(),
    );
    assert_eq!(stats.income, 1500.0);
    // coffee 25 + esselunga 82.40 + cinema 12.50 + teatro 30
    assert!((stats.expenses - 149.9).abs() < 1e-9);
    assert_eq!(stats.categories[0].name, "Spesa");
    assert_eq!(
        stats.largest_expense.as_ref().map(|l| l.description.as_str()),
        Some("Esselunga")
    );
}
