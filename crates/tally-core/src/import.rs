//! CSV import parser and validator
//!
//! Import files use fixed Italian column names:
//! `data,descrizione,importo,tipo,nome_conto[,categoria]`.
//!
//! Parsing is a single pass over the file. Problems that make the whole file
//! unusable (missing columns, no data rows, undecodable text) abort with an
//! [`Error`]; problems with a single row are reported on that row and the
//! pass continues.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Account, Category, NewTransaction, ParsedRow, TransactionType};
use crate::signature::{Signature, SignatureSet};

/// Columns every import file must have
pub const REQUIRED_HEADERS: [&str; 5] = ["data", "descrizione", "importo", "tipo", "nome_conto"];

/// Optional column enabling category assignment on expenses
pub const CATEGORY_HEADER: &str = "categoria";

/// Read an import file fully into text.
///
/// Only `.csv` files are accepted. Text that is not valid UTF-8 is reported
/// as an invalid CSV rather than an I/O failure.
pub fn read_import_file(path: &Path) -> Result<String> {
    let is_csv = path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(Error::InvalidCsv(format!(
            "{} is not a .csv file",
            path.display()
        )));
    }

    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes)
        .map_err(|e| Error::InvalidCsv(format!("not a valid CSV (text decoding failed: {})", e)))
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    description: usize,
    amount: usize,
    kind: usize,
    account: usize,
    category: Option<usize>,
    /// Number of header fields; shorter rows are dropped
    width: usize,
}

impl ColumnMap {
    fn from_header(header: &StringRecord) -> Result<Self> {
        let tokens: Vec<String> = header
            .iter()
            .map(|h| clean_field(h).to_lowercase())
            .collect();
        let position = |name: &str| tokens.iter().position(|t| t == name);

        let missing: Vec<String> = REQUIRED_HEADERS
            .into_iter()
            .filter(|&h| position(h).is_none())
            .map(String::from)
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingHeaders(missing));
        }

        // All required positions were checked above
        let required = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            date: required("data"),
            description: required("descrizione"),
            amount: required("importo"),
            kind: required("tipo"),
            account: required("nome_conto"),
            category: position(CATEGORY_HEADER),
            width: tokens.len(),
        })
    }
}

/// Strip surrounding whitespace and quotes from a raw field
fn clean_field(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches('\u{feff}')
        .trim_matches('"')
        .trim()
}

/// Split text into records, one per non-blank line.
///
/// Each line is split on its own, so a record never spans lines. A quoted
/// field may contain commas (`"25,00"`); a line with an unbalanced quote is
/// split on every comma and the stray quote is stripped per field.
fn split_records(text: &str) -> Result<Vec<StringRecord>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(split_line)
        .collect()
}

fn split_line(line: &str) -> Result<StringRecord> {
    if line.matches('"').count() % 2 != 0 {
        return Ok(line.split(',').collect());
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    match rdr.records().next() {
        Some(record) => Ok(record?),
        None => Ok(StringRecord::new()),
    }
}

/// Parse a date in one of the accepted locale-agnostic formats.
///
/// Dates without a time are taken as midnight UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let datetime_formats = [
        "%Y-%m-%dT%H:%M:%S%.f", // 2024-01-15T10:30:00.000
        "%Y-%m-%dT%H:%M",       // 2024-01-15T10:30
        "%Y-%m-%d %H:%M:%S",    // 2024-01-15 10:30:00
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    let date_formats = [
        "%Y-%m-%d", // 2024-01-15
        "%Y/%m/%d", // 2024/01/15
        "%m/%d/%Y", // 01/15/2024
    ];
    for fmt in date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

/// Parse a strictly positive amount; a comma is accepted as the decimal
/// separator.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    let value: f64 = normalized.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Parse and validate import text against the host's reference data.
///
/// Returns one [`ParsedRow`] per non-blank data line that has at least as
/// many fields as the header, in file order.
pub fn parse_import(
    text: &str,
    accounts: &[Account],
    categories: &[Category],
    existing: &SignatureSet,
) -> Result<Vec<ParsedRow>> {
    let records = split_records(text)?;
    if records.len() < 2 {
        return Err(Error::EmptyFile);
    }

    let columns = ColumnMap::from_header(&records[0])?;
    let mut rows = Vec::with_capacity(records.len() - 1);

    for (index, record) in records.iter().enumerate().skip(1) {
        let row_number = index + 1;
        if record.len() < columns.width {
            debug!(
                row = row_number,
                fields = record.len(),
                expected = columns.width,
                "Skipping short row"
            );
            continue;
        }
        rows.push(validate_row(
            row_number, record, &columns, accounts, categories, existing,
        ));
    }

    debug!(
        "Parsed {} import rows ({} ok)",
        rows.len(),
        rows.iter().filter(|r| r.is_ok()).count()
    );
    Ok(rows)
}

fn validate_row(
    row: usize,
    record: &StringRecord,
    columns: &ColumnMap,
    accounts: &[Account],
    categories: &[Category],
    existing: &SignatureSet,
) -> ParsedRow {
    let field = |i: usize| record.get(i).map(clean_field).unwrap_or("");

    let raw_date = field(columns.date);
    let Some(date) = parse_date(raw_date) else {
        return ParsedRow::error(row, format!("Row {}: invalid date \"{}\"", row, raw_date));
    };

    let raw_amount = field(columns.amount);
    let Some(amount) = parse_amount(raw_amount) else {
        return ParsedRow::error(row, format!("Row {}: invalid amount \"{}\"", row, raw_amount));
    };

    let kind = TransactionType::classify(field(columns.kind));

    let account_name = field(columns.account);
    let Some(account) = accounts.iter().find(|a| a.matches_name(account_name)) else {
        return ParsedRow::error(
            row,
            format!("Row {}: account \"{}\" not found", row, account_name),
        );
    };

    let mut category_id = None;
    let mut category_name = None;
    if kind == TransactionType::Expense {
        let name = columns.category.map(|i| field(i)).unwrap_or("");
        if !name.is_empty() {
            match categories.iter().find(|c| c.matches_name(name)) {
                Some(category) => category_id = Some(category.id),
                None => category_name = Some(name.to_string()),
            }
        }
    }

    let transaction = NewTransaction {
        account_id: account.id,
        description: field(columns.description).to_string(),
        amount,
        date,
        kind,
        category_id,
        category_name,
    };

    if existing.contains(&Signature::from(&transaction)) {
        ParsedRow::duplicate(row, transaction)
    } else {
        ParsedRow::ok(row, transaction)
    }
}
