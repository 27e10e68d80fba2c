// 📂 Loader - read raw transaction records from JSON or CSV files

use crate::transaction::RawTransaction;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// JSON input is either a bare array or an object wrapping one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonInput {
    List(Vec<RawTransaction>),
    Wrapped { transactions: Vec<RawTransaction> },
}

/// CSV row; amount stays the literal cell text
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date")]
    date: String,

    #[serde(alias = "Description")]
    description: String,

    #[serde(alias = "Amount")]
    amount: String,
}

pub fn load_json(path: &Path) -> Result<Vec<RawTransaction>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read transactions file: {:?}", path))?;

    let input: JsonInput =
        serde_json::from_str(&content).context("Failed to parse transactions JSON")?;

    Ok(match input {
        JsonInput::List(records) => records,
        JsonInput::Wrapped { transactions } => transactions,
    })
}

pub fn load_csv(path: &Path) -> Result<Vec<RawTransaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .context("Failed to open CSV file")?;

    let mut records = Vec::new();

    for result in rdr.deserialize() {
        let record: CsvRecord = result.context("Failed to deserialize transaction")?;
        records.push(RawTransaction::new(record.date, record.description, record.amount));
    }

    Ok(records)
}

/// Pick the reader by extension: `.csv` → CSV, anything else → JSON
pub fn load_transactions(path: &Path) -> Result<Vec<RawTransaction>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        load_csv(path)
    } else {
        load_json(path)
    }
}

// ============================================================================
// TESTS
// ============================================================================
