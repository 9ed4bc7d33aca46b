//! The symbols table shown on the page (S&P 500 symbol and name).

use anyhow::{Context, Result};
use std::path::Path;

use crate::page::Table;

/// Decode bytes as UTF-8, or as Latin-1 when they are not valid UTF-8.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// Parse CSV text with a header row. Short rows are padded to the header width.
pub fn parse_table(text: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.trim_start_matches('\u{feff}').as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("reading catalog header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("catalog row {}", i + 2))?;
        let mut row: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }
        if row.len() < headers.len() {
            row.resize(headers.len(), String::new());
        }
        rows.push(row);
    }
    Ok(Table { headers, rows })
}

pub fn load_catalog(path: &Path) -> Result<Table> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading symbols table {}", path.display()))?;
    parse_table(&decode_text(bytes)).with_context(|| format!("parsing {}", path.display()))
}
