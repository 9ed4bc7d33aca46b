use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use crate::error::{ForecastError, ForecastResult};
use crate::source::{PriceSource, RawRow};

const DATE_COLUMNS: [&str; 3] = ["date", "datetime", "ts"];
const PRICE_COLUMNS: [&str; 4] = ["adj close", "adj_close", "adjclose", "close"];

/// Offline price history: a CSV with a date column and an adjusted-close column.
pub struct CsvPriceSource {
    path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn find_column(headers: &csv::StringRecord, wanted: &[&str]) -> Option<usize> {
    wanted.iter().find_map(|w| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(w))
    })
}

fn parse_price(field: &str) -> Option<f64> {
    let trimmed = field.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_date(field: &str) -> Result<NaiveDate, String> {
    // Accept "2022-01-03" and "2022-01-03 00:00:00"
    let head = field.trim().split(|c: char| c == ' ' || c == 'T').next().unwrap_or("");
    head.parse::<NaiveDate>()
        .map_err(|e| format!("bad date {:?}: {}", field, e))
}

/// Read every row of a price CSV. Unparseable prices become missing values;
/// unparseable dates are an error.
pub fn read_price_csv(path: &Path) -> ForecastResult<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ForecastError::DataUnavailable(format!("{}: {}", path.display(), e)))?;

    let headers = reader
        .headers()
        .map_err(|e| ForecastError::InvalidInput(format!("{}: {}", path.display(), e)))?
        .clone();
    let date_idx = find_column(&headers, &DATE_COLUMNS).ok_or_else(|| {
        ForecastError::InvalidInput(format!("{}: no date column in {:?}", path.display(), headers))
    })?;
    let price_idx = find_column(&headers, &PRICE_COLUMNS).ok_or_else(|| {
        ForecastError::InvalidInput(format!("{}: no close column in {:?}", path.display(), headers))
    })?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| ForecastError::InvalidInput(format!("{}: {}", path.display(), e)))?;
        let date = parse_date(record.get(date_idx).unwrap_or(""))
            .map_err(|e| ForecastError::InvalidInput(format!("{} row {}: {}", path.display(), line + 2, e)))?;
        rows.push((date, record.get(price_idx).and_then(parse_price)));
    }
    Ok(rows)
}

#[async_trait]
impl PriceSource for CsvPriceSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn fetch_raw(&self, _symbol: &str, _start: NaiveDate, _end: NaiveDate) -> ForecastResult<Vec<RawRow>> {
        read_price_csv(&self.path)
    }
}
