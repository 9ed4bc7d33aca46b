use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::Config;
use crate::error::{ForecastError, ForecastResult};
use crate::logging;
use crate::series::PriceSeries;

mod csv_file;
mod yahoo;
pub mod retry;

pub use csv_file::CsvPriceSource;
pub use yahoo::{parse_chart, YahooChartSource};

/// Raw upstream row: a trading day and its adjusted close, if reported.
pub type RawRow = (NaiveDate, Option<f64>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Yahoo,
    Csv(String),
}

impl SourceKind {
    pub fn from_config(cfg: &Config) -> Self {
        match &cfg.prices_csv {
            Some(path) => SourceKind::Csv(path.clone()),
            None => SourceKind::Yahoo,
        }
    }

    pub fn build(self, cfg: &Config) -> Box<dyn PriceSource> {
        match self {
            SourceKind::Yahoo => Box::new(YahooChartSource::new(
                &cfg.yahoo_base,
                cfg.http_timeout_secs,
                cfg.fetch_retries,
            )),
            SourceKind::Csv(path) => Box::new(CsvPriceSource::new(path)),
        }
    }
}

/// Daily adjusted-close history for one symbol over `[start, end)`.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_raw(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> ForecastResult<Vec<RawRow>>;

    async fn fetch_daily(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> ForecastResult<PriceSeries> {
        if start >= end {
            return Err(ForecastError::InvalidInput(format!(
                "empty date window {} .. {}",
                start, end
            )));
        }
        let rows = self.fetch_raw(symbol, start, end).await?;
        into_series(symbol, self.name(), rows, start, end)
    }
}

/// Clip to the window, drop missing values, and reject an empty result.
pub fn into_series(
    symbol: &str,
    source: &str,
    rows: Vec<RawRow>,
    start: NaiveDate,
    end: NaiveDate,
) -> ForecastResult<PriceSeries> {
    let in_window: Vec<RawRow> = rows
        .into_iter()
        .filter(|(date, _)| *date >= start && *date < end)
        .collect();
    let total = in_window.len();
    let series = PriceSeries::from_raw(in_window)?;
    logging::log_fetch(symbol, source, series.len(), total - series.len());
    if series.is_empty() {
        return Err(ForecastError::DataUnavailable(format!(
            "{} returned no prices for {} between {} and {}",
            source, symbol, start, end
        )));
    }
    logging::log_fingerprint(symbol, &series.fingerprint(), series.len());
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn into_series_clips_window() {
        let rows = vec![
            (d("2021-12-31"), Some(1.0)),
            (d("2022-01-03"), Some(2.0)),
            (d("2022-12-30"), Some(3.0)),
            (d("2023-01-01"), Some(4.0)),
        ];
        let s = into_series("AMZN", "test", rows, d("2022-01-01"), d("2023-01-01")).unwrap();
        assert_eq!(s.values(), vec![2.0, 3.0]);
    }

    #[test]
    fn all_missing_is_data_unavailable() {
        let rows = vec![(d("2022-01-03"), None), (d("2022-01-04"), None)];
        let err = into_series("AMZN", "test", rows, d("2022-01-01"), d("2023-01-01")).unwrap_err();
        assert!(matches!(err, ForecastError::DataUnavailable(_)));
    }

    #[test]
    fn source_kind_prefers_csv_when_configured() {
        let mut cfg = Config::from_env();
        cfg.prices_csv = Some("prices.csv".to_string());
        assert_eq!(SourceKind::from_config(&cfg), SourceKind::Csv("prices.csv".to_string()));
        cfg.prices_csv = None;
        assert_eq!(SourceKind::from_config(&cfg), SourceKind::Yahoo);
    }
}
