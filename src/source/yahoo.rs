use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::error::{ForecastError, ForecastResult};
use crate::logging::{self, obj, v_str, Domain, Level};
use crate::source::retry::{is_retryable_http_error, is_retryable_network_error, retry_async, RetryConfig};
use crate::source::{PriceSource, RawRow};

/// Daily bars from the Yahoo Finance chart endpoint.
pub struct YahooChartSource {
    client: Client,
    base: String,
    retry: RetryConfig,
}

impl YahooChartSource {
    pub fn new(base: &str, timeout_secs: u64, retries: u32) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs.max(1)))
                .user_agent("Mozilla/5.0 (compatible; stock-picker/0.1)")
                .build()
                .unwrap_or_else(|_| Client::new()),
            base: base.trim_end_matches('/').to_string(),
            retry: RetryConfig::with_retries(retries),
        }
    }

    /// Chart URL for `[start, end)`, both at 00:00 UTC.
    pub fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> ForecastResult<Url> {
        let period1 = midnight_ts(start);
        let period2 = midnight_ts(end);
        Url::parse_with_params(
            &format!("{}/v8/finance/chart/{}", self.base, symbol),
            &[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,split".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ],
        )
        .map_err(|e| ForecastError::InvalidInput(format!("bad chart url: {}", e)))
    }

    async fn fetch_once(&self, url: &Url) -> Result<Vec<RawRow>, Attempt> {
        let resp = self.client.get(url.clone()).send().await.map_err(|e| {
            let err = ForecastError::Fetch(e.to_string());
            if is_retryable_network_error(&e) {
                Attempt::Retry(err)
            } else {
                Attempt::Fatal(err)
            }
        })?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| Attempt::Retry(ForecastError::Fetch(e.to_string())))?;

        if is_retryable_http_error(status) {
            return Err(Attempt::Retry(ForecastError::Fetch(format!("http status {}", status))));
        }
        // 404 still carries a chart.error payload worth reporting
        if !(200..300).contains(&status) && status != 404 {
            return Err(Attempt::Fatal(ForecastError::Fetch(format!("http status {}", status))));
        }
        parse_chart(&body).map_err(Attempt::Fatal)
    }
}

fn midnight_ts(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0)
}

enum Attempt {
    Retry(ForecastError),
    Fatal(ForecastError),
}

impl Attempt {
    fn into_inner(self) -> ForecastError {
        match self {
            Attempt::Retry(e) | Attempt::Fatal(e) => e,
        }
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attempt::Retry(e) | Attempt::Fatal(e) => write!(f, "{}", e),
        }
    }
}

#[async_trait]
impl PriceSource for YahooChartSource {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_raw(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> ForecastResult<Vec<RawRow>> {
        let url = self.chart_url(symbol, start, end)?;
        logging::log(
            Level::Debug,
            Domain::Market,
            "fetch_request",
            obj(&[("symbol", v_str(symbol)), ("url", v_str(url.as_str()))]),
        );
        retry_async(
            &self.retry,
            "yahoo_chart",
            |a: &Attempt| matches!(a, Attempt::Retry(_)),
            || self.fetch_once(&url),
        )
        .await
        .map_err(Attempt::into_inner)
    }
}

// Chart API response types

#[derive(Deserialize, Debug)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Deserialize, Debug)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Deserialize, Debug)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Parse a chart payload into dated adjusted closes.
///
/// Falls back to the raw close when the adjusted series is absent. `null`
/// entries stay as missing values.
pub fn parse_chart(body: &str) -> ForecastResult<Vec<RawRow>> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| ForecastError::Fetch(format!("malformed chart payload: {}", e)))?;

    if let Some(err) = envelope.chart.error {
        return Err(ForecastError::DataUnavailable(format!(
            "{}: {}",
            err.code.unwrap_or_else(|| "error".to_string()),
            err.description.unwrap_or_default()
        )));
    }

    let result = match envelope.chart.result.and_then(|r| r.into_iter().next()) {
        Some(r) => r,
        None => return Ok(Vec::new()),
    };

    let prices = match result.indicators.adjclose.into_iter().next() {
        Some(adj) if !adj.adjclose.is_empty() => adj.adjclose,
        _ => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    let rows = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some((date, prices.get(i).copied().flatten()))
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves the scripted `(status, body)` replies in order, one per
    /// connection, repeating the last one. Returns the base URL and a request counter.
    async fn chart_stub(replies: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let (mut stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let mut request: Vec<u8> = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = replies[n.min(replies.len() - 1)];
                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        (format!("http://{}", addr), hits)
    }

    fn window() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        )
    }

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AMZN", "currency": "USD"},
                "timestamp": [1641220200, 1641306600, 1641393000],
                "indicators": {
                    "quote": [{"close": [170.4, 167.5, 164.4]}],
                    "adjclose": [{"adjclose": [170.40, null, 164.35]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_adjusted_close_with_nulls() {
        let rows = parse_chart(SAMPLE).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].0, NaiveDate::from_ymd_opt(2022, 1, 3).unwrap());
        assert_eq!(rows[0].1, Some(170.40));
        assert_eq!(rows[1].1, None);
        assert_eq!(rows[2].1, Some(164.35));
    }

    #[test]
    fn falls_back_to_close() {
        let body = r#"{"chart":{"result":[{"timestamp":[1641220200],
            "indicators":{"quote":[{"close":[170.4]}]}}],"error":null}}"#;
        let rows = parse_chart(body).unwrap();
        assert_eq!(rows[0].1, Some(170.4));
    }

    #[test]
    fn chart_error_is_data_unavailable() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart(body).unwrap_err();
        assert!(matches!(err, ForecastError::DataUnavailable(_)));
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn empty_result_yields_no_rows() {
        let body = r#"{"chart":{"result":[],"error":null}}"#;
        assert!(parse_chart(body).unwrap().is_empty());
    }

    #[test]
    fn chart_url_encodes_window() {
        let src = YahooChartSource::new("https://example.test/", 5, 1);
        let url = src
            .chart_url(
                "AMZN",
                NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            )
            .unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/AMZN");
        let query = url.query().unwrap();
        assert!(query.contains("period1=1640995200"));
        assert!(query.contains("period2=1672531200"));
        assert!(query.contains("interval=1d"));
    }

    #[tokio::test]
    async fn unavailable_then_ok_retries_once() {
        let (base, hits) = chart_stub(vec![(503, "busy"), (200, SAMPLE)]).await;
        let src = YahooChartSource::new(&base, 5, 1);
        let (start, end) = window();
        let rows = src.fetch_raw("AMZN", start, end).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn persistent_server_error_gives_up_after_one_retry() {
        let (base, hits) = chart_stub(vec![(502, "bad gateway")]).await;
        let src = YahooChartSource::new(&base, 5, 1);
        let (start, end) = window();
        let err = src.fetch_raw("AMZN", start, end).await.unwrap_err();
        assert!(matches!(err, ForecastError::Fetch(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn bad_request_fails_without_retry() {
        let (base, hits) = chart_stub(vec![(400, "bad request"), (200, SAMPLE)]).await;
        let src = YahooChartSource::new(&base, 5, 1);
        let (start, end) = window();
        let err = src.fetch_raw("AMZN", start, end).await.unwrap_err();
        assert!(matches!(err, ForecastError::Fetch(_)));
        assert!(err.to_string().contains("400"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn not_found_with_chart_error_is_data_unavailable() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let (base, hits) = chart_stub(vec![(404, body)]).await;
        let src = YahooChartSource::new(&base, 5, 1);
        let (start, end) = window();
        let err = src.fetch_raw("NOPE", start, end).await.unwrap_err();
        assert!(matches!(err, ForecastError::DataUnavailable(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
