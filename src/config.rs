use chrono::NaiveDate;
use std::str::FromStr;

use crate::logging::{self, obj, v_str, Domain, Level};

/// How the fixed-horizon forecast is paired with the held-out window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Keep `min(horizon, test_len)` pairs.
    Truncate,
    /// Require `horizon == test_len`.
    Strict,
}

impl Alignment {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "strict" => Alignment::Strict,
            _ => Alignment::Truncate,
        }
    }
}

/// Scale the chart traces are drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartScale {
    Log,
    Price,
}

impl ChartScale {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "price" => ChartScale::Price,
            _ => ChartScale::Log,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub symbol: String,
    pub company: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub train_fraction: f64,
    pub horizon: usize,
    pub smoothing_window: usize,
    pub interval_alpha: f64,
    pub show_interval: bool,
    pub alignment: Alignment,
    pub chart_scale: ChartScale,
    pub yahoo_base: String,
    pub http_timeout_secs: u64,
    pub fetch_retries: u32,
    pub prices_csv: Option<String>,
    pub stocks_csv: String,
    pub assets_dir: String,
    pub out_dir: String,
}

pub const DEFAULT_SYMBOL: &str = "AMZN";
pub const DEFAULT_START: &str = "2022-01-01";
pub const DEFAULT_END: &str = "2023-01-01";

/// Outcome of reading one environment variable.
#[derive(Debug, Clone, PartialEq)]
enum Setting<T> {
    Unset,
    Parsed(T),
    Malformed(String),
}

fn parse_setting<T: FromStr>(raw: Option<&str>) -> Setting<T> {
    match raw.map(str::trim) {
        None | Some("") => Setting::Unset,
        Some(v) => match v.parse::<T>() {
            Ok(parsed) => Setting::Parsed(parsed),
            Err(_) => Setting::Malformed(v.to_string()),
        },
    }
}

/// Parsed value of `key`, or `default` when unset. A value that does not parse
/// is logged and replaced by the default.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match parse_setting(std::env::var(key).ok().as_deref()) {
        Setting::Parsed(v) => v,
        Setting::Unset => default,
        Setting::Malformed(raw) => {
            logging::log(
                Level::Warn,
                Domain::System,
                "config_malformed",
                obj(&[("key", v_str(key)), ("value", v_str(&raw))]),
            );
            default
        }
    }
}

fn env_date(key: &str, default: &str) -> NaiveDate {
    let fallback = default.parse::<NaiveDate>().unwrap_or_default();
    env_or(key, fallback)
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            symbol: std::env::var("SYMBOL").unwrap_or_else(|_| DEFAULT_SYMBOL.to_string()),
            company: std::env::var("COMPANY").unwrap_or_else(|_| "Amazon".to_string()),
            start: env_date("START_DATE", DEFAULT_START),
            end: env_date("END_DATE", DEFAULT_END),
            train_fraction: env_or("TRAIN_FRACTION", 0.75),
            horizon: env_or("FORECAST_HORIZON", 63),
            smoothing_window: env_or("SMOOTHING_WINDOW", 12),
            interval_alpha: env_or("INTERVAL_ALPHA", 0.5),
            show_interval: env_flag("SHOW_INTERVAL"),
            alignment: Alignment::parse(&std::env::var("ALIGNMENT").unwrap_or_default()),
            chart_scale: ChartScale::parse(&std::env::var("CHART_SCALE").unwrap_or_default()),
            yahoo_base: std::env::var("YAHOO_BASE").unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string()),
            http_timeout_secs: env_or("HTTP_TIMEOUT_SECS", 10),
            fetch_retries: env_or("FETCH_RETRIES", 1),
            prices_csv: std::env::var("PRICES_CSV").ok().filter(|v| !v.is_empty()),
            stocks_csv: std::env::var("STOCKS_CSV").unwrap_or_else(|_| "stocks.csv".to_string()),
            assets_dir: std::env::var("ASSETS_DIR").unwrap_or_else(|_| ".".to_string()),
            out_dir: std::env::var("OUT_DIR").unwrap_or_else(|_| "out/site".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_parse_defaults_to_truncate() {
        assert_eq!(Alignment::parse("strict"), Alignment::Strict);
        assert_eq!(Alignment::parse(" STRICT "), Alignment::Strict);
        assert_eq!(Alignment::parse(""), Alignment::Truncate);
        assert_eq!(Alignment::parse("bogus"), Alignment::Truncate);
    }

    #[test]
    fn chart_scale_parse() {
        assert_eq!(ChartScale::parse("price"), ChartScale::Price);
        assert_eq!(ChartScale::parse("log"), ChartScale::Log);
        assert_eq!(ChartScale::parse(""), ChartScale::Log);
    }

    #[test]
    fn default_window_constants_parse() {
        let start: NaiveDate = DEFAULT_START.parse().unwrap();
        let end: NaiveDate = DEFAULT_END.parse().unwrap();
        assert!(start < end);
        assert_eq!(env_date("STOCK_PICKER_UNSET_DATE_KEY", DEFAULT_START), start);
    }

    #[test]
    fn setting_distinguishes_unset_from_malformed() {
        assert_eq!(parse_setting::<f64>(None), Setting::Unset);
        assert_eq!(parse_setting::<f64>(Some("  ")), Setting::Unset);
        assert_eq!(parse_setting::<f64>(Some(" 0.8 ")), Setting::Parsed(0.8));
        assert_eq!(parse_setting::<usize>(Some("63")), Setting::Parsed(63));
        assert_eq!(parse_setting::<f64>(Some("three quarters")), Setting::Malformed("three quarters".to_string()));
        assert_eq!(
            parse_setting::<NaiveDate>(Some("01/01/2022")),
            Setting::Malformed("01/01/2022".to_string())
        );
    }

    #[test]
    fn malformed_value_falls_back_to_default() {
        std::env::set_var("STOCK_PICKER_TEST_MALFORMED_FRACTION", "abc");
        assert_eq!(env_or("STOCK_PICKER_TEST_MALFORMED_FRACTION", 0.75), 0.75);
        std::env::set_var("STOCK_PICKER_TEST_MALFORMED_DATE", "2022-13-45");
        assert_eq!(
            env_date("STOCK_PICKER_TEST_MALFORMED_DATE", DEFAULT_START),
            DEFAULT_START.parse::<NaiveDate>().unwrap()
        );
        std::env::set_var("STOCK_PICKER_TEST_GOOD_HORIZON", "21");
        assert_eq!(env_or("STOCK_PICKER_TEST_GOOD_HORIZON", 63usize), 21);
    }

    #[test]
    fn flag_accepts_common_truthy_values() {
        std::env::set_var("STOCK_PICKER_TEST_FLAG_ON", "Yes");
        std::env::set_var("STOCK_PICKER_TEST_FLAG_OFF", "0");
        assert!(env_flag("STOCK_PICKER_TEST_FLAG_ON"));
        assert!(!env_flag("STOCK_PICKER_TEST_FLAG_OFF"));
        assert!(!env_flag("STOCK_PICKER_TEST_FLAG_UNSET"));
    }
}
