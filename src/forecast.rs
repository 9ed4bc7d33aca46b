//! Forecast builder: price series in, train/test/forecast series out.
//!
//! Pipeline: reject empty input, log-transform, trailing smoothing
//! (informational), split, fit ARIMA(0,1,0), forecast a fixed horizon, then
//! pair the forecast with the held-out dates.

use chrono::NaiveDate;
use serde::Serialize;

use crate::arima::{self, ArimaOrder};
use crate::config::{Alignment, Config};
use crate::error::{ForecastError, ForecastResult};
use crate::indicators::rolling_mean;
use crate::logging::{self, v_str, ProfileScope};
use crate::series::{split_index, PricePoint, PriceSeries};

pub const DEFAULT_HORIZON: usize = 63;
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.75;
pub const DEFAULT_SMOOTHING_WINDOW: usize = 12;
pub const DEFAULT_INTERVAL_ALPHA: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct ForecastParams {
    pub order: ArimaOrder,
    pub train_fraction: f64,
    pub horizon: usize,
    pub smoothing_window: usize,
    pub interval_alpha: f64,
    pub alignment: Alignment,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            order: ArimaOrder::RANDOM_WALK,
            train_fraction: DEFAULT_TRAIN_FRACTION,
            horizon: DEFAULT_HORIZON,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            interval_alpha: DEFAULT_INTERVAL_ALPHA,
            alignment: Alignment::Truncate,
        }
    }
}

impl ForecastParams {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            order: ArimaOrder::RANDOM_WALK,
            train_fraction: cfg.train_fraction,
            horizon: cfg.horizon,
            smoothing_window: cfg.smoothing_window,
            interval_alpha: cfg.interval_alpha,
            alignment: cfg.alignment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalPoint {
    pub date: NaiveDate,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastOutput {
    /// Training prefix in price scale.
    pub train: PriceSeries,
    /// Held-out suffix in price scale.
    pub test: PriceSeries,
    pub train_log: PriceSeries,
    pub test_log: PriceSeries,
    /// Trailing mean of the log series; `None` during warm-up.
    pub smoothed: Vec<(NaiveDate, Option<f64>)>,
    /// Raw fixed-horizon forecast, log scale.
    pub forecast: Vec<f64>,
    /// Forecast paired with test dates, log scale.
    pub aligned: PriceSeries,
    /// Prediction bands paired with test dates, log scale.
    pub interval: Vec<IntervalPoint>,
    pub sigma2: f64,
    pub split_index: usize,
}

impl ForecastOutput {
    /// Forecast mapped back to price scale.
    pub fn aligned_prices(&self) -> PriceSeries {
        self.aligned.exp()
    }

    pub fn interval_prices(&self) -> Vec<IntervalPoint> {
        self.interval
            .iter()
            .map(|p| IntervalPoint { date: p.date, lower: p.lower.exp(), upper: p.upper.exp() })
            .collect()
    }
}

/// Run the full pipeline over one price series.
pub fn build(series: &PriceSeries, params: &ForecastParams) -> ForecastResult<ForecastOutput> {
    let _scope = ProfileScope::with_context("forecast_build", &[("order", v_str(&params.order.to_string()))]);

    if series.is_empty() {
        return Err(ForecastError::DataUnavailable(
            "price series is empty for the requested window".to_string(),
        ));
    }
    if !(params.train_fraction > 0.0 && params.train_fraction <= 1.0) {
        return Err(ForecastError::InvalidInput(format!(
            "train fraction must be in (0, 1], got {}",
            params.train_fraction
        )));
    }

    let log_series = series.ln()?;

    let log_values = log_series.values();
    let smoothed: Vec<(NaiveDate, Option<f64>)> = log_series
        .dates()
        .into_iter()
        .zip(rolling_mean(&log_values, params.smoothing_window))
        .collect();

    let split_at = split_index(log_series.len(), params.train_fraction);
    let (train_log, test_log) = log_series.split(params.train_fraction);
    let (train, test) = series.split(params.train_fraction);
    logging::log_split(train.len(), test.len(), split_at);

    let fitted = arima::fit(&train_log.values(), params.order)?;
    logging::log_fit(&params.order.to_string(), fitted.nobs, fitted.sigma2, fitted.last_level());

    let forecast = fitted.forecast(params.horizon);
    let bands = fitted.forecast_interval(params.horizon, params.interval_alpha)?;

    let kept = align_len(params.alignment, forecast.len(), test_log.len())?;
    logging::log_alignment(
        match params.alignment {
            Alignment::Truncate => "truncate",
            Alignment::Strict => "strict",
        },
        forecast.len(),
        test_log.len(),
        kept,
    );

    let test_dates = test_log.dates();
    let aligned = PriceSeries::from_sorted(
        test_dates
            .iter()
            .zip(&forecast)
            .take(kept)
            .map(|(&date, &price)| PricePoint { date, price })
            .collect(),
    );
    let interval = test_dates
        .iter()
        .zip(&bands)
        .take(kept)
        .map(|(&date, &(lower, upper))| IntervalPoint { date, lower, upper })
        .collect();

    Ok(ForecastOutput {
        train,
        test,
        train_log,
        test_log,
        smoothed,
        forecast,
        aligned,
        interval,
        sigma2: fitted.sigma2,
        split_index: split_at,
    })
}

/// Number of (date, forecast) pairs to keep.
pub fn align_len(mode: Alignment, forecast: usize, test: usize) -> ForecastResult<usize> {
    match mode {
        Alignment::Truncate => Ok(forecast.min(test)),
        Alignment::Strict if forecast == test => Ok(forecast),
        Alignment::Strict => Err(ForecastError::LengthMismatch { forecast, test }),
    }
}
