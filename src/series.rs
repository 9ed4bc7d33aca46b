//! Dated price series: cleaning, transforms and the train/test split.

use chrono::NaiveDate;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{ForecastError, ForecastResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Chronologically ascending, no duplicate dates, no missing values.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build from raw upstream rows. Missing and non-finite values are dropped,
    /// rows are sorted by date, and duplicate dates are rejected.
    pub fn from_raw(rows: Vec<(NaiveDate, Option<f64>)>) -> ForecastResult<Self> {
        let mut points: Vec<PricePoint> = rows
            .into_iter()
            .filter_map(|(date, price)| match price {
                Some(p) if p.is_finite() => Some(PricePoint { date, price: p }),
                _ => None,
            })
            .collect();
        points.sort_by_key(|p| p.date);
        if let Some(dup) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(ForecastError::InvalidInput(format!(
                "duplicate date {}",
                dup[0].date
            )));
        }
        Ok(Self { points })
    }

    /// Wrap points already known to be ordered and clean.
    pub(crate) fn from_sorted(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Natural log of every price. Fails on the first price that is not
    /// strictly positive.
    pub fn ln(&self) -> ForecastResult<PriceSeries> {
        let mut out = Vec::with_capacity(self.points.len());
        for p in &self.points {
            if !(p.price > 0.0) {
                return Err(ForecastError::InvalidInput(format!(
                    "non-positive price {} on {}",
                    p.price, p.date
                )));
            }
            out.push(PricePoint { date: p.date, price: p.price.ln() });
        }
        Ok(Self::from_sorted(out))
    }

    /// Inverse of [`PriceSeries::ln`].
    pub fn exp(&self) -> PriceSeries {
        Self::from_sorted(
            self.points
                .iter()
                .map(|p| PricePoint { date: p.date, price: p.price.exp() })
                .collect(),
        )
    }

    /// Partition at `floor(fraction * len)` into (prefix, suffix).
    pub fn split(&self, fraction: f64) -> (PriceSeries, PriceSeries) {
        let idx = split_index(self.len(), fraction);
        (
            Self::from_sorted(self.points[..idx].to_vec()),
            Self::from_sorted(self.points[idx..].to_vec()),
        )
    }

    /// SHA-256 over `date,price` lines, for audit logs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for p in &self.points {
            hasher.update(format!("{},{:.10}\n", p.date, p.price).as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// `floor(fraction * len)`, clamped to `[0, len]`.
pub fn split_index(len: usize, fraction: f64) -> usize {
    let idx = (len as f64 * fraction).floor();
    if idx <= 0.0 {
        0
    } else {
        (idx as usize).min(len)
    }
}
