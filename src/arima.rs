//! Integrated random-walk models, ARIMA(0, d, 0) without a constant.
//!
//! The fit has a closed form: the d-th differences are treated as zero-mean
//! white noise, so the only estimated parameter is the innovation variance.
//! Point forecasts extrapolate the last levels; prediction intervals widen
//! with the psi-weights of `(1 - B)^-d`.

use std::fmt;

use crate::error::{ForecastError, ForecastResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub const RANDOM_WALK: ArimaOrder = ArimaOrder { p: 0, d: 1, q: 0 };

    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedRandomWalk {
    pub order: ArimaOrder,
    /// Last value of the k-th differenced series, k in `0..d`.
    last_levels: Vec<f64>,
    /// MLE innovation variance of the d-th differences.
    pub sigma2: f64,
    /// Number of differenced observations used.
    pub nobs: usize,
}

fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Fit ARIMA(0, d, 0) with no constant.
pub fn fit(values: &[f64], order: ArimaOrder) -> ForecastResult<FittedRandomWalk> {
    if order.p != 0 || order.q != 0 || order.d == 0 {
        return Err(ForecastError::ModelFitError(format!(
            "unsupported order {}; only (0,d,0) with d >= 1 is implemented",
            order
        )));
    }
    if values.len() <= order.d {
        return Err(ForecastError::ModelFitError(format!(
            "need more than {} observations for order {}, got {}",
            order.d,
            order,
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::ModelFitError("non-finite observation".to_string()));
    }

    let mut last_levels = Vec::with_capacity(order.d);
    let mut current = values.to_vec();
    for _ in 0..order.d {
        last_levels.push(*current.last().unwrap_or(&0.0));
        current = difference(&current);
    }

    let nobs = current.len();
    let sigma2 = current.iter().map(|x| x * x).sum::<f64>() / nobs as f64;
    if !(sigma2 > 0.0) || !sigma2.is_finite() {
        return Err(ForecastError::ModelFitError(
            "degenerate differenced series (zero innovation variance)".to_string(),
        ));
    }

    Ok(FittedRandomWalk { order, last_levels, sigma2, nobs })
}

impl FittedRandomWalk {
    /// Last observed level of the undifferenced series.
    pub fn last_level(&self) -> f64 {
        self.last_levels.first().copied().unwrap_or(0.0)
    }

    /// Point forecast `steps` ahead. Future d-th differences are zero, so
    /// d = 1 gives a flat line at the last level.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let mut levels = self.last_levels.clone();
        let mut out = Vec::with_capacity(steps);
        for _ in 0..steps {
            let mut inc = 0.0;
            for level in levels.iter_mut().rev() {
                *level += inc;
                inc = *level;
            }
            out.push(levels[0]);
        }
        out
    }

    /// Forecast variance per step: `sigma2 * sum(psi_j^2)` for j < h.
    pub fn forecast_variance(&self, steps: usize) -> Vec<f64> {
        let mut psi = vec![1.0; steps];
        for _ in 1..self.order.d {
            let mut acc = 0.0;
            for w in psi.iter_mut() {
                acc += *w;
                *w = acc;
            }
        }
        let mut cum = 0.0;
        psi.iter()
            .map(|w| {
                cum += w * w;
                self.sigma2 * cum
            })
            .collect()
    }

    /// Two-sided normal prediction bands at level `1 - alpha`.
    pub fn forecast_interval(&self, steps: usize, alpha: f64) -> ForecastResult<Vec<(f64, f64)>> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ForecastError::InvalidInput(format!(
                "interval alpha must be in (0, 1), got {}",
                alpha
            )));
        }
        let z = normal_ppf(1.0 - alpha / 2.0);
        Ok(self
            .forecast(steps)
            .into_iter()
            .zip(self.forecast_variance(steps))
            .map(|(point, var)| {
                let half = z * var.sqrt();
                (point - half, point + half)
            })
            .collect())
    }
}

/// Inverse standard normal CDF (Acklam's rational approximation).
pub fn normal_ppf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_walk_forecast_is_flat_at_last_level() {
        let fitted = fit(&[1.0, 1.5, 1.2, 2.0], ArimaOrder::RANDOM_WALK).unwrap();
        let fc = fitted.forecast(5);
        assert_eq!(fc, vec![2.0; 5]);
        assert_eq!(fitted.nobs, 3);
        // diffs: 0.5, -0.3, 0.8
        let expected = (0.25 + 0.09 + 0.64) / 3.0;
        assert!((fitted.sigma2 - expected).abs() < 1e-12);
    }

    #[test]
    fn second_order_extrapolates_linearly() {
        let fitted = fit(&[1.0, 2.0, 3.5, 5.0], ArimaOrder::new(0, 2, 0)).unwrap();
        // last level 5.0, last slope 1.5
        let fc = fitted.forecast(3);
        assert!((fc[0] - 6.5).abs() < 1e-12);
        assert!((fc[2] - 9.5).abs() < 1e-12);
        let var = fitted.forecast_variance(3);
        // psi = 1, 2, 3
        assert!((var[2] / fitted.sigma2 - 14.0).abs() < 1e-12);
    }

    #[test]
    fn constant_series_is_degenerate() {
        let err = fit(&[3.0; 10], ArimaOrder::RANDOM_WALK).unwrap_err();
        assert!(matches!(err, ForecastError::ModelFitError(_)));
    }

    #[test]
    fn too_short_and_unsupported_orders_fail() {
        assert!(matches!(fit(&[1.0], ArimaOrder::RANDOM_WALK), Err(ForecastError::ModelFitError(_))));
        assert!(matches!(
            fit(&[1.0, 2.0, 3.0], ArimaOrder::new(1, 1, 0)),
            Err(ForecastError::ModelFitError(_))
        ));
        assert!(matches!(
            fit(&[1.0, 2.0, 3.0], ArimaOrder::new(0, 0, 0)),
            Err(ForecastError::ModelFitError(_))
        ));
    }

    #[test]
    fn interval_widens_with_sqrt_h() {
        let fitted = fit(&[1.0, 1.1, 1.0, 1.2, 1.1], ArimaOrder::RANDOM_WALK).unwrap();
        let bands = fitted.forecast_interval(4, 0.05).unwrap();
        let w1 = bands[0].1 - bands[0].0;
        let w4 = bands[3].1 - bands[3].0;
        assert!((w4 / w1 - 2.0).abs() < 1e-9);
        assert!(bands.iter().all(|(lo, hi)| *lo < 1.1 && *hi > 1.1));
        assert!(fitted.forecast_interval(4, 1.0).is_err());
    }

    #[test]
    fn normal_ppf_known_values() {
        assert!((normal_ppf(0.5)).abs() < 1e-9);
        assert!((normal_ppf(0.975) - 1.959963985).abs() < 1e-6);
        assert!((normal_ppf(0.75) - 0.674489750).abs() < 1e-6);
        assert!((normal_ppf(0.01) + 2.326347874).abs() < 1e-6);
    }
}
