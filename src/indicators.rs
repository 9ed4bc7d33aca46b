//! Trailing-window statistics over price series.

use std::collections::VecDeque;

/// Simple moving average with fixed window
#[derive(Debug, Clone)]
pub struct Sma {
    window: VecDeque<f64>,
    period: usize,
    sum: f64,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(period),
            period: period.max(1),
            sum: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> f64 {
        self.sum += value;
        self.window.push_back(value);
        if self.window.len() > self.period {
            self.sum -= self.window.pop_front().unwrap_or(0.0);
        }
        self.get()
    }

    pub fn get(&self) -> f64 {
        if self.window.is_empty() {
            0.0
        } else {
            self.sum / self.window.len() as f64
        }
    }

    pub fn is_ready(&self) -> bool {
        self.window.len() >= self.period
    }
}

/// Trailing mean over `period` values. Positions before the window fills are `None`.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut sma = Sma::new(period);
    values
        .iter()
        .map(|&v| {
            let mean = sma.update(v);
            sma.is_ready().then_some(mean)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_warmup_and_slide() {
        let mut sma = Sma::new(3);
        sma.update(1.0);
        sma.update(2.0);
        assert!(!sma.is_ready());
        assert!((sma.update(3.0) - 2.0).abs() < 1e-12);
        assert!(sma.is_ready());
        assert!((sma.update(4.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn rolling_mean_leaves_warmup_undefined() {
        let values: Vec<f64> = (1..=14).map(|v| v as f64).collect();
        let out = rolling_mean(&values, 12);
        assert_eq!(out.len(), 14);
        assert!(out[..11].iter().all(|v| v.is_none()));
        assert!((out[11].unwrap() - 6.5).abs() < 1e-12);
        assert!((out[13].unwrap() - 8.5).abs() < 1e-12);
    }

    #[test]
    fn rolling_mean_short_input_is_all_undefined() {
        let out = rolling_mean(&[1.0, 2.0], 12);
        assert_eq!(out, vec![None, None]);
    }
}
