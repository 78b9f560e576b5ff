use common::{Error, Result};

/// RSI (Relative Strength Index) indicator with an oversold threshold.
///
/// Uses Wilder's smoothed moving average (same as TradingView / standard RSI):
/// the first `period` changes seed the averages with a plain mean, every later
/// change is folded in with `alpha = 1 / period`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiIndicator {
    pub period: usize,
    /// Values strictly below this are oversold.
    pub threshold: f64,
}

impl RsiIndicator {
    pub fn new(period: usize, threshold: f64) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self { period, threshold }
    }

    /// Compute RSI from a slice of close prices (oldest first).
    pub fn compute(&self, closes: &[f64]) -> Result<f64> {
        compute_rsi(closes, self.period)
    }

    pub fn is_oversold(&self, value: f64) -> bool {
        value < self.threshold
    }
}

/// Rolling Wilder accumulator: one `(avg_gain, avg_loss)` pair per step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WilderState {
    pub avg_gain: f64,
    pub avg_loss: f64,
}

impl WilderState {
    /// Simple-mean bootstrap over the first window of gains and losses.
    pub fn seed(gains: &[f64], losses: &[f64]) -> Self {
        let n = gains.len() as f64;
        Self {
            avg_gain: gains.iter().sum::<f64>() / n,
            avg_loss: losses.iter().sum::<f64>() / n,
        }
    }

    /// Fold one more change into the averages.
    pub fn step(self, gain: f64, loss: f64, period: usize) -> Self {
        let p = period as f64;
        Self {
            avg_gain: gain / p + self.avg_gain * (p - 1.0) / p,
            avg_loss: loss / p + self.avg_loss * (p - 1.0) / p,
        }
    }

    /// Final RSI value in `[0, 100]`.
    ///
    /// With no average loss the relative strength is unbounded; the value
    /// saturates at 100 instead of dividing by zero.
    pub fn rsi(&self) -> f64 {
        if self.avg_loss == 0.0 {
            return 100.0;
        }
        let rs = self.avg_gain / self.avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

/// Compute the RSI of `closes` (oldest first) over `period`.
///
/// Fails with `InsufficientData` unless `closes.len() > period`.
pub fn compute_rsi(closes: &[f64], period: usize) -> Result<f64> {
    if period == 0 {
        return Err(Error::Config("RSI period must be at least 1".to_string()));
    }
    if closes.len() <= period {
        return Err(Error::InsufficientData {
            got: closes.len(),
            period,
        });
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    // Order-dependent: must stay a single sequential fold.
    let state = gains[period..]
        .iter()
        .zip(&losses[period..])
        .fold(
            WilderState::seed(&gains[..period], &losses[..period]),
            |state, (&gain, &loss)| state.step(gain, loss, period),
        );

    Ok(state.rsi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_fails_when_series_not_longer_than_period() {
        let prices = vec![100.0; 14];
        assert!(matches!(
            compute_rsi(&prices, 14),
            Err(Error::InsufficientData { got: 14, period: 14 })
        ));
    }

    #[test]
    fn rsi_returns_value_with_period_plus_one_closes() {
        // 15 values, exactly period+1
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        assert!(compute_rsi(&prices, 14).is_ok());
    }

    #[test]
    fn rsi_rejects_zero_period() {
        assert!(matches!(compute_rsi(&[1.0, 2.0], 0), Err(Error::Config(_))));
    }

    #[test]
    fn rsi_all_gains_returns_100() {
        let prices = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        assert_eq!(compute_rsi(&prices, 3).unwrap(), 100.0);
    }

    #[test]
    fn rsi_all_losses_returns_0() {
        let prices = vec![14.0, 13.0, 12.0, 11.0, 10.0];
        assert_eq!(compute_rsi(&prices, 3).unwrap(), 0.0);
    }

    #[test]
    fn twenty_falling_closes_give_zero() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let value = compute_rsi(&prices, 14).unwrap();
        assert_eq!(format!("{value:.2}"), "0.00");
        assert!(RsiIndicator::new(14, 30.0).is_oversold(value));
    }

    #[test]
    fn rsi_known_value() {
        // StockCharts 14-period RSI worksheet
        let mut prices = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28,
        ];
        let first = compute_rsi(&prices, 14).unwrap();
        assert!((first - 70.464).abs() < 0.01, "got {first}");

        prices.extend([46.00, 46.03, 46.41, 46.22, 45.64]);
        let smoothed = compute_rsi(&prices, 14).unwrap();
        assert!((smoothed - 57.915).abs() < 0.01, "got {smoothed}");
    }

    #[test]
    fn smoothing_differs_from_plain_window_average() {
        // Early losses stay in the Wilder averages; a trailing SMA window
        // over the last 14 changes would forget them and report 100.
        let mut prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        prices.extend((1..=14).map(|i| 86.0 + i as f64));
        let value = compute_rsi(&prices, 14).unwrap();
        assert!(value < 100.0 && value > 50.0, "got {value}");
    }

    #[test]
    fn flat_series_does_not_divide_by_zero() {
        let prices = vec![1.0; 30];
        let value = compute_rsi(&prices, 14).unwrap();
        assert!(value.is_finite());
        assert_eq!(value, 100.0);
    }

    #[test]
    fn wilder_step_weights_new_value_by_one_over_period() {
        let state = WilderState { avg_gain: 2.0, avg_loss: 1.0 }.step(4.0, 0.0, 4);
        assert_eq!(state.avg_gain, 1.0 + 1.5);
        assert_eq!(state.avg_loss, 0.75);
    }

    #[test]
    fn threshold_is_strict() {
        let rsi = RsiIndicator::new(14, 30.0);
        assert!(rsi.is_oversold(29.99));
        assert!(!rsi.is_oversold(30.0));
    }
}
