//! Spread and z-score signal derivation.
//!
//! The z-score is normalized by the whole window's mean and sample std,
//! future points included. That look-ahead is part of the backtest's
//! contract; live trading cannot reproduce it.

use crate::domain::config::BacktestConfig;
use crate::domain::series::PairSeries;
use crate::domain::stats::{mean, ols_fit, rolling_std, sample_std};

/// Per-timestamp signal values consumed by the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPoint {
    pub spread: f64,
    pub z_score: f64,
    pub spread_volatility: f64,
}

/// Full-window OLS slope of A on B; the intercept is discarded. The ratio
/// is fitted once and held constant for the whole simulation.
pub fn fit_hedge_ratio(closes_a: &[f64], closes_b: &[f64]) -> f64 {
    ols_fit(closes_a, closes_b).slope
}

/// Derive one `SignalPoint` per timestamp:
/// spread[t] = a[t] - hedge_ratio * b[t], z[t] against whole-series
/// mean/std, volatility as the trailing sample std over
/// `config.volatility_window` with the whole-series std substituted before
/// the window fills.
pub fn build_signals(
    series: &PairSeries,
    hedge_ratio: f64,
    config: &BacktestConfig,
) -> Vec<SignalPoint> {
    let spread: Vec<f64> = series
        .closes_a
        .iter()
        .zip(series.closes_b.iter())
        .map(|(a, b)| a - hedge_ratio * b)
        .collect();

    let spread_mean = mean(&spread);
    let spread_std = sample_std(&spread);
    let rolled = rolling_std(&spread, config.volatility_window);

    spread
        .iter()
        .zip(rolled)
        .map(|(&value, window_std)| SignalPoint {
            spread: value,
            // A flat spread pins z at 0; the pair never trades.
            z_score: if spread_std > 0.0 {
                (value - spread_mean) / spread_std
            } else {
                0.0
            },
            spread_volatility: window_std.unwrap_or(spread_std),
        })
        .collect()
}
