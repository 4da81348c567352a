//! Backtest configuration.
//!
//! Every tunable the pipeline reads lives here and is passed by reference
//! into the components; nothing consults process-wide state.

use chrono::NaiveDate;

use crate::domain::error::PairtraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    /// Entry when |z| exceeds this, in the direction that fades the move.
    pub entry_threshold: f64,
    /// Exit when |z| falls back inside this band.
    pub exit_threshold: f64,
    /// Proportional cost applied to |realized pnl| on each exit.
    pub transaction_cost: f64,
    pub risk_multiplier: f64,
    pub target_risk_unit: f64,
    /// Trailing window, in observations, for the spread volatility estimate.
    pub volatility_window: usize,
    /// Cointegration p-value gate.
    pub significance: f64,
    /// Minimum aligned observations before a pair is testable.
    pub min_observations: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            initial_capital: 100_000.0,
            entry_threshold: 1.5,
            exit_threshold: 0.3,
            transaction_cost: 0.001,
            risk_multiplier: 5.0,
            target_risk_unit: 1.0,
            volatility_window: 20,
            significance: 0.05,
            min_observations: 100,
        }
    }
}

impl BacktestConfig {
    /// Check every field before a run; first violation wins.
    pub fn validate(&self) -> Result<(), PairtraderError> {
        if self.start_date >= self.end_date {
            return Err(invalid("start_date", "start_date must be before end_date"));
        }
        if self.initial_capital <= 0.0 {
            return Err(invalid("initial_capital", "initial_capital must be positive"));
        }
        if self.entry_threshold <= 0.0 {
            return Err(invalid("entry_threshold", "entry_threshold must be positive"));
        }
        if self.exit_threshold <= 0.0 {
            return Err(invalid("exit_threshold", "exit_threshold must be positive"));
        }
        if self.exit_threshold >= self.entry_threshold {
            return Err(invalid(
                "exit_threshold",
                "exit_threshold must be below entry_threshold",
            ));
        }
        if !(0.0..1.0).contains(&self.transaction_cost) {
            return Err(invalid(
                "transaction_cost",
                "transaction_cost must be in [0, 1)",
            ));
        }
        if self.risk_multiplier <= 0.0 {
            return Err(invalid("risk_multiplier", "risk_multiplier must be positive"));
        }
        if self.target_risk_unit <= 0.0 {
            return Err(invalid(
                "target_risk_unit",
                "target_risk_unit must be positive",
            ));
        }
        if self.volatility_window < 2 {
            return Err(invalid(
                "volatility_window",
                "volatility_window must be at least 2",
            ));
        }
        if self.significance <= 0.0 || self.significance >= 1.0 {
            return Err(invalid(
                "significance",
                "significance must be between 0 and 1",
            ));
        }
        if self.min_observations < 3 {
            return Err(invalid(
                "min_observations",
                "min_observations must be at least 3",
            ));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> PairtraderError {
    PairtraderError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
