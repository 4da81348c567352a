//! Volatility-targeted position sizing.

use crate::domain::config::BacktestConfig;

/// Spread units to hold for one entry: `target_risk_unit / volatility`,
/// scaled by `risk_multiplier`. A volatility that is zero, negative, or
/// non-finite collapses the whole ratio to 1.0, so such entries size at
/// exactly `risk_multiplier`. The result is not capped; a small but
/// positive volatility produces a large position.
pub fn position_size(spread_volatility: f64, config: &BacktestConfig) -> f64 {
    let ratio = if spread_volatility.is_finite() && spread_volatility > 0.0 {
        config.target_risk_unit / spread_volatility
    } else {
        1.0
    };
    ratio * config.risk_multiplier
}
