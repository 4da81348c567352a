//! Performance metrics over a finished simulation.

use crate::domain::simulation::{TradeAction, TradeMark};
use crate::domain::stats::{mean, sample_std};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Summary statistics for one pair's equity curve and trade log.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub sharpe: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub total_trades: usize,
}

impl Metrics {
    /// All values are pure functions of the curve and the trade log. Win
    /// rate and trade count consider exits only; entries carry no realized
    /// P&L.
    pub fn compute(equity_curve: &[f64], trades: &[TradeMark], initial_capital: f64) -> Self {
        let final_equity = equity_curve.last().copied().unwrap_or(initial_capital);
        let total_return = if initial_capital > 0.0 {
            (final_equity - initial_capital) / initial_capital
        } else {
            0.0
        };

        let sharpe = compute_sharpe(equity_curve);
        let max_drawdown = compute_drawdown(equity_curve);

        let exit_pnls: Vec<f64> = trades
            .iter()
            .filter(|t| t.action == TradeAction::Exit)
            .filter_map(|t| t.net_pnl)
            .collect();
        let total_trades = exit_pnls.len();
        let wins = exit_pnls.iter().filter(|&&pnl| pnl > 0.0).count();
        let win_rate = if total_trades > 0 {
            wins as f64 / total_trades as f64
        } else {
            0.0
        };

        Metrics {
            sharpe,
            total_return,
            max_drawdown,
            win_rate,
            total_trades,
        }
    }
}

/// Annualized mean/std of per-step simple returns, 0 when the returns have
/// no variance.
fn compute_sharpe(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect();

    let std = sample_std(&returns);
    if std > 0.0 {
        TRADING_DAYS_PER_YEAR.sqrt() * mean(&returns) / std
    } else {
        0.0
    }
}

/// Largest peak-to-trough decline as a fraction of the running peak.
fn compute_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = match equity_curve.first() {
        Some(&first) => first,
        None => return 0.0,
    };
    let mut max_dd = 0.0_f64;

    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}
