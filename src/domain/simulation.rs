//! Spread-trading state machine.
//!
//! Steps through a signal sequence one timestamp at a time, holding at most
//! one open spread position, and produces an equity curve plus a trade log.
//! The simulation is a pure function of (signals, config); progress output
//! and charting consume the finished result elsewhere.

use std::fmt;

use crate::domain::config::BacktestConfig;
use crate::domain::signal::SignalPoint;
use crate::domain::sizing::position_size;

/// Logged transition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Long,
    Short,
    Exit,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Long => write!(f, "LONG"),
            TradeAction::Short => write!(f, "SHORT"),
            TradeAction::Exit => write!(f, "EXIT"),
        }
    }
}

/// One trade-log entry. `net_pnl` is present only for exits; entries carry
/// `None` because nothing is realized yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeMark {
    pub index: usize,
    pub spread: f64,
    pub action: TradeAction,
    pub net_pnl: Option<f64>,
}

/// Mutable per-run simulation state. `position` is a signed spread quantity:
/// 0.0 is flat, positive is long the spread, negative is short.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionState {
    pub position: f64,
    pub entry_spread: f64,
    pub cash: f64,
    pub trades: Vec<TradeMark>,
}

impl PositionState {
    pub fn new(initial_capital: f64) -> Self {
        PositionState {
            position: 0.0,
            entry_spread: 0.0,
            cash: initial_capital,
            trades: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position == 0.0
    }

    /// Mark-to-market value of the open position, 0 when flat.
    pub fn unrealized(&self, spread: f64) -> f64 {
        if self.is_flat() {
            0.0
        } else {
            self.position * (spread - self.entry_spread)
        }
    }

    fn enter_long(&mut self, index: usize, spread: f64, size: f64) {
        self.position = size;
        self.entry_spread = spread;
        self.trades.push(TradeMark {
            index,
            spread,
            action: TradeAction::Long,
            net_pnl: None,
        });
    }

    fn enter_short(&mut self, index: usize, spread: f64, size: f64) {
        self.position = -size;
        self.entry_spread = spread;
        self.trades.push(TradeMark {
            index,
            spread,
            action: TradeAction::Short,
            net_pnl: None,
        });
    }

    /// Realize the open position: pnl = position * (spread - entry_spread),
    /// minus a proportional transaction cost on its magnitude.
    fn exit_trade(&mut self, index: usize, spread: f64, cost_rate: f64) {
        let pnl = self.position * (spread - self.entry_spread);
        let net_pnl = pnl - pnl.abs() * cost_rate;
        self.cash += net_pnl;
        self.position = 0.0;
        self.entry_spread = 0.0;
        self.trades.push(TradeMark {
            index,
            spread,
            action: TradeAction::Exit,
            net_pnl: Some(net_pnl),
        });
    }

    /// Apply one timestamp's transition. Flat-state entries are checked
    /// before the exit band, so entry and exit are mutually exclusive
    /// within a single step.
    fn step(&mut self, index: usize, point: &SignalPoint, config: &BacktestConfig) {
        if self.is_flat() && point.z_score < -config.entry_threshold {
            let size = position_size(point.spread_volatility, config);
            self.enter_long(index, point.spread, size);
        } else if self.is_flat() && point.z_score > config.entry_threshold {
            let size = position_size(point.spread_volatility, config);
            self.enter_short(index, point.spread, size);
        } else if !self.is_flat() && point.z_score.abs() < config.exit_threshold {
            self.exit_trade(index, point.spread, config.transaction_cost);
        }
        // Otherwise hold: no state change.
    }
}

/// Finished simulation output.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub equity_curve: Vec<f64>,
    pub trades: Vec<TradeMark>,
}

/// Run the state machine over a signal sequence.
///
/// The first timestamp is the equity baseline (initial capital, no trading
/// decision); transitions start at t = 1. After each step the curve gets
/// cash plus unrealized P&L, so its length always equals the signal length.
pub fn run_simulation(signals: &[SignalPoint], config: &BacktestConfig) -> Simulation {
    if signals.is_empty() {
        return Simulation {
            equity_curve: Vec::new(),
            trades: Vec::new(),
        };
    }

    let mut state = PositionState::new(config.initial_capital);
    let mut equity_curve = Vec::with_capacity(signals.len());
    equity_curve.push(config.initial_capital);

    for (index, point) in signals.iter().enumerate().skip(1) {
        state.step(index, point, config);
        equity_curve.push(state.cash + state.unrealized(point.spread));
    }

    // The curve spans every timestamp even if stepping ever stops short.
    equity_curve.resize(signals.len(), config.initial_capital);

    Simulation {
        equity_curve,
        trades: state.trades,
    }
}
