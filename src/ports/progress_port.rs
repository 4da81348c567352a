//! Progress/telemetry sink trait for replaying a finished simulation.
//!
//! Observers receive already-computed values; nothing they do feeds back
//! into the state machine.

use chrono::NaiveDate;

use crate::domain::simulation::TradeAction;

/// One simulated timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepUpdate {
    pub date: NaiveDate,
    pub index: usize,
    pub total: usize,
    pub z_score: f64,
    pub position: f64,
    pub equity: f64,
}

/// A position transition at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeEvent {
    pub date: NaiveDate,
    pub action: TradeAction,
    pub z_score: f64,
    pub position_size: f64,
    pub net_pnl: Option<f64>,
    pub equity: f64,
}

pub trait ProgressPort {
    fn on_step(&self, update: &StepUpdate);
    fn on_trade(&self, event: &TradeEvent);
}
