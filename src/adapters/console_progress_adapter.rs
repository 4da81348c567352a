//! Console progress adapter for live-style replay.
//!
//! Prints each simulated step to stderr, pacing the stream with a fixed
//! delay so the replay reads like a ticking session.

use std::thread;
use std::time::Duration;

use crate::ports::progress_port::{ProgressPort, StepUpdate, TradeEvent};

pub struct ConsoleProgressAdapter {
    refresh: Duration,
}

impl ConsoleProgressAdapter {
    pub fn new(refresh_ms: u64) -> Self {
        Self {
            refresh: Duration::from_millis(refresh_ms),
        }
    }
}

impl ProgressPort for ConsoleProgressAdapter {
    fn on_step(&self, update: &StepUpdate) {
        eprintln!(
            "[{:>4}/{}] {}  z {:+6.2}  pos {:+9.2}  equity {:>12.2}",
            update.index, update.total, update.date, update.z_score, update.position, update.equity
        );
        if !self.refresh.is_zero() {
            thread::sleep(self.refresh);
        }
    }

    fn on_trade(&self, event: &TradeEvent) {
        match event.net_pnl {
            Some(pnl) => eprintln!(
                "  {} {:<5}  z {:+6.2}  net pnl {:+10.2}  equity {:>12.2}",
                event.date, event.action, event.z_score, pnl, event.equity
            ),
            None => eprintln!(
                "  {} {:<5}  z {:+6.2}  size {:10.2}  equity {:>12.2}",
                event.date, event.action, event.z_score, event.position_size, event.equity
            ),
        }
    }
}
