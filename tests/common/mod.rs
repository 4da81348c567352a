#![allow(dead_code)]

use chrono::NaiveDate;
use pairtrader::domain::error::PairtraderError;
pub use pairtrader::domain::series::ClosePoint;
use pairtrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<ClosePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, symbol: &str, closes: Vec<ClosePoint>) -> Self {
        self.data.insert(symbol.to_string(), closes);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_closes(
        &self,
        symbol: &str,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<Vec<ClosePoint>, PairtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PairtraderError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, PairtraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, PairtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PairtraderError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(closes) if !closes.is_empty() => {
                let min = closes.iter().map(|p| p.date).min().unwrap();
                let max = closes.iter().map(|p| p.date).max().unwrap();
                Ok(Some((min, max, closes.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_close(date: &str, close: f64) -> ClosePoint {
    ClosePoint {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        close,
    }
}

pub fn generate_closes(start_date: &str, values: &[f64]) -> Vec<ClosePoint> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, &close)| ClosePoint {
            date: start + chrono::Duration::days(i as i64),
            close,
        })
        .collect()
}

/// Leg B of a pair the cointegration test accepts: a slow trend plus a
/// bounded oscillation.
pub fn trending_leg(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| 50.0 + 0.05 * i as f64 + 2.0 * (i as f64 / 9.0).sin())
        .collect()
}

/// Leg A tracking `trending_leg` at a fixed multiple, with its own fast
/// oscillation, so the regression residual mean-reverts.
pub fn tracking_leg(leg_b: &[f64]) -> Vec<f64> {
    leg_b
        .iter()
        .enumerate()
        .map(|(i, b)| 2.0 * b + 1.5 * (i as f64 * 0.9).sin())
        .collect()
}

/// A bare linear drift with no oscillation, for building pairs the
/// qualifier rejects.
pub fn drifting_leg(count: usize) -> Vec<f64> {
    (0..count).map(|i| 20.0 + 0.1 * i as f64).collect()
}

/// Leg A that drifts quadratically away from B; the qualifier rejects
/// this pair.
pub fn diverging_leg(leg_b: &[f64]) -> Vec<f64> {
    leg_b.iter().map(|b| b * b / 20.0).collect()
}
