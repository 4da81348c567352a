//! CSV file data adapter.
//!
//! One file per symbol, `{SYMBOL}.csv`, with a `date,close` header and
//! ISO dates. Rows may arrive unsorted; the adapter sorts before serving.

use crate::domain::error::PairtraderError;
use crate::domain::series::ClosePoint;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<ClosePoint>, PairtraderError> {
        let path = self.csv_path(symbol);
        let content =
            fs::read_to_string(&path).map_err(|e| PairtraderError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| PairtraderError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record
                .get(0)
                .ok_or_else(|| PairtraderError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: "missing date column".into(),
                })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                PairtraderError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            let close: f64 = record
                .get(1)
                .ok_or_else(|| PairtraderError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: "missing close column".into(),
                })?
                .parse()
                .map_err(|e| PairtraderError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: format!("invalid close value: {}", e),
                })?;

            points.push(ClosePoint { date, close });
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_closes(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<ClosePoint>, PairtraderError> {
        let points = self.read_all(symbol)?;
        Ok(points
            .into_iter()
            .filter(|p| p.date >= start_date && p.date <= end_date)
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, PairtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            PairtraderError::DataUnavailable {
                symbol: "*".to_string(),
                reason: format!(
                    "failed to read directory {}: {}",
                    self.base_path.display(),
                    e
                ),
            }
        })?;

        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| PairtraderError::DataUnavailable {
                symbol: "*".to_string(),
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, PairtraderError> {
        if !self.csv_path(symbol).exists() {
            return Ok(None);
        }

        let points = self.read_all(symbol)?;
        match (points.first(), points.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, points.len()))),
            _ => Ok(None),
        }
    }
}
