//! Close-price series and two-symbol alignment.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// One daily closing price.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Two close series joined on date: identical timestamp set, no gaps.
/// Immutable once built; every downstream component indexes into these
/// vectors positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct PairSeries {
    pub symbol_a: String,
    pub symbol_b: String,
    pub dates: Vec<NaiveDate>,
    pub closes_a: Vec<f64>,
    pub closes_b: Vec<f64>,
}

impl PairSeries {
    /// Inner-join two series on date, ascending. Dates present in only one
    /// series are dropped; duplicate dates collapse to the last value.
    pub fn align(
        symbol_a: &str,
        symbol_b: &str,
        series_a: &[ClosePoint],
        series_b: &[ClosePoint],
    ) -> Self {
        let ordered_a: BTreeMap<NaiveDate, f64> =
            series_a.iter().map(|p| (p.date, p.close)).collect();
        let index_b: HashMap<NaiveDate, f64> =
            series_b.iter().map(|p| (p.date, p.close)).collect();

        let mut dates = Vec::new();
        let mut closes_a = Vec::new();
        let mut closes_b = Vec::new();
        for (date, close_a) in ordered_a {
            if let Some(&close_b) = index_b.get(&date) {
                dates.push(date);
                closes_a.push(close_a);
                closes_b.push(close_b);
            }
        }

        PairSeries {
            symbol_a: symbol_a.to_string(),
            symbol_b: symbol_b.to_string(),
            dates,
            closes_a,
            closes_b,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, close: f64) -> ClosePoint {
        ClosePoint {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            close,
        }
    }

    #[test]
    fn align_keeps_common_dates_in_order() {
        let a = vec![
            point("2024-01-01", 100.0),
            point("2024-01-02", 101.0),
            point("2024-01-04", 103.0),
        ];
        let b = vec![
            point("2024-01-02", 50.0),
            point("2024-01-03", 51.0),
            point("2024-01-04", 52.0),
        ];

        let pair = PairSeries::align("KO", "PEP", &a, &b);

        assert_eq!(pair.len(), 2);
        assert_eq!(pair.dates[0], NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(pair.dates[1], NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert!((pair.closes_a[0] - 101.0).abs() < f64::EPSILON);
        assert!((pair.closes_b[0] - 50.0).abs() < f64::EPSILON);
        assert!((pair.closes_a[1] - 103.0).abs() < f64::EPSILON);
        assert!((pair.closes_b[1] - 52.0).abs() < f64::EPSILON);
    }

    #[test]
    fn align_sorts_unordered_input() {
        let a = vec![point("2024-01-03", 102.0), point("2024-01-01", 100.0)];
        let b = vec![point("2024-01-01", 50.0), point("2024-01-03", 51.0)];

        let pair = PairSeries::align("KO", "PEP", &a, &b);

        assert_eq!(pair.dates[0], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(pair.dates[1], NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn align_disjoint_dates_is_empty() {
        let a = vec![point("2024-01-01", 100.0)];
        let b = vec![point("2024-01-02", 50.0)];

        let pair = PairSeries::align("KO", "PEP", &a, &b);

        assert!(pair.is_empty());
        assert_eq!(pair.len(), 0);
    }

    #[test]
    fn align_carries_symbols() {
        let pair = PairSeries::align("XOM", "CVX", &[], &[]);
        assert_eq!(pair.symbol_a, "XOM");
        assert_eq!(pair.symbol_b, "CVX");
    }
}
