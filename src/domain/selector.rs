//! Universe scanning and best-pair selection.

use crate::domain::cointegration::test_pair;
use crate::domain::config::BacktestConfig;
use crate::domain::error::PairtraderError;
use crate::domain::metrics::Metrics;
use crate::domain::report::PerformanceReport;
use crate::domain::series::PairSeries;
use crate::domain::signal::{build_signals, fit_hedge_ratio};
use crate::domain::simulation::run_simulation;
use crate::domain::universe::PairCandidate;
use crate::ports::data_port::DataPort;

/// A candidate excluded from the ranking, with its human-readable reason.
#[derive(Debug, Clone)]
pub struct SkippedPair {
    pub pair: PairCandidate,
    pub reason: String,
}

/// Result of scanning a universe: at least one viable report, the pairs
/// that fell out along the way, and the index of the Sharpe winner.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub reports: Vec<PerformanceReport>,
    pub skipped: Vec<SkippedPair>,
    pub best_index: usize,
}

impl ScanOutcome {
    pub fn best(&self) -> &PerformanceReport {
        &self.reports[self.best_index]
    }
}

/// Evaluate a single candidate end to end: fetch both legs, align, qualify,
/// fit the hedge ratio, derive signals, simulate, and score.
pub fn run_pair(
    data_port: &dyn DataPort,
    candidate: &PairCandidate,
    config: &BacktestConfig,
) -> Result<PerformanceReport, PairtraderError> {
    let closes_a =
        data_port.fetch_closes(&candidate.symbol_a, config.start_date, config.end_date)?;
    let closes_b =
        data_port.fetch_closes(&candidate.symbol_b, config.start_date, config.end_date)?;
    let series = PairSeries::align(
        &candidate.symbol_a,
        &candidate.symbol_b,
        &closes_a,
        &closes_b,
    );

    let cointegration = test_pair(&series, config)?;
    if !cointegration.is_cointegrated {
        return Err(PairtraderError::NotCointegrated {
            pair: candidate.to_string(),
            p_value: cointegration.p_value,
            significance: config.significance,
        });
    }

    let hedge_ratio = fit_hedge_ratio(&series.closes_a, &series.closes_b);
    let signals = build_signals(&series, hedge_ratio, config);
    let simulation = run_simulation(&signals, config);
    let metrics = Metrics::compute(
        &simulation.equity_curve,
        &simulation.trades,
        config.initial_capital,
    );

    Ok(PerformanceReport {
        pair: candidate.clone(),
        p_value: cointegration.p_value,
        test_statistic: cointegration.test_statistic,
        hedge_ratio,
        series,
        signals,
        simulation,
        metrics,
    })
}

/// Scan every candidate sequentially. Per-pair failures are warnings, not
/// faults: the pair is recorded as skipped and the scan continues. Only a
/// universe with zero viable pairs is a hard error.
pub fn scan_universe(
    data_port: &dyn DataPort,
    universe: &[PairCandidate],
    config: &BacktestConfig,
) -> Result<ScanOutcome, PairtraderError> {
    let mut reports = Vec::new();
    let mut skipped = Vec::new();

    for candidate in universe {
        match run_pair(data_port, candidate, config) {
            Ok(report) => reports.push(report),
            Err(e) => {
                eprintln!("Warning: skipping {} ({})", candidate, e);
                skipped.push(SkippedPair {
                    pair: candidate.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if reports.is_empty() {
        return Err(PairtraderError::NoViablePair {
            candidates: universe.len(),
        });
    }

    if !skipped.is_empty() {
        eprintln!(
            "Ranking {} of {} candidate pairs",
            reports.len(),
            universe.len()
        );
    }

    let best_index = rank_best(&reports);

    Ok(ScanOutcome {
        reports,
        skipped,
        best_index,
    })
}

/// Index of the maximum-Sharpe report. A NaN Sharpe never wins and the
/// first report wins ties.
fn rank_best(reports: &[PerformanceReport]) -> usize {
    let mut best_index = 0;
    let mut best_sharpe = f64::NEG_INFINITY;

    for (index, report) in reports.iter().enumerate() {
        let sharpe = report.metrics.sharpe;
        if !sharpe.is_nan() && sharpe > best_sharpe {
            best_index = index;
            best_sharpe = sharpe;
        }
    }

    best_index
}
