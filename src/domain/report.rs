//! Immutable per-pair result object.

use crate::domain::metrics::Metrics;
use crate::domain::series::PairSeries;
use crate::domain::signal::SignalPoint;
use crate::domain::simulation::Simulation;
use crate::domain::universe::PairCandidate;

/// Everything a consumer needs about one evaluated pair: the qualification
/// statistics, the fitted hedge ratio, the aligned input series, the signal
/// sequence, the finished simulation, and its summary metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub pair: PairCandidate,
    pub p_value: f64,
    pub test_statistic: f64,
    pub hedge_ratio: f64,
    pub series: PairSeries,
    pub signals: Vec<SignalPoint>,
    pub simulation: Simulation,
    pub metrics: Metrics,
}
