//! Report generation port trait.

use crate::domain::config::BacktestConfig;
use crate::domain::error::PairtraderError;
use crate::domain::report::PerformanceReport;

/// Port for writing a pair's performance report.
pub trait ReportPort {
    fn write(
        &self,
        report: &PerformanceReport,
        config: &BacktestConfig,
        output_path: &str,
    ) -> Result<(), PairtraderError>;
}
