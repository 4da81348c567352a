//! Integration tests.
//!
//! Tests cover:
//! - Full pair pipeline with mock data port (fetch, align, qualify,
//!   simulate, score)
//! - Universe scan with mixed candidates (viable, rejected, unavailable)
//! - CSV-backed end-to-end run against a temp data directory
//! - Report port wiring and the HTML dashboard output
//! - Live replay over a finished report
//! - Property checks on the simulation and metrics invariants

mod common;

use common::*;
use pairtrader::cli::replay_simulation;
use pairtrader::domain::config::BacktestConfig;
use pairtrader::domain::error::PairtraderError;
use pairtrader::domain::metrics::Metrics;
use pairtrader::domain::report::PerformanceReport;
use pairtrader::domain::selector::{run_pair, scan_universe};
use pairtrader::domain::signal::SignalPoint;
use pairtrader::domain::simulation::run_simulation;
use pairtrader::domain::universe::PairCandidate;
use pairtrader::ports::progress_port::{ProgressPort, StepUpdate, TradeEvent};
use pairtrader::ports::report_port::ReportPort;
use proptest::prelude::*;
use std::cell::RefCell;

fn cointegrated_port(count: usize) -> MockDataPort {
    let leg_b = trending_leg(count);
    let leg_a = tracking_leg(&leg_b);
    MockDataPort::new()
        .with_closes("AAA", generate_closes("2022-01-03", &leg_a))
        .with_closes("BBB", generate_closes("2022-01-03", &leg_b))
}

mod pair_pipeline {
    use super::*;

    #[test]
    fn full_pipeline_on_cointegrated_pair() {
        let port = cointegrated_port(250);
        let config = BacktestConfig::default();
        let candidate = PairCandidate::new("AAA", "BBB");

        let report = run_pair(&port, &candidate, &config).unwrap();

        assert_eq!(report.pair.to_string(), "AAA/BBB");
        assert_eq!(report.series.len(), 250);
        assert_eq!(report.signals.len(), 250);
        assert_eq!(report.simulation.equity_curve.len(), 250);
        assert!(
            (report.simulation.equity_curve[0] - config.initial_capital).abs() < f64::EPSILON
        );
        assert!(report.p_value < 0.05);
        assert!(
            (report.hedge_ratio - 2.0).abs() < 0.2,
            "hedge ratio drifted: {}",
            report.hedge_ratio
        );
        assert!(report.metrics.sharpe.is_finite());
        assert!(report.metrics.max_drawdown >= 0.0 && report.metrics.max_drawdown <= 1.0);
        assert!(report.metrics.win_rate >= 0.0 && report.metrics.win_rate <= 1.0);
    }

    #[test]
    fn oscillating_pair_actually_trades() {
        let port = cointegrated_port(250);
        let report = run_pair(
            &port,
            &PairCandidate::new("AAA", "BBB"),
            &BacktestConfig::default(),
        )
        .unwrap();

        assert!(
            report.metrics.total_trades > 0,
            "the fast oscillation should cross the entry band"
        );
        let exits = report
            .simulation
            .trades
            .iter()
            .filter(|t| t.net_pnl.is_some())
            .count();
        assert_eq!(exits, report.metrics.total_trades);
    }

    #[test]
    fn data_error_propagates() {
        let port = cointegrated_port(250).with_error("AAA", "disk failure");
        let err = run_pair(
            &port,
            &PairCandidate::new("AAA", "BBB"),
            &BacktestConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            PairtraderError::DataUnavailable { ref symbol, .. } if symbol == "AAA"
        ));
    }

    #[test]
    fn missing_symbol_yields_insufficient_data() {
        let port = cointegrated_port(250);
        let err = run_pair(
            &port,
            &PairCandidate::new("AAA", "ZZZ"),
            &BacktestConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            PairtraderError::InsufficientData { observations: 0, minimum: 100, .. }
        ));
    }

    #[test]
    fn diverging_pair_is_rejected() {
        let leg_b = drifting_leg(250);
        let leg_a = diverging_leg(&leg_b);
        let port = MockDataPort::new()
            .with_closes("CCC", generate_closes("2022-01-03", &leg_a))
            .with_closes("DDD", generate_closes("2022-01-03", &leg_b));

        let config = BacktestConfig::default();
        let err = run_pair(&port, &PairCandidate::new("CCC", "DDD"), &config).unwrap_err();

        match err {
            PairtraderError::NotCointegrated {
                pair,
                p_value,
                significance,
            } => {
                assert_eq!(pair, "CCC/DDD");
                assert!(p_value > significance);
            }
            other => panic!("expected NotCointegrated, got {other:?}"),
        }
    }
}

mod universe_scan {
    use super::*;

    #[test]
    fn scan_ranks_viable_pairs_and_records_skips() {
        let leg_b = trending_leg(250);
        let leg_a = tracking_leg(&leg_b);
        let drift = drifting_leg(250);
        let curve = diverging_leg(&drift);
        let port = MockDataPort::new()
            .with_closes("AAA", generate_closes("2022-01-03", &leg_a))
            .with_closes("BBB", generate_closes("2022-01-03", &leg_b))
            .with_closes("CCC", generate_closes("2022-01-03", &curve))
            .with_closes("DDD", generate_closes("2022-01-03", &drift))
            .with_error("EEE", "connection reset");

        let universe = vec![
            PairCandidate::new("AAA", "BBB"),
            PairCandidate::new("CCC", "DDD"),
            PairCandidate::new("EEE", "FFF"),
        ];
        let outcome = scan_universe(&port, &universe, &BacktestConfig::default()).unwrap();

        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.best().pair.to_string(), "AAA/BBB");

        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0].pair.to_string(), "CCC/DDD");
        assert!(outcome.skipped[0].reason.contains("not cointegrated"));
        assert_eq!(outcome.skipped[1].pair.to_string(), "EEE/FFF");
        assert!(outcome.skipped[1].reason.contains("no data for EEE"));
    }

    #[test]
    fn scan_tie_prefers_first_candidate() {
        let port = cointegrated_port(250);
        let universe = vec![
            PairCandidate::new("AAA", "BBB"),
            PairCandidate::new("AAA", "BBB"),
        ];

        let outcome = scan_universe(&port, &universe, &BacktestConfig::default()).unwrap();

        assert_eq!(outcome.reports.len(), 2);
        assert_eq!(outcome.best_index, 0);
        assert_eq!(
            outcome.reports[0].metrics.sharpe,
            outcome.reports[1].metrics.sharpe
        );
    }

    #[test]
    fn all_failures_is_no_viable_pair() {
        let port = MockDataPort::new()
            .with_error("AAA", "gone")
            .with_error("CCC", "gone");
        let universe = vec![
            PairCandidate::new("AAA", "BBB"),
            PairCandidate::new("CCC", "DDD"),
        ];

        let err = scan_universe(&port, &universe, &BacktestConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            PairtraderError::NoViablePair { candidates: 2 }
        ));
    }

    #[test]
    fn empty_universe_is_no_viable_pair() {
        let port = MockDataPort::new();
        let err = scan_universe(&port, &[], &BacktestConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            PairtraderError::NoViablePair { candidates: 0 }
        ));
    }
}

mod csv_end_to_end {
    use super::*;
    use pairtrader::adapters::csv_adapter::CsvAdapter;
    use tempfile::TempDir;

    fn write_symbol_csv(dir: &std::path::Path, symbol: &str, closes: &[f64]) {
        let start = date(2022, 1, 3);
        let mut content = String::from("date,close\n");
        for (i, close) in closes.iter().enumerate() {
            let day = start + chrono::Duration::days(i as i64);
            content.push_str(&format!("{},{}\n", day.format("%Y-%m-%d"), close));
        }
        std::fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
    }

    #[test]
    fn csv_backed_pipeline_produces_report() {
        let dir = TempDir::new().unwrap();
        let leg_b = trending_leg(250);
        let leg_a = tracking_leg(&leg_b);
        write_symbol_csv(dir.path(), "KO", &leg_a);
        write_symbol_csv(dir.path(), "PEP", &leg_b);

        let port = CsvAdapter::new(dir.path().to_path_buf());
        let config = BacktestConfig::default();
        let report = run_pair(&port, &PairCandidate::new("KO", "PEP"), &config).unwrap();

        assert_eq!(report.series.len(), 250);
        assert!(report.p_value < 0.05);
        assert!(
            (report.simulation.equity_curve[0] - config.initial_capital).abs() < f64::EPSILON
        );
    }

    #[test]
    fn csv_scan_skips_pair_with_missing_file() {
        let dir = TempDir::new().unwrap();
        let leg_b = trending_leg(250);
        let leg_a = tracking_leg(&leg_b);
        write_symbol_csv(dir.path(), "KO", &leg_a);
        write_symbol_csv(dir.path(), "PEP", &leg_b);

        let port = CsvAdapter::new(dir.path().to_path_buf());
        let universe = vec![
            PairCandidate::new("KO", "PEP"),
            PairCandidate::new("XOM", "CVX"),
        ];
        let outcome = scan_universe(&port, &universe, &BacktestConfig::default()).unwrap();

        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].pair.to_string(), "XOM/CVX");
    }
}

struct MockReportPort {
    calls: RefCell<Vec<(PerformanceReport, BacktestConfig, String)>>,
}

impl MockReportPort {
    fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn write(
        &self,
        report: &PerformanceReport,
        config: &BacktestConfig,
        output_path: &str,
    ) -> Result<(), PairtraderError> {
        self.calls
            .borrow_mut()
            .push((report.clone(), config.clone(), output_path.to_string()));
        Ok(())
    }
}

mod report_generation {
    use super::*;
    use pairtrader::adapters::html_report_adapter::HtmlReportAdapter;
    use tempfile::TempDir;

    #[test]
    fn report_port_receives_finished_report() {
        let port = cointegrated_port(250);
        let config = BacktestConfig::default();
        let report = run_pair(&port, &PairCandidate::new("AAA", "BBB"), &config).unwrap();

        let sink = MockReportPort::new();
        sink.write(&report, &config, "out.html").unwrap();

        let calls = sink.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (ref stored, ref stored_config, ref path) = calls[0];
        assert_eq!(stored.pair, report.pair);
        assert_eq!(stored.simulation.equity_curve.len(), 250);
        assert_eq!(stored_config.initial_capital, config.initial_capital);
        assert_eq!(path, "out.html");
    }

    #[test]
    fn html_dashboard_written_from_pipeline_report() {
        let data_dir = TempDir::new().unwrap();
        let port = cointegrated_port(250);
        let config = BacktestConfig::default();
        let report = run_pair(&port, &PairCandidate::new("AAA", "BBB"), &config).unwrap();

        let out = data_dir.path().join("dashboard.html");
        let writer = HtmlReportAdapter::new();
        writer
            .write(&report, &config, &out.to_string_lossy())
            .unwrap();

        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.contains("AAA/BBB"));
        assert!(html.matches("<svg").count() >= 4);
    }
}

mod live_replay {
    use super::*;

    struct CollectingProgress {
        steps: RefCell<Vec<StepUpdate>>,
        trades: RefCell<Vec<TradeEvent>>,
    }

    impl CollectingProgress {
        fn new() -> Self {
            Self {
                steps: RefCell::new(Vec::new()),
                trades: RefCell::new(Vec::new()),
            }
        }
    }

    impl ProgressPort for CollectingProgress {
        fn on_step(&self, update: &StepUpdate) {
            self.steps.borrow_mut().push(*update);
        }

        fn on_trade(&self, event: &TradeEvent) {
            self.trades.borrow_mut().push(*event);
        }
    }

    #[test]
    fn replay_emits_one_step_per_bar() {
        let port = cointegrated_port(250);
        let config = BacktestConfig::default();
        let report = run_pair(&port, &PairCandidate::new("AAA", "BBB"), &config).unwrap();

        let progress = CollectingProgress::new();
        replay_simulation(&report, &config, &progress);

        let steps = progress.steps.borrow();
        assert_eq!(steps.len(), report.signals.len());
        assert_eq!(steps[0].index, 0);
        assert_eq!(steps[0].total, 250);
        assert_eq!(steps[0].equity, config.initial_capital);
        assert_eq!(steps[0].position, 0.0);
        for (index, step) in steps.iter().enumerate() {
            assert_eq!(step.index, index);
            assert_eq!(step.equity, report.simulation.equity_curve[index]);
        }
    }

    #[test]
    fn replay_trade_events_match_simulation_trades() {
        let port = cointegrated_port(250);
        let config = BacktestConfig::default();
        let report = run_pair(&port, &PairCandidate::new("AAA", "BBB"), &config).unwrap();
        assert!(!report.simulation.trades.is_empty());

        let progress = CollectingProgress::new();
        replay_simulation(&report, &config, &progress);

        let events = progress.trades.borrow();
        assert_eq!(events.len(), report.simulation.trades.len());
        for (event, mark) in events.iter().zip(report.simulation.trades.iter()) {
            assert_eq!(event.action, mark.action);
            assert_eq!(event.net_pnl, mark.net_pnl);
            assert_eq!(event.date, report.series.dates[mark.index]);
            assert!(event.position_size > 0.0);
        }
    }
}

mod simulation_properties {
    use super::*;

    fn arb_signals() -> impl Strategy<Value = Vec<SignalPoint>> {
        prop::collection::vec(
            (-4.0..4.0_f64, -20.0..20.0_f64, 0.01..5.0_f64),
            0..60,
        )
        .prop_map(|points| {
            points
                .into_iter()
                .map(|(z_score, spread, spread_volatility)| SignalPoint {
                    spread,
                    z_score,
                    spread_volatility,
                })
                .collect()
        })
    }

    proptest! {
        /// The equity curve spans the full signal sequence no matter what
        /// the signals look like.
        #[test]
        fn equity_curve_always_spans_signals(signals in arb_signals()) {
            let config = BacktestConfig::default();
            let simulation = run_simulation(&signals, &config);

            prop_assert_eq!(simulation.equity_curve.len(), signals.len());
            if !signals.is_empty() {
                prop_assert!(
                    (simulation.equity_curve[0] - config.initial_capital).abs() < f64::EPSILON
                );
            }
        }

        /// Drawdown is a fraction of the running peak.
        #[test]
        fn drawdown_stays_in_unit_interval(
            curve in prop::collection::vec(1.0..1_000_000.0_f64, 1..80),
        ) {
            let metrics = Metrics::compute(&curve, &[], curve[0]);

            prop_assert!(metrics.max_drawdown >= 0.0);
            prop_assert!(metrics.max_drawdown <= 1.0);
            prop_assert!(metrics.sharpe.is_finite());
        }
    }
}
