//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::console_progress_adapter::ConsoleProgressAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::domain::config::BacktestConfig;
use crate::domain::error::PairtraderError;
use crate::domain::report::PerformanceReport;
use crate::domain::selector::{run_pair, scan_universe};
use crate::domain::sizing::position_size;
use crate::domain::simulation::TradeAction;
use crate::domain::universe::{default_universe, parse_pair, parse_pairs, PairCandidate};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::progress_port::{ProgressPort, StepUpdate, TradeEvent};
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "pairtrader", about = "Pair trading mean-reversion backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the pair universe and rank by Sharpe ratio
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        pairs: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        live: bool,
    },
    /// Backtest a single pair
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        pair: String,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        live: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols with data available
    ListSymbols {
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Scan {
            config,
            data_dir,
            pairs,
            output,
            live,
        } => run_scan(
            &config,
            data_dir.as_ref(),
            pairs.as_deref(),
            output.as_ref(),
            live,
        ),
        Command::Backtest {
            config,
            pair,
            data_dir,
            output,
            live,
        } => run_backtest(&config, &pair, data_dir.as_ref(), output.as_ref(), live),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { data_dir, config } => {
            run_list_symbols(data_dir.as_ref(), config.as_ref())
        }
        Command::Info {
            symbol,
            data_dir,
            config,
        } => run_info(symbol.as_deref(), data_dir.as_ref(), config.as_ref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, PairtraderError> {
    let start_str = adapter
        .get_string("backtest", "start_date")
        .ok_or_else(|| PairtraderError::ConfigMissing {
            section: "backtest".into(),
            key: "start_date".into(),
        })?;
    let end_str = adapter.get_string("backtest", "end_date").ok_or_else(|| {
        PairtraderError::ConfigMissing {
            section: "backtest".into(),
            key: "end_date".into(),
        }
    })?;

    let start_date = NaiveDate::parse_from_str(&start_str, "%Y-%m-%d").map_err(|_| {
        PairtraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "start_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;
    let end_date = NaiveDate::parse_from_str(&end_str, "%Y-%m-%d").map_err(|_| {
        PairtraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "end_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;

    let defaults = BacktestConfig::default();
    let config = BacktestConfig {
        start_date,
        end_date,
        initial_capital: adapter.get_double(
            "backtest",
            "initial_capital",
            defaults.initial_capital,
        ),
        entry_threshold: adapter.get_double(
            "backtest",
            "entry_threshold",
            defaults.entry_threshold,
        ),
        exit_threshold: adapter.get_double("backtest", "exit_threshold", defaults.exit_threshold),
        transaction_cost: adapter.get_double(
            "backtest",
            "transaction_cost",
            defaults.transaction_cost,
        ),
        risk_multiplier: adapter.get_double("backtest", "risk_multiplier", defaults.risk_multiplier),
        target_risk_unit: adapter.get_double(
            "backtest",
            "target_risk_unit",
            defaults.target_risk_unit,
        ),
        volatility_window: get_usize(adapter, "volatility_window", defaults.volatility_window)?,
        significance: adapter.get_double("backtest", "significance", defaults.significance),
        min_observations: get_usize(adapter, "min_observations", defaults.min_observations)?,
    };

    config.validate()?;
    Ok(config)
}

fn get_usize(
    adapter: &dyn ConfigPort,
    key: &str,
    default: usize,
) -> Result<usize, PairtraderError> {
    let raw = adapter.get_int("backtest", key, default as i64);
    usize::try_from(raw).map_err(|_| PairtraderError::ConfigInvalid {
        section: "backtest".into(),
        key: key.into(),
        reason: "must not be negative".into(),
    })
}

/// Pair universe precedence: CLI override, then `[universe] pairs`, then
/// the built-in default list.
pub fn resolve_universe(
    pairs_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<PairCandidate>, PairtraderError> {
    if let Some(spec) = pairs_override {
        return parse_pairs(spec);
    }
    if let Some(spec) = config.get_string("universe", "pairs") {
        return parse_pairs(&spec);
    }
    Ok(default_universe())
}

pub fn resolve_data_dir(flag: Option<&PathBuf>, config: Option<&dyn ConfigPort>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.clone();
    }
    if let Some(adapter) = config {
        if let Some(dir) = adapter.get_string("data", "dir") {
            return PathBuf::from(dir);
        }
    }
    PathBuf::from("data")
}

fn refresh_ms(adapter: &dyn ConfigPort) -> u64 {
    adapter.get_int("live", "refresh_ms", 20).max(0) as u64
}

/// Replay a finished simulation through a progress observer, bar by bar.
/// The observer sees the same transitions the state machine made; entry
/// sizes are recomputed from the stored signal volatilities.
pub fn replay_simulation(
    report: &PerformanceReport,
    config: &BacktestConfig,
    progress: &dyn ProgressPort,
) {
    let total = report.signals.len();
    let mut trades = report.simulation.trades.iter().peekable();
    let mut position = 0.0_f64;

    for (index, point) in report.signals.iter().enumerate() {
        let date = report.series.dates[index];
        let equity = report.simulation.equity_curve[index];

        while let Some(mark) = trades.next_if(|m| m.index == index) {
            let size = match mark.action {
                TradeAction::Long => {
                    position = position_size(point.spread_volatility, config);
                    position
                }
                TradeAction::Short => {
                    position = -position_size(point.spread_volatility, config);
                    position.abs()
                }
                TradeAction::Exit => {
                    let closed = position.abs();
                    position = 0.0;
                    closed
                }
            };
            progress.on_trade(&TradeEvent {
                date,
                action: mark.action,
                z_score: point.z_score,
                position_size: size,
                net_pnl: mark.net_pnl,
                equity,
            });
        }

        progress.on_step(&StepUpdate {
            date,
            index,
            total,
            z_score: point.z_score,
            position,
            equity,
        });
    }
}

fn run_scan(
    config_path: &PathBuf,
    data_dir: Option<&PathBuf>,
    pairs_override: Option<&str>,
    output_path: Option<&PathBuf>,
    live: bool,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Build BacktestConfig
    let config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Resolve universe and data directory
    let universe = match resolve_universe(pairs_override, &adapter) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if universe.is_empty() {
        eprintln!("error: no pairs configured");
        return ExitCode::from(2);
    }

    let data_port = CsvAdapter::new(resolve_data_dir(data_dir, Some(&adapter)));

    eprintln!(
        "Scanning {} candidate pairs, {} to {}",
        universe.len(),
        config.start_date,
        config.end_date,
    );

    // Stage 4: Run the scan
    let outcome = match scan_universe(&data_port, &universe, &config) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 5: Print console summary to stderr
    eprintln!("\n=== Scan Results ===");
    for report in &outcome.reports {
        eprintln!(
            "  {}:  p={:.4}  hedge={:.4}  sharpe={:.3}  return={:+.2}%  trades={}",
            report.pair,
            report.p_value,
            report.hedge_ratio,
            report.metrics.sharpe,
            report.metrics.total_return * 100.0,
            report.metrics.total_trades,
        );
    }

    let best = outcome.best();
    eprintln!("\n=== Best Pair: {} ===", best.pair);
    print_metrics(best);

    finish_report(best, &config, output_path, live, refresh_ms(&adapter))
}

fn run_backtest(
    config_path: &PathBuf,
    pair_spec: &str,
    data_dir: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
    live: bool,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Build BacktestConfig
    let config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Parse the pair
    let candidate = match parse_pair(pair_spec) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = CsvAdapter::new(resolve_data_dir(data_dir, Some(&adapter)));

    eprintln!(
        "Backtesting {}, {} to {}",
        candidate, config.start_date, config.end_date,
    );

    // Stage 4: Run the pipeline; a rejection here is a hard error
    let report = match run_pair(&data_port, &candidate, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\n=== Backtest Results: {} ===", report.pair);
    print_metrics(&report);

    finish_report(&report, &config, output_path, live, refresh_ms(&adapter))
}

fn print_metrics(report: &PerformanceReport) {
    let m = &report.metrics;
    eprintln!("Observations:     {}", report.series.len());
    eprintln!("Cointegration p:  {:.4}", report.p_value);
    eprintln!("ADF statistic:    {:.3}", report.test_statistic);
    eprintln!("Hedge ratio:      {:.4}", report.hedge_ratio);
    eprintln!("Sharpe Ratio:     {:.2}", m.sharpe);
    eprintln!("Total Return:     {:.2}%", m.total_return * 100.0);
    eprintln!("Max Drawdown:     -{:.1}%", m.max_drawdown * 100.0);
    eprintln!("Win Rate:         {:.1}%", m.win_rate * 100.0);
    eprintln!("Total Trades:     {}", m.total_trades);
}

fn finish_report(
    report: &PerformanceReport,
    config: &BacktestConfig,
    output_path: Option<&PathBuf>,
    live: bool,
    refresh_ms: u64,
) -> ExitCode {
    if live {
        eprintln!("\nReplaying {} bars...", report.signals.len());
        let progress = ConsoleProgressAdapter::new(refresh_ms);
        replay_simulation(report, config, &progress);
    }

    if let Some(path) = output_path {
        let writer = HtmlReportAdapter::new();
        if let Err(e) = writer.write(report, config, &path.to_string_lossy()) {
            eprintln!("error: failed to write report: {e}");
            return (&e).into();
        }
        eprintln!("\nReport written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

pub fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let universe = match resolve_universe(None, &adapter) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let pair_list: Vec<String> = universe.iter().map(|p| p.to_string()).collect();

    eprintln!(
        "\nBacktest window:  {} to {}",
        config.start_date, config.end_date,
    );
    eprintln!("Initial capital:  {:.2}", config.initial_capital);
    eprintln!(
        "Entry/exit z:     {:.2} / {:.2}",
        config.entry_threshold, config.exit_threshold,
    );
    eprintln!("Significance:     {:.3}", config.significance);
    eprintln!("Universe:         {}", pair_list.join(", "));

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(data_dir: Option<&PathBuf>, config_path: Option<&PathBuf>) -> ExitCode {
    let adapter = match config_path {
        Some(path) => match load_config(path) {
            Ok(a) => Some(a),
            Err(code) => return code,
        },
        None => None,
    };

    let dir = resolve_data_dir(data_dir, adapter.as_ref().map(|a| a as &dyn ConfigPort));
    let data_port = CsvAdapter::new(dir.clone());

    let symbols = match data_port.list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!("No symbols found in {}", dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_info(
    symbol: Option<&str>,
    data_dir: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
) -> ExitCode {
    let adapter = match config_path {
        Some(path) => match load_config(path) {
            Ok(a) => Some(a),
            Err(code) => return code,
        },
        None => None,
    };

    let dir = resolve_data_dir(data_dir, adapter.as_ref().map(|a| a as &dyn ConfigPort));
    let data_port = CsvAdapter::new(dir.clone());

    let symbols = match symbol {
        Some(s) => vec![s.to_uppercase()],
        None => match data_port.list_symbols() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
    };

    if symbols.is_empty() {
        eprintln!("No symbols found in {}", dir.display());
        return ExitCode::SUCCESS;
    }

    for symbol in &symbols {
        match data_port.get_data_range(symbol) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} bars, {} to {}", symbol, count, min_date, max_date);
            }
            Ok(None) => {
                eprintln!("{}: no data found", symbol);
            }
            Err(e) => {
                eprintln!("error querying {}: {}", symbol, e);
            }
        }
    }
    ExitCode::SUCCESS
}
