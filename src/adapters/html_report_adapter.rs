//! HTML report adapter implementing ReportPort.
//!
//! Generates a single self-contained page: summary tables, four inline SVG
//! panels, and the trade log.

use std::fs;
use std::path::Path;

use crate::adapters::chart_svg;
use crate::domain::config::BacktestConfig;
use crate::domain::error::PairtraderError;
use crate::domain::report::PerformanceReport;
use crate::ports::report_port::ReportPort;

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2em; color: #222; }
h1 { font-size: 1.4em; }
h2 { font-size: 1.1em; margin-top: 1.6em; }
table { border-collapse: collapse; margin: 0.6em 0; }
th, td { border: 1px solid #bbb; padding: 0.3em 0.8em; text-align: right; }
th { background: #f0f0f0; }
td.label, th.label { text-align: left; }
svg { display: block; margin: 0.8em 0; border: 1px solid #ddd; }";

pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(
        &self,
        report: &PerformanceReport,
        config: &BacktestConfig,
        output_path: &str,
    ) -> Result<(), PairtraderError> {
        let html = render(report, config);
        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, html)?;
        Ok(())
    }
}

fn render(report: &PerformanceReport, config: &BacktestConfig) -> String {
    let metrics = &report.metrics;

    let summary_rows = format!(
        concat!(
            "<tr><td class=\"label\">Cointegration p-value</td><td>{:.4}</td></tr>\n",
            "<tr><td class=\"label\">Test statistic</td><td>{:.3}</td></tr>\n",
            "<tr><td class=\"label\">Hedge ratio</td><td>{:.4}</td></tr>\n",
            "<tr><td class=\"label\">Sharpe ratio</td><td>{:.3}</td></tr>\n",
            "<tr><td class=\"label\">Total return</td><td>{:.2}%</td></tr>\n",
            "<tr><td class=\"label\">Max drawdown</td><td>{:.2}%</td></tr>\n",
            "<tr><td class=\"label\">Win rate</td><td>{:.1}%</td></tr>\n",
            "<tr><td class=\"label\">Round-trip trades</td><td>{}</td></tr>\n",
            "<tr><td class=\"label\">Observations</td><td>{}</td></tr>\n",
        ),
        report.p_value,
        report.test_statistic,
        report.hedge_ratio,
        metrics.sharpe,
        metrics.total_return * 100.0,
        metrics.max_drawdown * 100.0,
        metrics.win_rate * 100.0,
        metrics.total_trades,
        report.series.len(),
    );

    let config_rows = format!(
        concat!(
            "<tr><td class=\"label\">Window</td><td>{} to {}</td></tr>\n",
            "<tr><td class=\"label\">Initial capital</td><td>{:.2}</td></tr>\n",
            "<tr><td class=\"label\">Entry / exit threshold</td><td>{:.2} / {:.2}</td></tr>\n",
            "<tr><td class=\"label\">Transaction cost</td><td>{:.4}</td></tr>\n",
            "<tr><td class=\"label\">Risk multiplier</td><td>{:.2}</td></tr>\n",
            "<tr><td class=\"label\">Target risk unit</td><td>{:.2}</td></tr>\n",
            "<tr><td class=\"label\">Volatility window</td><td>{}</td></tr>\n",
            "<tr><td class=\"label\">Significance</td><td>{:.3}</td></tr>\n",
        ),
        config.start_date,
        config.end_date,
        config.initial_capital,
        config.entry_threshold,
        config.exit_threshold,
        config.transaction_cost,
        config.risk_multiplier,
        config.target_risk_unit,
        config.volatility_window,
        config.significance,
    );

    let mut trade_rows = String::new();
    for trade in &report.simulation.trades {
        let date = report
            .series
            .dates
            .get(trade.index)
            .map(|d| d.to_string())
            .unwrap_or_default();
        let pnl = trade
            .net_pnl
            .map(|p| format!("{:+.2}", p))
            .unwrap_or_default();
        trade_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td class=\"label\">{}</td><td>{:.4}</td><td>{}</td></tr>\n",
            trade.index, date, trade.action, trade.spread, pnl
        ));
    }
    if trade_rows.is_empty() {
        trade_rows.push_str("<tr><td colspan=\"5\" class=\"label\">No trades</td></tr>\n");
    }

    let buy_hold_a = buy_hold_curve(&report.series.closes_a, config.initial_capital);
    let buy_hold_b = buy_hold_curve(&report.series.closes_b, config.initial_capital);

    format!(
        concat!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<title>{pair} pair report</title>\n",
            "<style>{style}</style>\n",
            "</head>\n<body>\n",
            "<h1>Pair trading report: {pair}</h1>\n",
            "<h2>Performance</h2>\n<table>\n{summary}</table>\n",
            "<h2>Configuration</h2>\n<table>\n{config}</table>\n",
            "<h2>Charts</h2>\n{prices}\n{spread}\n{z}\n{equity}\n",
            "<h2>Trades</h2>\n<table>\n",
            "<tr><th>#</th><th>Date</th><th class=\"label\">Action</th>",
            "<th>Spread</th><th>Net P&amp;L</th></tr>\n",
            "{trades}</table>\n",
            "</body>\n</html>\n"
        ),
        pair = report.pair,
        style = STYLE,
        summary = summary_rows,
        config = config_rows,
        prices = chart_svg::price_panel(&report.series),
        spread = chart_svg::spread_panel(
            &report.signals,
            &report.simulation.trades,
            config.entry_threshold,
            config.exit_threshold
        ),
        z = chart_svg::z_panel(
            &report.signals,
            config.entry_threshold,
            config.exit_threshold
        ),
        equity = chart_svg::equity_panel(
            &report.simulation.equity_curve,
            &buy_hold_a,
            &buy_hold_b
        ),
        trades = trade_rows,
    )
}

/// Holding the leg from the first bar, scaled to the starting capital.
/// Empty when the series is empty or starts non-positive.
fn buy_hold_curve(closes: &[f64], initial_capital: f64) -> Vec<f64> {
    match closes.first() {
        Some(&first) if first > 0.0 => {
            closes.iter().map(|&c| initial_capital * c / first).collect()
        }
        _ => Vec::new(),
    }
}
