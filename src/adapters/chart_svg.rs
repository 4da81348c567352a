//! SVG panel rendering for the HTML report.
//!
//! Each panel is a self-contained `<svg>` fragment: price overlay, spread
//! with trade markers, z-score with threshold guides, and equity versus
//! buy-and-hold. Empty input renders as an empty string.

use crate::domain::series::PairSeries;
use crate::domain::signal::SignalPoint;
use crate::domain::simulation::{TradeAction, TradeMark};
use crate::domain::stats::sample_std;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 220.0;
const PADDING: f64 = 40.0;

fn bounds(series: &[&[f64]]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for values in series {
        for &v in *values {
            min = min.min(v);
            max = max.max(v);
        }
    }
    (min, max)
}

fn x_at(index: usize, len: usize) -> f64 {
    let plot_width = WIDTH - 2.0 * PADDING;
    let scale_x = if len > 1 {
        plot_width / (len - 1) as f64
    } else {
        0.0
    };
    PADDING + index as f64 * scale_x
}

fn y_at(value: f64, min: f64, max: f64) -> f64 {
    let plot_height = HEIGHT - 2.0 * PADDING;
    let range = max - min;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    HEIGHT - PADDING - (value - min) * scale_y
}

fn polyline(values: &[f64], min: f64, max: f64, color: &str) -> String {
    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| format!("{:.1},{:.1}", x_at(i, values.len()), y_at(v, min, max)))
        .collect();
    format!(
        r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
        color,
        points.join(" ")
    )
}

fn dashed_polyline(values: &[f64], min: f64, max: f64, color: &str) -> String {
    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| format!("{:.1},{:.1}", x_at(i, values.len()), y_at(v, min, max)))
        .collect();
    format!(
        r#"<polyline fill="none" stroke="{}" stroke-width="1" stroke-dasharray="5 4" points="{}"/>"#,
        color,
        points.join(" ")
    )
}

/// Dashed horizontal guide at `level`, omitted when outside the plot range.
fn guide_line(level: f64, min: f64, max: f64, color: &str) -> Option<String> {
    if level < min || level > max {
        return None;
    }
    let y = y_at(level, min, max);
    Some(format!(
        r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1" stroke-dasharray="4 3"/>"#,
        PADDING,
        y,
        WIDTH - PADDING,
        y,
        color
    ))
}

fn frame(title: &str, body: &str) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
            "\n",
            r#"<rect width="{w:.0}" height="{h:.0}" fill="white"/>"#,
            "\n",
            r#"<text x="{p:.0}" y="20" font-family="sans-serif" font-size="13">{title}</text>"#,
            "\n",
            r#"<line x1="{p:.1}" y1="{p:.1}" x2="{p:.1}" y2="{b:.1}" stroke="black" stroke-width="1"/>"#,
            "\n",
            r#"<line x1="{p:.1}" y1="{b:.1}" x2="{r:.1}" y2="{b:.1}" stroke="black" stroke-width="1"/>"#,
            "\n{body}\n</svg>"
        ),
        w = WIDTH,
        h = HEIGHT,
        p = PADDING,
        b = HEIGHT - PADDING,
        r = WIDTH - PADDING,
        title = title,
        body = body
    )
}

pub fn price_panel(series: &PairSeries) -> String {
    if series.is_empty() {
        return String::new();
    }

    let (min, max) = bounds(&[&series.closes_a, &series.closes_b]);
    let body = format!(
        "{}\n{}",
        polyline(&series.closes_a, min, max, "steelblue"),
        polyline(&series.closes_b, min, max, "darkorange")
    );
    frame(
        &format!("Close prices: {} / {}", series.symbol_a, series.symbol_b),
        &body,
    )
}

/// Spread line with entry/exit bands at `threshold * std(spread)` around
/// zero and one marker per trade. Bands outside the data range are simply
/// not drawn, like an off-scale axis guide.
pub fn spread_panel(
    signals: &[SignalPoint],
    trades: &[TradeMark],
    entry_threshold: f64,
    exit_threshold: f64,
) -> String {
    if signals.is_empty() {
        return String::new();
    }

    let spread: Vec<f64> = signals.iter().map(|s| s.spread).collect();
    let (min, max) = bounds(&[&spread]);
    let spread_std = sample_std(&spread);

    let mut body = vec![polyline(&spread, min, max, "steelblue")];
    for (level, color) in [
        (entry_threshold * spread_std, "crimson"),
        (-entry_threshold * spread_std, "crimson"),
        (exit_threshold * spread_std, "seagreen"),
        (-exit_threshold * spread_std, "seagreen"),
    ] {
        if let Some(guide) = guide_line(level, min, max, color) {
            body.push(guide);
        }
    }

    for trade in trades {
        if trade.index >= signals.len() {
            continue;
        }
        let color = match trade.action {
            TradeAction::Long => "seagreen",
            TradeAction::Short => "crimson",
            TradeAction::Exit => "black",
        };
        body.push(format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="3.5" fill="{}"/>"#,
            x_at(trade.index, signals.len()),
            y_at(trade.spread, min, max),
            color
        ));
    }

    frame("Spread with entry bands and trades", &body.join("\n"))
}

pub fn z_panel(signals: &[SignalPoint], entry_threshold: f64, exit_threshold: f64) -> String {
    if signals.is_empty() {
        return String::new();
    }

    let z: Vec<f64> = signals.iter().map(|s| s.z_score).collect();
    let guides = [
        -entry_threshold,
        -exit_threshold,
        0.0,
        exit_threshold,
        entry_threshold,
    ];
    // Keep the thresholds visible even when z never reaches them.
    let (z_min, z_max) = bounds(&[&z, &guides]);

    let mut body = vec![polyline(&z, z_min, z_max, "steelblue")];
    for (level, color) in [
        (0.0, "gray"),
        (entry_threshold, "crimson"),
        (-entry_threshold, "crimson"),
        (exit_threshold, "seagreen"),
        (-exit_threshold, "seagreen"),
    ] {
        if let Some(guide) = guide_line(level, z_min, z_max, color) {
            body.push(guide);
        }
    }

    frame("Z-score with entry/exit thresholds", &body.join("\n"))
}

/// Strategy equity with a dashed buy-and-hold overlay per leg.
pub fn equity_panel(equity_curve: &[f64], buy_hold_a: &[f64], buy_hold_b: &[f64]) -> String {
    if equity_curve.is_empty() {
        return String::new();
    }

    let (min, max) = bounds(&[equity_curve, buy_hold_a, buy_hold_b]);
    let mut body = vec![polyline(equity_curve, min, max, "steelblue")];
    if !buy_hold_a.is_empty() {
        body.push(dashed_polyline(buy_hold_a, min, max, "darkorange"));
    }
    if !buy_hold_b.is_empty() {
        body.push(dashed_polyline(buy_hold_b, min, max, "seagreen"));
    }

    frame("Equity vs buy-and-hold", &body.join("\n"))
}
