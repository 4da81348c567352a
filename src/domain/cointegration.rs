//! Engle-Granger cointegration qualifier.
//!
//! Two-step procedure: OLS of A on B with intercept, then an augmented
//! Dickey-Fuller regression on the residuals. The p-value is an
//! approximation interpolated across the two-variable Engle-Granger
//! critical values, monotone in the statistic.

use crate::domain::config::BacktestConfig;
use crate::domain::error::PairtraderError;
use crate::domain::series::PairSeries;
use crate::domain::stats::ols_fit;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CointegrationResult {
    pub test_statistic: f64,
    pub p_value: f64,
    pub is_cointegrated: bool,
}

/// Qualify a pair. Fails with `InsufficientData` below
/// `config.min_observations`; otherwise always returns a result, and the
/// caller decides whether a high p-value rejects the pair.
pub fn test_pair(
    series: &PairSeries,
    config: &BacktestConfig,
) -> Result<CointegrationResult, PairtraderError> {
    if series.len() < config.min_observations {
        return Err(PairtraderError::InsufficientData {
            pair: format!("{}/{}", series.symbol_a, series.symbol_b),
            observations: series.len(),
            minimum: config.min_observations,
        });
    }

    let fit = ols_fit(&series.closes_a, &series.closes_b);
    let residuals: Vec<f64> = series
        .closes_a
        .iter()
        .zip(series.closes_b.iter())
        .map(|(a, b)| a - (fit.intercept + fit.slope * b))
        .collect();

    // Degenerate regressions read as firmly non-stationary.
    let Some(test_statistic) = adf_statistic(&residuals) else {
        return Ok(CointegrationResult {
            test_statistic: 0.0,
            p_value: 1.0,
            is_cointegrated: false,
        });
    };

    let p_value = engle_granger_p_value(test_statistic, series.len());
    Ok(CointegrationResult {
        test_statistic,
        p_value,
        is_cointegrated: p_value <= config.significance,
    })
}

/// t-statistic of the lagged level in the ADF regression
/// Δe[t] = α + γ·e[t-1] + Σ φ_i·Δe[t-i] + ε, with the lag order from the
/// cube-root rule capped at n/4. `None` when the series is too short or
/// the regression is singular.
fn adf_statistic(series: &[f64]) -> Option<f64> {
    let n = series.len();
    if n < 3 {
        return None;
    }

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();
    let lag = (((n as f64).powf(1.0 / 3.0) * 2.0) as usize)
        .min(n / 4)
        .max(1);
    if diff.len() <= lag {
        return None;
    }

    // Regressors per row: [1, e[t-1], Δe[t-1], .., Δe[t-lag]].
    let regressors = 2 + lag;
    let rows = diff.len() - lag;
    if rows <= regressors {
        return None;
    }

    let mut xtx = vec![vec![0.0; regressors]; regressors];
    let mut xty = vec![0.0; regressors];
    let mut row = vec![0.0; regressors];
    for t in lag..diff.len() {
        fill_row(&mut row, series, &diff, t, lag);
        for a in 0..regressors {
            xty[a] += row[a] * diff[t];
            for b in 0..regressors {
                xtx[a][b] += row[a] * row[b];
            }
        }
    }

    let beta = solve_linear(xtx.clone(), xty)?;

    let mut sse = 0.0;
    for t in lag..diff.len() {
        fill_row(&mut row, series, &diff, t, lag);
        let predicted: f64 = row.iter().zip(beta.iter()).map(|(x, b)| x * b).sum();
        let residual = diff[t] - predicted;
        sse += residual * residual;
    }

    let dof = rows - regressors;
    let mse = sse / dof as f64;

    // Var(γ) = mse · [(X'X)^-1]_{11}, obtained by solving X'X·z = e_1.
    let mut unit = vec![0.0; regressors];
    unit[1] = 1.0;
    let inverse_col = solve_linear(xtx, unit)?;
    let variance = mse * inverse_col[1];
    if !(variance > 0.0) || !variance.is_finite() {
        return None;
    }

    Some(beta[1] / variance.sqrt())
}

fn fill_row(row: &mut [f64], series: &[f64], diff: &[f64], t: usize, lag: usize) {
    row[0] = 1.0;
    row[1] = series[t];
    for i in 1..=lag {
        row[1 + i] = diff[t - i];
    }
}

/// Gaussian elimination with partial pivoting; `None` for singular systems.
fn solve_linear(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Option<Vec<f64>> {
    let n = rhs.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            matrix[i][col]
                .abs()
                .partial_cmp(&matrix[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if matrix[pivot][col].abs() < f64::EPSILON {
            return None;
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for r in col + 1..n {
            let factor = matrix[r][col] / matrix[col][col];
            for c in col..n {
                matrix[r][c] -= factor * matrix[col][c];
            }
            rhs[r] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0; n];
    for r in (0..n).rev() {
        let mut sum = rhs[r];
        for c in r + 1..n {
            sum -= matrix[r][c] * solution[c];
        }
        solution[r] = sum / matrix[r][r];
    }
    Some(solution)
}

/// Approximate p-value for the Engle-Granger statistic: piecewise-linear
/// between the two-variable critical values (1%/5%/10%, with a small-sample
/// adjustment), exponential tails beyond the table.
fn engle_granger_p_value(t_stat: f64, observations: usize) -> f64 {
    let n = observations as f64;
    let cv_1 = -3.90 - 10.53 / n;
    let cv_5 = -3.34 - 5.97 / n;
    let cv_10 = -3.05 - 4.07 / n;

    if t_stat < cv_1 {
        0.01 * (cv_1 - t_stat).exp().recip()
    } else if t_stat < cv_5 {
        0.01 + (0.05 - 0.01) * (t_stat - cv_1) / (cv_5 - cv_1)
    } else if t_stat < cv_10 {
        0.05 + (0.10 - 0.05) * (t_stat - cv_5) / (cv_10 - cv_5)
    } else {
        0.10 + 0.90 * (1.0 - (-0.5 * (t_stat - cv_10)).exp())
    }
}
