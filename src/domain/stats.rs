//! Shared numeric kernels.
//!
//! Every standard deviation in the pipeline is the sample (n-1) estimator.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; 0.0 below two observations.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Trailing sample std over `window` observations ending at each index,
/// inclusive. `None` until the window fills.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let warmup = window.saturating_sub(1);
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if window < 2 || i < warmup {
                None
            } else {
                Some(sample_std(&values[i + 1 - window..=i]))
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OlsFit {
    pub slope: f64,
    pub intercept: f64,
}

/// Ordinary least squares of y on x with intercept:
/// slope = cov(x, y) / var(x), intercept = mean(y) - slope * mean(x).
/// A zero-variance x degenerates to { slope: 0, intercept: mean(y) }.
pub fn ols_fit(y: &[f64], x: &[f64]) -> OlsFit {
    debug_assert_eq!(y.len(), x.len());
    if y.is_empty() {
        return OlsFit {
            slope: 0.0,
            intercept: 0.0,
        };
    }

    let mean_x = mean(x);
    let mean_y = mean(y);
    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        covariance += dx * (yi - mean_y);
        variance += dx * dx;
    }

    if variance == 0.0 {
        return OlsFit {
            slope: 0.0,
            intercept: mean_y,
        };
    }

    let slope = covariance / variance;
    OlsFit {
        slope,
        intercept: mean_y - slope * mean_x,
    }
}
