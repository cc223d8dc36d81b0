use serde::Serialize;
use verity_core::{ErrorInfo, VerityError};

fn fit_error(message: impl Into<String>) -> VerityError {
    VerityError::Fit(ErrorInfo::new("degenerate-fit", message.into()))
}

/// Ordinary least-squares line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineFit {
    /// Fitted slope.
    pub slope: f64,
    /// Fitted intercept.
    pub intercept: f64,
    /// Coefficient of determination; zero when `y` has no variance.
    pub r_squared: f64,
    /// Standard error of the slope estimate.
    pub slope_std_error: f64,
    /// Number of samples used.
    pub samples: usize,
}

/// Fits a straight line through paired samples.
///
/// Requires at least three points and a non-degenerate `x` spread.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<LineFit, VerityError> {
    if xs.len() != ys.len() {
        return Err(fit_error(format!(
            "x/y length mismatch: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    let n = xs.len();
    if n < 3 {
        return Err(fit_error(format!("need at least 3 samples, got {n}")));
    }
    let count = n as f64;
    let mean_x = xs.iter().sum::<f64>() / count;
    let mean_y = ys.iter().sum::<f64>() / count;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx <= 0.0 {
        return Err(fit_error("x samples have zero spread"));
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let ss_res: f64 = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| {
            let residual = y - (intercept + slope * x);
            residual * residual
        })
        .sum();
    let r_squared = if syy > 0.0 { 1.0 - ss_res / syy } else { 0.0 };
    let slope_std_error = (ss_res / (count - 2.0) / sxx).sqrt();
    Ok(LineFit {
        slope,
        intercept,
        r_squared,
        slope_std_error,
        samples: n,
    })
}
