//! Linear Regression Module
//! Ordinary least squares fit of y on x, with the slope's two-sided p-value
//! from the Student t distribution.

use statrs::distribution::{ContinuousCDF, StudentsT};
use std::fmt;

/// Significance threshold for the slope test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Result of a simple linear regression `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub p_value: f64,
    pub n: usize,
}

impl LinearFit {
    /// Fit over the pairs where both values are finite. Needs at least three
    /// points and some spread in x.
    pub fn ols(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let pairs: Vec<(f64, f64)> = xs
            .iter()
            .zip(ys)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| (x, y))
            .collect();

        let n = pairs.len();
        if n < 3 {
            return None;
        }
        let nf = n as f64;

        let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / nf;
        let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / nf;

        let (sxx, sxy, syy) = pairs.iter().fold((0.0, 0.0, 0.0), |(sxx, sxy, syy), (x, y)| {
            let dx = x - mean_x;
            let dy = y - mean_y;
            (sxx + dx * dx, sxy + dx * dy, syy + dy * dy)
        });
        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let sse: f64 = pairs
            .iter()
            .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
            .sum();

        let r_squared = 1.0 - sse / syy;
        let dof = nf - 2.0;
        let adj_r_squared = 1.0 - (1.0 - r_squared) * (nf - 1.0) / dof;

        let se_slope = (sse / dof / sxx).sqrt();
        let p_value = if se_slope == 0.0 {
            if slope == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            let t = slope / se_slope;
            match StudentsT::new(0.0, 1.0, dof) {
                Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
                Err(_) => f64::NAN,
            }
        };

        Some(Self {
            slope,
            intercept,
            r_squared,
            adj_r_squared,
            p_value,
            n,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    pub fn is_significant(&self) -> bool {
        self.p_value <= SIGNIFICANCE_THRESHOLD
    }
}

impl fmt::Display for LinearFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OLS: slope = {:.4e}, R\u{b2} = {:.3} (adj. {:.3}), p = {:.3}, n = {}",
            self.slope, self.r_squared, self.adj_r_squared, self.p_value, self.n
        )
    }
}
