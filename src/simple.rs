//! Single-predictor regression of bird population change on one emission column.

use tracing::debug;

use crate::error::{CoreError, Result};
use crate::utility::{linear_regression, r_squared, round_to};

/// Digits kept when reporting R².
pub const R_SQUARED_DIGITS: i32 = 6;

/// Endpoints of the fitted line across the observed predictor range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineOfBestFit {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

/// Ordinary least squares fit `y = slope * x + intercept`.
///
/// Immutable once fitted; a different predictor needs a new model.
///
/// # Example
/// ```
/// use bird_ghg::simple::SimpleRegressionModel;
///
/// let model = SimpleRegressionModel::fit(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).unwrap();
/// assert_eq!(model.predict_y(5.0), 10.0);
/// assert_eq!(model.r_squared(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleRegressionModel {
    slope: f64,
    intercept: f64,
    r_squared: f64,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl SimpleRegressionModel {
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self> {
        let (intercept, slope) = linear_regression(xs, ys)?;
        let fitted: Vec<f64> = xs.iter().map(|x| slope * x + intercept).collect();
        let r_squared = round_to(r_squared(ys, &fitted), R_SQUARED_DIGITS);
        debug!(points = xs.len(), slope, intercept, r_squared, "fitted simple regression");

        Ok(Self {
            slope,
            intercept,
            r_squared,
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Expected index of change for an emission amount `x`.
    pub fn predict_y(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Emission amount expected to produce an index of change `y`.
    pub fn predict_x(&self, y: f64) -> Result<f64> {
        if self.slope == 0.0 {
            return Err(CoreError::Division);
        }
        Ok((y - self.intercept) / self.slope)
    }

    /// R² on the training data, rounded to six decimals.
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn residuals(&self) -> Vec<f64> {
        self.xs
            .iter()
            .zip(&self.ys)
            .map(|(&x, &y)| y - self.predict_y(x))
            .collect()
    }

    pub fn line_of_best_fit(&self) -> LineOfBestFit {
        let min = self.xs.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        LineOfBestFit {
            x: [min, max],
            y: [self.predict_y(min), self.predict_y(max)],
        }
    }
}
