use crate::error::{CoreError, Result};

/// Least squares line `y = intercept + slope * x` through paired observations,
/// typically emission amounts against a bird index of change.
///
/// Returns `(intercept, slope)`. Two points are joined directly; more points
/// use the centered sums `Sxy / Sxx` for the slope.
///
/// # Errors
/// - [`CoreError::InvalidData`] when the slices differ in length or hold a
///   NaN or infinite value.
/// - [`CoreError::InsufficientData`] for fewer than two points.
/// - [`CoreError::DegenerateFit`] when every `x` is the same.
///
/// # Example
/// ```
/// use bird_ghg::utility::linear_regression;
///
/// let co2 = [540.0, 560.0, 580.0];
/// let change = [-10.0, -12.0, -14.0];
/// let (intercept, slope) = linear_regression(&co2, &change).unwrap();
/// assert!((slope + 0.1).abs() < 1e-10);
/// assert!((intercept - 44.0).abs() < 1e-8);
/// ```
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<(f64, f64)> {
    if x.len() != y.len() {
        return Err(CoreError::InvalidData(format!(
            "x has {} values but y has {}",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(CoreError::InsufficientData {
            required: 2,
            actual: n,
        });
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(CoreError::InvalidData(
            "regression inputs must be finite".to_string(),
        ));
    }

    if n == 2 {
        if x[1] == x[0] {
            return Err(CoreError::DegenerateFit(
                "All x values are identical; cannot fit line".to_string(),
            ));
        }
        let slope = (y[1] - y[0]) / (x[1] - x[0]);
        let intercept = y[0] - slope * x[0];
        return Ok((intercept, slope));
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut num = 0.0;
    let mut den = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        num += dx * (yi - mean_y);
        den += dx * dx;
    }

    if den == 0.0 {
        return Err(CoreError::DegenerateFit(
            "All x values are identical; cannot fit line".to_string(),
        ));
    }

    let slope = num / den;
    let intercept = mean_y - slope * mean_x;

    Ok((intercept, slope))
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Coefficient of determination of `fitted` against `observed`.
///
/// A constant response reproduced exactly scores 1. The result is clamped to
/// `[0, 1]` so round-off on a least-squares fit never leaves that interval.
///
/// Spread below a few ulps of the largest `|y|` is rounding noise from the
/// mean, so a response that small counts as constant. The tolerance depends
/// only on the precision of the values, never on their offset.
pub fn r_squared(observed: &[f64], fitted: &[f64]) -> f64 {
    let mean_y = mean(observed);
    let ss_tot: f64 = observed.iter().map(|y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = observed
        .iter()
        .zip(fitted)
        .map(|(y, f)| (y - f).powi(2))
        .sum();

    let max_abs = observed.iter().fold(0.0f64, |acc, y| acc.max(y.abs()));
    let tolerance = observed.len() as f64 * (4.0 * f64::EPSILON * max_abs).powi(2);
    if ss_tot <= tolerance {
        return if ss_res <= tolerance { 1.0 } else { 0.0 };
    }
    (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
}

/// Rounds to a fixed number of decimal digits, e.g. 2 for display.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_year_regression() {
        // Two years of total emissions against a falling waterfowl index.
        let total = [700.0, 720.0];
        let change = [12.0, 8.0];
        let (intercept, slope) = linear_regression(&total, &change).unwrap();
        assert!((slope + 0.2).abs() < 1e-10);
        assert!((intercept - 152.0).abs() < 1e-8);
    }

    #[test]
    fn test_least_squares_regression() {
        let ch4 = [90.0, 95.0, 100.0, 105.0];
        let change = [-3.0, -4.5, -5.0, -7.5];
        let (intercept, slope) = linear_regression(&ch4, &change).unwrap();
        // Sxy = -35, Sxx = 125
        assert!((slope + 0.28).abs() < 1e-10);
        assert!((intercept - 22.3).abs() < 1e-8);
    }

    #[test]
    fn test_non_finite_inputs_rejected() {
        assert!(matches!(
            linear_regression(&[1.0, 2.0, 3.0], &[0.5, f64::NAN, 1.5]),
            Err(CoreError::InvalidData(_))
        ));
        assert!(matches!(
            linear_regression(&[1.0, f64::INFINITY], &[0.5, 1.5]),
            Err(CoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_invalid_regression() {
        let x = vec![1.0];
        let y = vec![2.0];
        assert!(matches!(
            linear_regression(&x, &y),
            Err(CoreError::InsufficientData { required: 2, actual: 1 })
        ));
        assert!(matches!(
            linear_regression(&[1.0, 2.0], &[1.0]),
            Err(CoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_identical_x_is_degenerate() {
        assert!(matches!(
            linear_regression(&[3.0, 3.0], &[1.0, 2.0]),
            Err(CoreError::DegenerateFit(_))
        ));
        assert!(matches!(
            linear_regression(&[3.0, 3.0, 3.0], &[1.0, 2.0, 5.0]),
            Err(CoreError::DegenerateFit(_))
        ));
    }

    #[test]
    fn test_r_squared_bounds() {
        let observed = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(r_squared(&observed, &observed), 1.0);
        let flat = [2.5; 4];
        assert_eq!(r_squared(&observed, &flat), 0.0);
        assert_eq!(r_squared(&[5.0, 5.0], &[5.0, 5.0]), 1.0);
    }

    #[test]
    fn test_r_squared_ignores_offset() {
        let observed = [0.0, 0.3, 0.1, 0.2];
        let fitted = [0.09, 0.13, 0.17, 0.21];
        let centered = r_squared(&observed, &fitted);
        assert!((centered - 0.16).abs() < 1e-12);

        for offset in [1e3, 1e6, -1e6] {
            let shifted: Vec<f64> = observed.iter().map(|y| y + offset).collect();
            let shifted_fit: Vec<f64> = fitted.iter().map(|f| f + offset).collect();
            let r2 = r_squared(&shifted, &shifted_fit);
            assert!((r2 - centered).abs() < 1e-6, "offset {offset}: {r2}");
        }

        // Constant at a large level is still a constant response.
        let level = [1e6 + 0.1; 4];
        assert_eq!(r_squared(&level, &level), 1.0);
        assert_eq!(r_squared(&level, &[1e6; 4]), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(0.1234567, 6), 0.123457);
        assert_eq!(round_to(-2.005, 0), -2.0);
    }
}
