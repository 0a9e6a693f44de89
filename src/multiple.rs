//! Multiple regression of bird population change on several gases at once.

use std::collections::{BTreeMap, HashMap};

use linregress::{FormulaRegressionBuilder, RegressionDataBuilder};
use ndarray::{Array1, Array2};
use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::records::Gas;
use crate::simple::R_SQUARED_DIGITS;
use crate::utility::{r_squared, round_to};

/// Residual norm below which a unit-length predictor counts as collinear.
const COLLINEARITY_TOLERANCE: f64 = 1e-9;

const RESPONSE_COLUMN: &str = "bird";

/// Ordinary least squares with intercept over a set of gas predictors.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipleRegressionModel {
    intercept: f64,
    coefficients: BTreeMap<Gas, f64>,
    r_squared: f64,
}

impl MultipleRegressionModel {
    /// Fits `responses` against every gas in `predictors`.
    ///
    /// All sequences must share one length of at least one more than the
    /// number of predictors. Collinear predictors, including a constant
    /// column, fail with [`CoreError::DegenerateFit`].
    pub fn fit(predictors: &HashMap<Gas, Vec<f64>>, responses: &[f64]) -> Result<Self> {
        if predictors.is_empty() {
            return Err(CoreError::InvalidData(
                "multiple regression needs at least one predictor".to_string(),
            ));
        }

        // Fixed gas order, whatever order the map iterates in.
        let gases: Vec<Gas> = Gas::ALL
            .iter()
            .copied()
            .filter(|gas| predictors.contains_key(gas))
            .collect();
        let columns: Vec<&[f64]> = gases
            .iter()
            .map(|gas| predictors[gas].as_slice())
            .collect();

        let n = responses.len();
        for (gas, column) in gases.iter().zip(&columns) {
            if column.len() != n {
                return Err(CoreError::InvalidData(format!(
                    "{gas} has {} values but there are {n} responses",
                    column.len()
                )));
            }
        }
        let required = gases.len() + 1;
        if n < required {
            return Err(CoreError::InsufficientData {
                required,
                actual: n,
            });
        }
        if responses
            .iter()
            .chain(columns.iter().flat_map(|c| c.iter()))
            .any(|v| !v.is_finite())
        {
            return Err(CoreError::InvalidData(
                "regression inputs must be finite".to_string(),
            ));
        }

        check_full_rank(&gases, &columns)?;

        let mut data = vec![(RESPONSE_COLUMN.to_string(), responses.to_vec())];
        data.extend(
            gases
                .iter()
                .zip(&columns)
                .map(|(gas, column)| (gas.key().to_string(), column.to_vec())),
        );
        let data = RegressionDataBuilder::new()
            .build_from(data)
            .map_err(|e| CoreError::DegenerateFit(e.to_string()))?;

        let regressors: Vec<&str> = gases.iter().map(|gas| gas.key()).collect();
        let formula = format!("{RESPONSE_COLUMN} ~ {}", regressors.join(" + "));
        let parameters = FormulaRegressionBuilder::new()
            .data(&data)
            .formula(formula)
            .fit_without_statistics()
            .map_err(|e| CoreError::DegenerateFit(e.to_string()))?;

        if parameters.len() != gases.len() + 1 || parameters.iter().any(|p| !p.is_finite()) {
            warn!(?parameters, "solver returned unusable parameters");
            return Err(CoreError::DegenerateFit(
                "solver returned non-finite coefficients".to_string(),
            ));
        }

        let intercept = parameters[0];
        let coefficients: BTreeMap<Gas, f64> =
            gases.iter().copied().zip(parameters[1..].iter().copied()).collect();

        let design = Array2::from_shape_fn((n, gases.len()), |(i, j)| columns[j][i]);
        let weights: Array1<f64> = gases.iter().map(|gas| coefficients[gas]).collect();
        let fitted = (design.dot(&weights) + intercept).to_vec();
        let r_squared = round_to(r_squared(responses, &fitted), R_SQUARED_DIGITS);

        debug!(
            points = n,
            predictors = gases.len(),
            intercept,
            r_squared,
            "fitted multiple regression"
        );
        Ok(Self {
            intercept,
            coefficients,
            r_squared,
        })
    }

    /// Evaluates the fitted function at `[co2, ch4, n2o, hfc, pfc, sf6, nf3]`.
    ///
    /// Amounts for gases that were not predictors are ignored. No bounds are
    /// enforced; extrapolating is up to the caller.
    pub fn predict_value(&self, amounts: [f64; 7]) -> f64 {
        self.coefficients
            .iter()
            .fold(self.intercept, |acc, (gas, coef)| acc + coef * amounts[gas.index()])
    }

    /// One coefficient per predictor, in `Gas::ALL` order.
    pub fn coefficients(&self) -> BTreeMap<Gas, f64> {
        self.coefficients.clone()
    }

    pub fn coefficient(&self, gas: Gas) -> Option<f64> {
        self.coefficients.get(&gas).copied()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn predictors(&self) -> Vec<Gas> {
        self.coefficients.keys().copied().collect()
    }

    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }
}

/// Gram-Schmidt over the intercept column and each predictor in turn.
fn check_full_rank(gases: &[Gas], columns: &[&[f64]]) -> Result<()> {
    let n = columns.first().map_or(0, |c| c.len());
    let mut basis: Vec<Array1<f64>> = vec![Array1::from_elem(n, 1.0 / (n as f64).sqrt())];

    for (gas, column) in gases.iter().zip(columns) {
        let mut v = Array1::from(column.to_vec());
        let norm = v.dot(&v).sqrt();
        if norm == 0.0 {
            warn!(%gas, "predictor is identically zero");
            return Err(CoreError::DegenerateFit(format!("{gas} is zero in every year")));
        }
        v /= norm;

        // Two passes keep the projection numerically orthogonal.
        for _ in 0..2 {
            for q in &basis {
                let projection = q.dot(&v);
                v.scaled_add(-projection, q);
            }
        }

        let residual = v.dot(&v).sqrt();
        if residual < COLLINEARITY_TOLERANCE {
            warn!(%gas, residual, "collinear predictor");
            return Err(CoreError::DegenerateFit(format!(
                "{gas} is a linear combination of the intercept and other predictors"
            )));
        }
        basis.push(v / residual);
    }
    Ok(())
}
