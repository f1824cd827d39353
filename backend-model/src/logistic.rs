use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;

const ARMIJO_SIGMA: f64 = 0.01;
const BACKTRACK_FACTOR: f64 = 0.5;
const MAX_BACKTRACKS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticOptions {
    /// Inverse regularization strength.
    pub c: f64,
    pub tol: f64,
    pub max_iter: usize,
}

impl Default for LogisticOptions {
    fn default() -> Self {
        Self {
            c: 1e5,
            tol: 1e-4,
            max_iter: 100,
        }
    }
}

/// L2 regularized binary logistic regression.
///
/// The intercept is an extra unit feature and is regularized like the other
/// weights. Minimizes `0.5 * |w|^2 + C * sum(log(1 + exp(-y_i * w.x_i)))`
/// with `y_i` in {-1, +1} by cyclic coordinate descent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl LogisticRegression {
    pub fn fit(rows: &[Vec<f64>], labels: &[u8], options: LogisticOptions) -> Result<Self, ModelError> {
        if rows.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if rows.len() != labels.len() {
            return Err(ModelError::DimensionMismatch {
                expected: rows.len(),
                found: labels.len(),
            });
        }
        let width = rows[0].len();
        if let Some(bad) = rows.iter().find(|row| row.len() != width) {
            return Err(ModelError::DimensionMismatch {
                expected: width,
                found: bad.len(),
            });
        }

        // column-major copy with the bias column appended
        let n = rows.len();
        let mut columns: Vec<Vec<f64>> = (0..width)
            .map(|j| rows.iter().map(|row| row[j]).collect())
            .collect();
        columns.push(vec![1.0; n]);
        let y: Vec<f64> = labels
            .iter()
            .map(|label| if *label == 1 { 1.0 } else { -1.0 })
            .collect();

        let mut weights = vec![0.0; width + 1];
        let mut margins = vec![0.0; n];
        let mut iterations = 0;
        let mut converged = false;

        for _ in 0..options.max_iter {
            iterations += 1;
            let mut max_step = 0.0f64;
            for (j, column) in columns.iter().enumerate() {
                let step = coordinate_step(column, &y, &mut margins, &mut weights[j], options.c);
                max_step = max_step.max(step.abs());
            }
            if max_step < options.tol {
                converged = true;
                break;
            }
        }
        debug!(iterations, converged, "logistic regression fit finished");

        let intercept = weights.pop().unwrap_or_default();
        Ok(Self {
            coefficients: weights,
            intercept,
            iterations,
            converged,
        })
    }

    pub fn decision(&self, row: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(row.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }

    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        sigmoid(self.decision(row))
    }
}

/// One Newton step on a single weight with Armijo backtracking. Updates the
/// cached margins in place and returns the applied step.
fn coordinate_step(column: &[f64], y: &[f64], margins: &mut [f64], weight: &mut f64, c: f64) -> f64 {
    let mut gradient_loss = 0.0;
    let mut hessian_loss = 0.0;
    for ((x, label), margin) in column.iter().zip(y.iter()).zip(margins.iter()) {
        if *x == 0.0 {
            continue;
        }
        let p = sigmoid(label * margin);
        gradient_loss += (p - 1.0) * label * x;
        hessian_loss += p * (1.0 - p) * x * x;
    }
    let gradient = *weight + c * gradient_loss;
    let hessian = 1.0 + c * hessian_loss;
    let direction = -gradient / hessian;
    if direction == 0.0 || !direction.is_finite() {
        return 0.0;
    }

    let mut step = 1.0;
    for _ in 0..MAX_BACKTRACKS {
        let delta = step * direction;
        let penalty_change = 0.5 * ((*weight + delta).powi(2) - weight.powi(2));
        let mut loss_change = 0.0;
        for ((x, label), margin) in column.iter().zip(y.iter()).zip(margins.iter()) {
            if *x == 0.0 {
                continue;
            }
            loss_change += softplus(-label * (margin + delta * x)) - softplus(-label * margin);
        }
        if penalty_change + c * loss_change <= ARMIJO_SIGMA * delta * gradient {
            *weight += delta;
            for (x, margin) in column.iter().zip(margins.iter_mut()) {
                *margin += delta * x;
            }
            return delta;
        }
        step *= BACKTRACK_FACTOR;
    }
    0.0
}

pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `log(1 + exp(z))` without overflow.
pub fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}
