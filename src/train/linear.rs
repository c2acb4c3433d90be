use super::matrix::Matrix;
use crate::error::{Error, Result};

/// Pivots below this fraction of their original diagonal entry count as zero.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Ordinary least-squares linear regression with an intercept.
///
/// Features and target are centred on their training means, the normal
/// equations `(XcᵀXc) β = Xcᵀyc` are solved by Cholesky factorisation, and the
/// intercept is recovered as `ȳ − x̄·β`. Centring keeps the Gram matrix well
/// conditioned when columns sit far from zero (`TAX`, `B`).
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    coefficients: Option<Vec<f64>>,
    intercept: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fitted coefficients, one per feature column.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    /// Fit on `x` (one row per sample) and targets `y`.
    ///
    /// # Errors
    ///
    /// * `ShapeMismatch` – `x` and `y` disagree on the number of samples
    /// * `EmptyInput` – no samples
    /// * `InsufficientSamples` – fewer samples than parameters (features + 1)
    /// * `Singular` – collinear or constant feature columns
    pub fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        let (n_samples, n_features) = x.shape();
        if n_samples != y.len() {
            return Err(Error::ShapeMismatch(format!(
                "X has {n_samples} rows but y has {} values",
                y.len()
            )));
        }
        if n_samples == 0 {
            return Err(Error::EmptyInput);
        }
        if n_samples < n_features + 1 {
            return Err(Error::InsufficientSamples {
                n_samples,
                n_params: n_features + 1,
            });
        }

        let x_mean = x.column_means();
        let y_mean = y.iter().sum::<f64>() / n_samples as f64;

        // Gram matrix and right-hand side of the centred normal equations.
        let mut gram = vec![0.0; n_features * n_features];
        let mut rhs = vec![0.0; n_features];
        let mut centred = vec![0.0; n_features];
        for (i, target) in y.iter().enumerate() {
            for (c, (v, m)) in centred.iter_mut().zip(x.row(i).iter().zip(&x_mean)) {
                *c = v - m;
            }
            let dy = target - y_mean;
            for a in 0..n_features {
                rhs[a] += centred[a] * dy;
                for b in 0..=a {
                    gram[a * n_features + b] += centred[a] * centred[b];
                }
            }
        }
        for a in 0..n_features {
            for b in 0..a {
                gram[b * n_features + a] = gram[a * n_features + b];
            }
        }

        let beta = cholesky_solve(&gram, &rhs, n_features)?;
        self.intercept = y_mean - beta.iter().zip(&x_mean).map(|(b, m)| b * m).sum::<f64>();
        self.coefficients = Some(beta);
        Ok(())
    }

    /// Predicted target for every row of `x`.
    pub fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(Error::NotFitted)?;
        let (n_rows, n_cols) = x.shape();
        if n_cols != coefficients.len() {
            return Err(Error::ShapeMismatch(format!(
                "model has {} coefficients, X has {n_cols} columns",
                coefficients.len()
            )));
        }
        Ok((0..n_rows)
            .map(|i| {
                self.intercept
                    + x.row(i)
                        .iter()
                        .zip(coefficients)
                        .map(|(v, c)| v * c)
                        .sum::<f64>()
            })
            .collect())
    }
}

/// Solve `A x = b` for symmetric positive-definite `A` (`n x n`, row-major).
fn cholesky_solve(a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
    // A = L Lᵀ
    let mut l = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            if i == j {
                for k in 0..j {
                    sum += l[j * n + k] * l[j * n + k];
                }
                let diag = a[j * n + j] - sum;
                if !(diag > a[j * n + j] * PIVOT_TOLERANCE) {
                    return Err(Error::Singular { pivot: j });
                }
                l[j * n + j] = diag.sqrt();
            } else {
                for k in 0..j {
                    sum += l[i * n + k] * l[j * n + k];
                }
                l[i * n + j] = (a[i * n + j] - sum) / l[j * n + j];
            }
        }
    }

    // L z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[i * n + j] * z[j]).sum();
        z[i] = (b[i] - sum) / l[i * n + i];
    }

    // Lᵀ x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|j| l[j * n + i] * x[j]).sum();
        x[i] = (z[i] - sum) / l[i * n + i];
    }

    Ok(x)
}
