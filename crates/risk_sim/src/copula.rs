//! Gaussian copula sampling via Cholesky factorisation.
//!
//! The standard NORTA construction: factor the correlation matrix
//! `Σ = L·Lᵗ`, transform independent standard normals `Z` into correlated
//! normals `W = L·Z`, and map through the normal CDF to get uniform
//! marginals `U = Φ(W)` carrying the prescribed dependence.
//!
//! Floating-point near-singularity is handled by a single diagonal jitter
//! retry (`ε = 1e-6`); a factorisation that still fails is a fatal
//! simulation error.

use risk_core::math::norm_cdf;

use crate::error::SimError;
use crate::rng::SimRng;

/// Diagonal boost applied once when the first factorisation attempt fails.
const JITTER: f64 = 1e-6;

/// Tolerance for unit diagonals and symmetry.
const TOLERANCE: f64 = 1e-9;

/// Validated correlation matrix with Cholesky decomposition.
#[derive(Clone, Debug)]
pub struct CorrelationMatrix {
    /// Row-major elements.
    data: Vec<f64>,
    dim: usize,
}

impl CorrelationMatrix {
    /// Builds a correlation matrix from row vectors.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidCorrelation`] when the rows are not a
    /// square, symmetric, unit-diagonal matrix with entries in [-1, 1].
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, SimError> {
        let dim = rows.len();
        if dim == 0 {
            return Err(SimError::InvalidCorrelation(
                "matrix must not be empty".to_string(),
            ));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(SimError::InvalidCorrelation(format!(
                    "row {i} has length {}, expected {dim}",
                    row.len()
                )));
            }
        }
        for i in 0..dim {
            if (rows[i][i] - 1.0).abs() > TOLERANCE {
                return Err(SimError::InvalidCorrelation(format!(
                    "diagonal entry {i} is {}, expected 1.0",
                    rows[i][i]
                )));
            }
            for j in (i + 1)..dim {
                let v = rows[i][j];
                if !(-1.0..=1.0).contains(&v) {
                    return Err(SimError::InvalidCorrelation(format!(
                        "entry ({i}, {j}) is {v}, must be in [-1, 1]"
                    )));
                }
                if (v - rows[j][i]).abs() > TOLERANCE {
                    return Err(SimError::InvalidCorrelation(format!(
                        "matrix is not symmetric at ({i}, {j})"
                    )));
                }
            }
        }

        let mut data = Vec::with_capacity(dim * dim);
        for row in rows {
            data.extend_from_slice(row);
        }
        Ok(Self { data, dim })
    }

    /// Identity matrix (independent marginals).
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![0.0; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self { data, dim }
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    /// Plain Cholesky decomposition (`Σ = L·Lᵗ`, lower triangular `L`).
    fn cholesky_raw(&self, diagonal_boost: f64) -> Option<CholeskyFactor> {
        let n = self.dim;
        let mut lower = vec![0.0; n * n];

        for i in 0..n {
            for j in 0..=i {
                let mut sum = 0.0;
                if j == i {
                    for k in 0..j {
                        let l_jk = lower[j * n + k];
                        sum += l_jk * l_jk;
                    }
                    let diag = self.get(j, j) + diagonal_boost - sum;
                    if diag <= 0.0 {
                        return None;
                    }
                    lower[j * n + j] = diag.sqrt();
                } else {
                    for k in 0..j {
                        sum += lower[i * n + k] * lower[j * n + k];
                    }
                    let l_jj = lower[j * n + j];
                    if l_jj <= 0.0 {
                        return None;
                    }
                    lower[i * n + j] = (self.get(i, j) - sum) / l_jj;
                }
            }
        }

        Some(CholeskyFactor {
            data: lower,
            dim: n,
        })
    }

    /// Cholesky factorisation with the single jitter retry.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NotPositiveDefinite`] when the factorisation
    /// fails even with the boosted diagonal.
    pub fn cholesky(&self) -> Result<CholeskyFactor, SimError> {
        self.cholesky_raw(0.0)
            .or_else(|| self.cholesky_raw(JITTER))
            .ok_or(SimError::NotPositiveDefinite)
    }
}

/// Lower-triangular Cholesky factor.
#[derive(Clone, Debug)]
pub struct CholeskyFactor {
    data: Vec<f64>,
    dim: usize,
}

impl CholeskyFactor {
    /// Element at (i, j); zero above the diagonal.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if j > i {
            0.0
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Transforms independent standard normals into correlated normals
    /// (`w = L·z`), writing into `out`.
    pub fn transform_into(&self, z: &[f64], out: &mut [f64]) {
        debug_assert!(z.len() >= self.dim && out.len() >= self.dim);
        for i in 0..self.dim {
            let mut sum = 0.0;
            for j in 0..=i {
                sum += self.get(i, j) * z[j];
            }
            out[i] = sum;
        }
    }
}

/// Draws `n_trials` correlated uniform vectors.
///
/// Returns one column per matrix dimension: `columns[j][t]` is the uniform
/// for target `j` on trial `t`, so consumers can threshold or invert a
/// whole target's stream at once.
///
/// # Errors
///
/// Propagates [`SimError::NotPositiveDefinite`] from the factorisation.
pub fn gaussian_copula_uniforms(
    matrix: &CorrelationMatrix,
    n_trials: usize,
    rng: &mut SimRng,
) -> Result<Vec<Vec<f64>>, SimError> {
    let factor = matrix.cholesky()?;
    let dim = matrix.dim();

    let mut columns = vec![vec![0.0; n_trials]; dim];
    let mut z = vec![0.0; dim];
    let mut w = vec![0.0; dim];
    for trial in 0..n_trials {
        rng.fill_normal(&mut z);
        factor.transform_into(&z, &mut w);
        for (j, column) in columns.iter_mut().enumerate() {
            column[trial] = norm_cdf(w[j]);
        }
    }
    Ok(columns)
}
