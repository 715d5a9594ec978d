//! Dense matrices and Gaussian elimination with partial pivoting.
//!
//! Sized for the small normal-equation systems of Wiener and linear-prediction
//! design (tens of unknowns). Elimination is O(n³) on a private copy; the
//! caller's matrix is never modified by [`solve`].

use std::fmt;

use crate::error::{KernelError, Result, ensure_finite};

/// Relative pivot threshold: a pivot `p` with `|p| ≤ PIVOT_TOLERANCE · max|A|`
/// marks the system as singular.
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// All-zero `rows × cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// `n × n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        m.add_to_diagonal(1.0);
        m
    }

    /// Build from row vectors. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * cols);
        for row in rows {
            if row.len() != cols {
                return Err(KernelError::LengthMismatch {
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            rows: n_rows,
            cols,
            data,
        })
    }

    /// Build a matrix whose entry `(i, j)` is `f(i, j)`.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { rows, cols, data }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// True for a square matrix.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.data[row * self.cols + col]
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Add `lambda` to every main-diagonal entry (Tikhonov regularization).
    pub fn add_to_diagonal(&mut self, lambda: f64) {
        for i in 0..self.rows.min(self.cols) {
            self.data[i * self.cols + i] += lambda;
        }
    }

    /// Matrix-vector product `A·x`.
    pub fn mul_vec(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.cols {
            return Err(KernelError::LengthMismatch {
                expected: self.cols,
                actual: x.len(),
            });
        }
        Ok((0..self.rows)
            .map(|i| self.row(i).iter().zip(x).map(|(a, b)| a * b).sum())
            .collect())
    }

    /// Largest absolute entry (0 for an empty matrix).
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |m, v| m.max(v.abs()))
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            let cells: Vec<String> = self.row(i).iter().map(|v| format!("{v:>10.4}")).collect();
            writeln!(f, "[{}]", cells.join(" "))?;
        }
        Ok(())
    }
}

/// Solve `A·x = b` by Gaussian elimination with partial pivoting.
///
/// At step `k` the row with the largest `|A[i][k]|` (i ≥ k) is swapped into
/// place; back-substitution follows. A pivot no larger than
/// [`PIVOT_TOLERANCE`] times the largest entry of `A` aborts with
/// [`KernelError::SingularSystem`] rather than dividing through.
pub fn solve(a: &Matrix, b: &[f64]) -> Result<Vec<f64>> {
    if !a.is_square() || b.len() != a.rows {
        return Err(KernelError::DimensionMismatch {
            rows: a.rows,
            cols: a.cols,
            rhs: b.len(),
        });
    }
    ensure_finite(&a.data)?;
    ensure_finite(b)?;

    let n = a.rows;
    if n == 0 {
        return Ok(Vec::new());
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(n, "solve");

    let threshold = PIVOT_TOLERANCE * a.max_abs();
    let mut m = a.data.clone();
    let mut x = b.to_vec();

    for k in 0..n {
        let (pivot_row, pivot_abs) = (k..n)
            .map(|i| (i, m[i * n + k].abs()))
            .fold((k, -1.0), |best, cand| if cand.1 > best.1 { cand } else { best });
        if pivot_abs <= threshold {
            return Err(KernelError::SingularSystem { column: k });
        }
        if pivot_row != k {
            for j in 0..n {
                m.swap(k * n + j, pivot_row * n + j);
            }
            x.swap(k, pivot_row);
        }

        let pivot = m[k * n + k];
        for i in k + 1..n {
            let factor = m[i * n + k] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in k..n {
                m[i * n + j] -= factor * m[k * n + j];
            }
            x[i] -= factor * x[k];
        }
    }

    for k in (0..n).rev() {
        let tail: f64 = (k + 1..n).map(|j| m[k * n + j] * x[j]).sum();
        x[k] = (x[k] - tail) / m[k * n + k];
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_identity() {
        let x = solve(&Matrix::identity(3), &[1.0, -2.0, 3.5]).unwrap();
        assert_eq!(x, vec![1.0, -2.0, 3.5]);
    }

    #[test]
    fn test_solve_requires_pivoting() {
        // Zero in the (0, 0) slot; naive elimination would divide by zero.
        let a = Matrix::from_rows(vec![vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap();
        let x = solve(&a, &[4.0, 13.0]).unwrap();
        assert!((x[0] - 0.5).abs() < 1e-12);
        assert!((x[1] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_leaves_matrix_untouched() {
        let a = Matrix::from_rows(vec![vec![4.0, 1.0], vec![1.0, 3.0]]).unwrap();
        let before = a.clone();
        let x = solve(&a, &[1.0, 2.0]).unwrap();
        assert_eq!(a, before);
        let residual = a.mul_vec(&x).unwrap();
        assert!((residual[0] - 1.0).abs() < 1e-12 && (residual[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_singular_system() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        assert_eq!(solve(&a, &[1.0, 2.0]), Err(KernelError::SingularSystem { column: 1 }));
        assert_eq!(
            solve(&Matrix::zeros(2, 2), &[0.0, 0.0]),
            Err(KernelError::SingularSystem { column: 0 })
        );
    }

    #[test]
    fn test_dimension_checks() {
        let a = Matrix::zeros(3, 2);
        assert!(matches!(
            solve(&a, &[0.0; 3]),
            Err(KernelError::DimensionMismatch { rows: 3, cols: 2, rhs: 3 })
        ));
        assert!(matches!(
            solve(&Matrix::identity(2), &[0.0; 3]),
            Err(KernelError::DimensionMismatch { .. })
        ));
        assert!(Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(solve(&Matrix::zeros(0, 0), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_rejected() {
        let a = Matrix::from_rows(vec![vec![1.0, f64::NAN], vec![0.0, 1.0]]).unwrap();
        assert_eq!(solve(&a, &[1.0, 1.0]), Err(KernelError::NonFinite { index: 1 }));
    }

    #[test]
    fn test_add_to_diagonal_regularizes() {
        let mut a = Matrix::zeros(2, 2);
        a.add_to_diagonal(1e-6);
        let x = solve(&a, &[1e-6, 2e-6]).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-9 && (x[1] - 2.0).abs() < 1e-9);
    }
}
