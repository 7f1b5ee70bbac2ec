//! Least-squares polynomial trend fitting.
//!
//! Fits a degree-2 polynomial to (year, count) points by solving the normal
//! equations directly. The x values are centered on their mean before
//! solving so the system stays well conditioned for calendar-year inputs;
//! the fitted values are unchanged by the shift.

use crate::{BibtrendError, Result};

/// A least-squares polynomial trend over yearly publication counts.
///
/// The target degree is 2. When the input has fewer distinct x values than
/// a quadratic needs, the degree degrades to fit what is there: two
/// distinct years give a line, one gives a constant.
#[derive(Debug, Clone)]
pub struct QuadraticTrend {
    /// Coefficients in ascending power order, over centered x values.
    coeffs: Vec<f64>,
    /// Offset subtracted from x before evaluation.
    x_offset: f64,
}

impl QuadraticTrend {
    /// Fits the trend to a set of (x, y) points.
    ///
    /// # Errors
    ///
    /// Returns [`BibtrendError::InsufficientData`] when no points are given,
    /// or [`BibtrendError::Fit`] if the normal equations degenerate
    pub fn fit<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let points: Vec<(f64, f64)> = points.into_iter().collect();
        if points.is_empty() {
            return Err(BibtrendError::InsufficientData { needed: 1, got: 0 });
        }

        let n = points.len() as f64;
        let x_offset = points.iter().map(|(x, _)| x).sum::<f64>() / n;

        let mut distinct_x: Vec<f64> = points.iter().map(|&(x, _)| x).collect();
        distinct_x.sort_by(f64::total_cmp);
        distinct_x.dedup();
        let degree = usize::min(2, distinct_x.len() - 1);

        // Accumulate the moment sums that make up the normal equations
        let size = degree + 1;
        let mut moments = vec![0.0; 2 * degree + 1];
        let mut rhs = vec![0.0; size];
        for &(x, y) in &points {
            let x = x - x_offset;
            let mut power = 1.0;
            for (k, moment) in moments.iter_mut().enumerate() {
                *moment += power;
                if k < size {
                    rhs[k] += y * power;
                }
                power *= x;
            }
        }

        let mut matrix = vec![vec![0.0; size]; size];
        for (row, matrix_row) in matrix.iter_mut().enumerate() {
            for (col, cell) in matrix_row.iter_mut().enumerate() {
                *cell = moments[row + col];
            }
        }

        let coeffs = solve(matrix, rhs)?;
        Ok(Self { coeffs, x_offset })
    }

    /// Evaluates the fitted polynomial at `x`.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        let x = x - self.x_offset;
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }

    /// Degree of the fitted polynomial.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }
}

/// Solve a small linear system by Gaussian elimination with partial pivoting.
fn solve(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Result<Vec<f64>> {
    let n = rhs.len();

    for col in 0..n {
        let mut pivot = col;
        for row in (col + 1)..n {
            if matrix[row][col].abs() > matrix[pivot][col].abs() {
                pivot = row;
            }
        }
        if matrix[pivot][col].abs() < f64::EPSILON {
            return Err(BibtrendError::Fit(
                "normal equations are singular".to_string(),
            ));
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = rhs[row];
        for col in (row + 1)..n {
            acc -= matrix[row][col] * solution[col];
        }
        solution[row] = acc / matrix[row][row];
    }

    Ok(solution)
}
