//! Symmetric distance matrix.
//!
//! [`DistanceMatrix`] is built once before the first generation and shared
//! read-only by every operator for the lifetime of a run.

use crate::error::{Result, TspError};
use crate::instance::Point;

/// Immutable N×N matrix of non-negative, symmetric distances with a zero
/// diagonal. Stored row-major in a single buffer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Validates and wraps a square matrix given as rows.
    ///
    /// # Errors
    /// Returns [`TspError::InvalidMatrix`] if the rows are ragged, any entry
    /// is negative or non-finite, the diagonal is non-zero, or the matrix is
    /// not symmetric.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(TspError::invalid_matrix(format!(
                    "row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            data.extend(row);
        }

        let matrix = Self { n, data };
        matrix.check()?;
        Ok(matrix)
    }

    /// Builds the Euclidean distance matrix of `points`.
    pub fn from_points(points: &[Point]) -> Self {
        let n = points.len();
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].distance(&points[j]);
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }
        Self { n, data }
    }

    fn check(&self) -> Result<()> {
        let n = self.n;
        for i in 0..n {
            if self.get(i, i) != 0.0 {
                return Err(TspError::invalid_matrix(format!(
                    "diagonal entry ({i}, {i}) is {}",
                    self.get(i, i)
                )));
            }
            for j in (i + 1)..n {
                let d = self.get(i, j);
                if !d.is_finite() || d < 0.0 {
                    return Err(TspError::invalid_matrix(format!(
                        "entry ({i}, {j}) is {d}"
                    )));
                }
                if d != self.get(j, i) {
                    return Err(TspError::invalid_matrix(format!(
                        "entries ({i}, {j}) and ({j}, {i}) differ"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Returns `true` for a matrix with no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Distance between vertices `i` and `j`.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Row `i` as a slice.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }
}
