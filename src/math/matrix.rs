use std::ops::Index;

use crate::error::{ensure_finite, PhysicsError, Result};

use super::vector::Vector;

/// A dense, row-major matrix of f32 values.
///
/// Like [`Vector`], it is a value type: every operation builds its result
/// before returning, so a failed operation never modifies the receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

/// Reduced row-echelon form and the number of pivots found
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub reduced: Matrix,
    pub pivots: usize,
}

impl Matrix {
    /// Creates a `rows` x `cols` matrix filled with zeros
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates the `n` x `n` identity matrix
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Creates a matrix from rows; every row must have the same length
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(PhysicsError::ShapeConstraint(format!(
                "row {} has {} columns, expected {}",
                i,
                row.len(),
                cols
            )));
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data: rows.concat(),
        })
    }

    /// Creates a single-column matrix from a vector
    pub fn from_column(v: &Vector) -> Self {
        Self {
            rows: v.dimension(),
            cols: 1,
            data: v.values().to_vec(),
        }
    }

    /// Number of rows
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the entry at (`row`, `col`), if in range
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        (row < self.rows && col < self.cols).then(|| self.data[row * self.cols + col])
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: f32) {
        self.data[row * self.cols + col] = value;
    }

    fn shape(&self) -> String {
        format!("{}x{}", self.rows, self.cols)
    }

    fn row_slice(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Element-wise sum
    pub fn add(&self, other: &Self) -> Result<Self> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(PhysicsError::dimensions(self.shape(), other.shape()));
        }
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&other.data).map(|(a, b)| a + b).collect(),
        })
    }

    /// Element-wise difference
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.add(&other.scale(-1.0)?)
    }

    /// Multiplies every entry by a finite factor
    pub fn scale(&self, factor: f32) -> Result<Self> {
        let factor = ensure_finite("scale factor", factor)?;
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| v * factor).collect(),
        })
    }

    /// Matrix product `self * other`
    pub fn product(&self, other: &Self) -> Result<Self> {
        if self.cols != other.rows {
            return Err(PhysicsError::dimensions(
                format!("{}xN", self.cols),
                other.shape(),
            ));
        }
        let mut result = Self::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                result.data[i * other.cols + j] = (0..self.cols)
                    .map(|k| self.data[i * self.cols + k] * other.data[k * other.cols + j])
                    .sum();
            }
        }
        Ok(result)
    }

    /// Returns the transpose
    pub fn transpose(&self) -> Self {
        let mut result = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                result.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        result
    }

    /// Concatenates `other` to the right of `self`
    pub fn augment(&self, other: &Self) -> Result<Self> {
        if self.rows != other.rows {
            return Err(PhysicsError::dimensions(
                format!("{} rows", self.rows),
                format!("{} rows", other.rows),
            ));
        }
        let rows: Vec<Vec<f32>> = (0..self.rows)
            .map(|i| [self.row_slice(i), other.row_slice(i)].concat())
            .collect();
        Self::from_rows(&rows)
    }

    /// Extracts the sub-matrix spanning rows `start_row..end_row` and
    /// columns `start_col..end_col`
    pub fn extract(
        &self,
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) -> Result<Self> {
        if end_row > self.rows
            || end_col > self.cols
            || end_row <= start_row
            || end_col <= start_col
        {
            return Err(PhysicsError::ShapeConstraint(format!(
                "range ({}, {})..({}, {}) outside {} matrix",
                start_row,
                start_col,
                end_row,
                end_col,
                self.shape()
            )));
        }
        let rows: Vec<Vec<f32>> = (start_row..end_row)
            .map(|i| self.row_slice(i)[start_col..end_col].to_vec())
            .collect();
        Self::from_rows(&rows)
    }

    /// Round-off threshold below which an entry counts as zero, relative to
    /// the largest entry of the matrix
    fn pivot_tolerance(&self) -> f32 {
        let largest = self.data.iter().fold(0.0f32, |acc, v| acc.max(v.abs()));
        f32::EPSILON * self.rows.max(self.cols) as f32 * largest
    }

    /// Reduces the matrix to reduced row-echelon form with Gauss-Jordan
    /// elimination, counting the pivots on the way.
    pub fn reduce(&self) -> Reduction {
        self.reduce_with(self.pivot_tolerance())
    }

    fn reduce_with(&self, tolerance: f32) -> Reduction {
        let mut m = self.clone();
        let mut pivot_row = 0;

        for col in 0..m.cols {
            if pivot_row == m.rows {
                break;
            }

            // Partial pivoting: largest magnitude entry at or below pivot_row
            let best = (pivot_row..m.rows)
                .max_by(|&a, &b| {
                    m.data[a * m.cols + col]
                        .abs()
                        .total_cmp(&m.data[b * m.cols + col].abs())
                })
                .unwrap_or(pivot_row);

            if m.data[best * m.cols + col].abs() <= tolerance {
                continue;
            }

            m.swap_rows(pivot_row, best);

            let pivot = m.data[pivot_row * m.cols + col];
            for j in 0..m.cols {
                m.data[pivot_row * m.cols + j] /= pivot;
            }

            for i in 0..m.rows {
                if i == pivot_row {
                    continue;
                }
                let factor = m.data[i * m.cols + col];
                if factor != 0.0 {
                    for j in 0..m.cols {
                        m.data[i * m.cols + j] -= factor * m.data[pivot_row * m.cols + j];
                    }
                }
            }

            pivot_row += 1;
        }

        Reduction {
            reduced: m,
            pivots: pivot_row,
        }
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    /// Returns the inverse, computed by reducing `[self | I]`.
    ///
    /// Fails for non-square matrices and for matrices with fewer pivots than
    /// their dimension.
    pub fn inverse(&self) -> Result<Self> {
        if self.rows != self.cols {
            return Err(PhysicsError::dimensions(
                format!("{}x{}", self.rows, self.rows),
                self.shape(),
            ));
        }
        let n = self.rows;

        // The identity block must not set the scale for the left block
        let tolerance = self.pivot_tolerance();
        let pivots = self.reduce_with(tolerance).pivots;
        if pivots < n {
            return Err(PhysicsError::SingularMatrix {
                pivots,
                dimension: n,
            });
        }

        let Reduction { reduced, .. } = self.augment(&Self::identity(n))?.reduce_with(tolerance);
        reduced.extract(0, n, n, 2 * n)
    }

    /// Returns true if every entry is within `epsilon` of `other`'s
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        assert!(
            row < self.rows && col < self.cols,
            "Matrix index ({}, {}) out of bounds for {}",
            row,
            col,
            self.shape()
        );
        &self.data[row * self.cols + col]
    }
}
