use std::ops::{Add, Mul};

use crate::error::{PhysicsError, Result};

use super::matrix::Matrix;
use super::vec3::Vec3;

/// A 3x3 matrix stored in column-major order.
///
/// Used for inertia tensors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Mat3 {
    /// Columns of the matrix
    pub cols: [Vec3; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat3 {
    /// Zero matrix
    pub const ZERO: Self = Self {
        cols: [Vec3::ZERO, Vec3::ZERO, Vec3::ZERO],
    };

    /// Identity matrix
    pub const IDENTITY: Self = Self {
        cols: [Vec3::X, Vec3::Y, Vec3::Z],
    };

    /// Creates a matrix from column vectors
    #[inline]
    pub const fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self { cols: [c0, c1, c2] }
    }

    /// Creates a matrix from row vectors
    #[inline]
    pub fn from_rows(r0: Vec3, r1: Vec3, r2: Vec3) -> Self {
        Self::from_cols(
            Vec3::new(r0.x, r1.x, r2.x),
            Vec3::new(r0.y, r1.y, r2.y),
            Vec3::new(r0.z, r1.z, r2.z),
        )
    }

    /// Creates a diagonal matrix
    #[inline]
    pub fn from_diagonal(diag: Vec3) -> Self {
        Self::from_cols(
            Vec3::new(diag.x, 0.0, 0.0),
            Vec3::new(0.0, diag.y, 0.0),
            Vec3::new(0.0, 0.0, diag.z),
        )
    }

    /// Returns the transpose of the matrix
    #[inline]
    pub fn transpose(self) -> Self {
        Self::from_rows(self.cols[0], self.cols[1], self.cols[2])
    }

    /// Returns the inverse, computed by row reduction.
    ///
    /// Fails with [`PhysicsError::SingularMatrix`] when the matrix is not
    /// full rank.
    pub fn inverse(self) -> Result<Self> {
        Self::try_from(&Matrix::from(self).inverse()?)
    }

    /// Transforms a vector by this matrix
    #[inline]
    pub fn transform_vec(self, v: Vec3) -> Vec3 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z
    }

    /// Returns a row of the matrix
    #[inline]
    pub fn row(self, index: usize) -> Vec3 {
        Vec3::new(self.cols[0][index], self.cols[1][index], self.cols[2][index])
    }

    /// Returns the diagonal elements
    #[inline]
    pub fn diagonal(self) -> Vec3 {
        Vec3::new(self.cols[0].x, self.cols[1].y, self.cols[2].z)
    }

    /// Scalar multiplication
    #[inline]
    pub fn scale(self, s: f32) -> Self {
        Self::from_cols(self.cols[0] * s, self.cols[1] * s, self.cols[2] * s)
    }

    /// Returns true if this is approximately equal to another matrix
    #[inline]
    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        self.cols
            .iter()
            .zip(&other.cols)
            .all(|(a, b)| (*a - *b).length_squared() < epsilon * epsilon)
    }
}

impl From<Mat3> for Matrix {
    fn from(m: Mat3) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2)];
        let mut result = Matrix::zeros(3, 3);
        for (i, row) in rows.iter().enumerate() {
            for j in 0..3 {
                result.set(i, j, row[j]);
            }
        }
        result
    }
}

impl TryFrom<&Matrix> for Mat3 {
    type Error = PhysicsError;

    fn try_from(m: &Matrix) -> Result<Self> {
        if m.rows() != 3 || m.cols() != 3 {
            return Err(PhysicsError::dimensions(
                "3x3",
                format!("{}x{}", m.rows(), m.cols()),
            ));
        }
        let row = |i: usize| Vec3::new(m[(i, 0)], m[(i, 1)], m[(i, 2)]);
        Ok(Self::from_rows(row(0), row(1), row(2)))
    }
}

impl Add for Mat3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::from_cols(
            self.cols[0] + other.cols[0],
            self.cols[1] + other.cols[1],
            self.cols[2] + other.cols[2],
        )
    }
}

impl Mul for Mat3 {
    type Output = Self;

    #[inline]
    fn mul(self, other: Self) -> Self {
        Self::from_cols(
            self.transform_vec(other.cols[0]),
            self.transform_vec(other.cols[1]),
            self.transform_vec(other.cols[2]),
        )
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;

    #[inline]
    fn mul(self, v: Vec3) -> Vec3 {
        self.transform_vec(v)
    }
}
