use crate::error::{ensure_finite, PhysicsError, Result};

use super::matrix::Matrix;
use super::vec3::Vec3;

/// A dynamically sized vector of f32 values.
///
/// Every operation is pure and checks operand dimensions; a failed operation
/// leaves both operands untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vector {
    values: Vec<f32>,
}

impl Vector {
    /// Creates a vector from its components
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Creates the zero vector of the given dimension
    pub fn zeros(dimension: usize) -> Self {
        Self::new(vec![0.0; dimension])
    }

    /// Converts a single-column matrix into a vector
    pub fn from_matrix(matrix: &Matrix) -> Result<Self> {
        if matrix.cols() != 1 {
            return Err(PhysicsError::dimensions(
                format!("{}x1", matrix.rows()),
                format!("{}x{}", matrix.rows(), matrix.cols()),
            ));
        }
        Ok(Self::new((0..matrix.rows()).map(|i| matrix[(i, 0)]).collect()))
    }

    /// Number of components
    #[inline]
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Component at `index`, if any
    #[inline]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// All components
    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    fn check_dimension(&self, other: &Self) -> Result<()> {
        if self.dimension() == other.dimension() {
            Ok(())
        } else {
            Err(PhysicsError::dimensions(self.dimension(), other.dimension()))
        }
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f32, f32) -> f32) -> Result<Self> {
        self.check_dimension(other)?;
        Ok(Self::new(
            self.values
                .iter()
                .zip(&other.values)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        ))
    }

    /// Component-wise sum
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Component-wise difference
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Multiplies every component by a finite factor
    pub fn scale(&self, factor: f32) -> Result<Self> {
        let factor = ensure_finite("scale factor", factor)?;
        Ok(Self::new(self.values.iter().map(|v| v * factor).collect()))
    }

    /// Divides every component by a non-zero, finite divisor
    pub fn divide(&self, divisor: f32) -> Result<Self> {
        if divisor == 0.0 {
            return Err(PhysicsError::invalid("divisor", divisor));
        }
        self.scale(1.0 / ensure_finite("divisor", divisor)?)
    }

    /// Dot product
    pub fn dot(&self, other: &Self) -> Result<f32> {
        self.check_dimension(other)?;
        Ok(self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a * b)
            .sum())
    }

    /// Cross product, defined for 3-dimensional vectors only
    pub fn cross(&self, other: &Self) -> Result<Self> {
        let a = Vec3::try_from(self)?;
        let b = Vec3::try_from(other)?;
        Ok(Self::from(a.cross(b)))
    }

    /// Euclidean norm
    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Returns a unit-length copy.
    ///
    /// A zero vector is an error unless `tolerate_zero` is set, in which case
    /// it is returned unchanged.
    pub fn normalize(&self, tolerate_zero: bool) -> Result<Self> {
        let norm = self.norm();
        if norm == 0.0 {
            return if tolerate_zero {
                Ok(self.clone())
            } else {
                Err(PhysicsError::DegenerateVector)
            };
        }
        self.divide(norm)
    }
}

impl From<Vec3> for Vector {
    fn from(v: Vec3) -> Self {
        Self::new(v.to_array().to_vec())
    }
}

impl TryFrom<&Vector> for Vec3 {
    type Error = PhysicsError;

    fn try_from(v: &Vector) -> Result<Self> {
        match v.values() {
            &[x, y, z] => Ok(Vec3::new(x, y, z)),
            other => Err(PhysicsError::dimensions(3, other.len())),
        }
    }
}
