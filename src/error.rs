use thiserror::Error;

/// Errors raised by the physics core.
///
/// All of them describe programmer or data errors: they are reported at the
/// point of violation and never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// Operand shapes are incompatible (vector lengths, matrix dimensions)
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: String, found: String },

    /// The matrix has fewer pivots than its dimension
    #[error("matrix is singular ({pivots} pivots for dimension {dimension})")]
    SingularMatrix { pivots: usize, dimension: usize },

    /// A zero-length vector was normalized without tolerating zero
    #[error("cannot normalize a zero-length vector")]
    DegenerateVector,

    /// A scalar input was NaN, infinite, or otherwise out of its domain
    #[error("invalid number for {what}: {value}")]
    InvalidNumber { what: &'static str, value: f32 },

    /// Malformed matrix construction, bad index, or out-of-range extraction
    #[error("shape constraint violated: {0}")]
    ShapeConstraint(String),
}

impl PhysicsError {
    pub(crate) fn dimensions(expected: impl ToString, found: impl ToString) -> Self {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn invalid(what: &'static str, value: f32) -> Self {
        Self::InvalidNumber { what, value }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, PhysicsError>;

/// Checks that `value` is finite, naming the offending quantity otherwise
pub(crate) fn ensure_finite(what: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PhysicsError::invalid(what, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = PhysicsError::dimensions(3, 4);
        assert_eq!(err.to_string(), "dimension mismatch: expected 3, found 4");

        let err = PhysicsError::SingularMatrix {
            pivots: 2,
            dimension: 3,
        };
        assert!(err.to_string().contains("singular"));
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite("stiffness", 2.0), Ok(2.0));
        assert!(matches!(
            ensure_finite("stiffness", f32::NAN),
            Err(PhysicsError::InvalidNumber { what: "stiffness", .. })
        ));
        assert!(ensure_finite("rest length", f32::INFINITY).is_err());
    }
}
