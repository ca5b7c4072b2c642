//! Error types for vesicle_core operations.

use thiserror::Error;

/// Errors raised while validating run geometry and physical parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A physical constant is outside its admissible range.
    #[error("invalid physical constant {name} = {value}: {reason}")]
    InvalidConstant {
        /// Name of the constant.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// A regime index does not address the parameter tables.
    #[error("regime index {index} out of range for {table} table of length {len}")]
    RegimeIndexOutOfRange {
        /// Which table was indexed.
        table: &'static str,
        /// Requested index.
        index: usize,
        /// Table length.
        len: usize,
    },

    /// The domain bounds are empty or not finite.
    #[error("invalid domain: r_min = {r_min} must be finite and below r_max = {r_max}")]
    InvalidDomain {
        /// Lower bound.
        r_min: f32,
        /// Upper bound.
        r_max: f32,
    },

    /// A grid needs at least two nodes per axis.
    #[error("mesh size must be at least 2, got {0}")]
    InvalidMeshSize(usize),

    /// A random point set needs at least one point.
    #[error("point count must be positive")]
    EmptyPointSet,

    /// A Gauss–Legendre rule needs at least one node.
    #[error("quadrature order must be positive")]
    InvalidQuadratureOrder,
}

/// Result type for vesicle_core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidMeshSize(1);
        assert_eq!(err.to_string(), "mesh size must be at least 2, got 1");

        let err = CoreError::RegimeIndexOutOfRange {
            table: "volume",
            index: 19,
            len: 19,
        };
        assert_eq!(
            err.to_string(),
            "regime index 19 out of range for volume table of length 19"
        );
    }
}
