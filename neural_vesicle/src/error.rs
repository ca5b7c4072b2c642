//! Error types for neural_vesicle.

use thiserror::Error;

use vesicle_core::CoreError;

/// Errors that can occur while training or inspecting a phase-field model.
#[derive(Error, Debug)]
pub enum VesicleError {
    /// Invalid configuration or API misuse.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// Tensor shape mismatch.
    #[error("tensor shape mismatch in {context}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Where the mismatch was detected.
        context: String,
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// A non-finite value appeared in the cost or the parameters.
    #[error("numeric instability at epoch {epoch}: {quantity} = {value}")]
    NumericInstability {
        /// Epoch at which the value was observed.
        epoch: usize,
        /// Name of the offending quantity.
        quantity: String,
        /// The offending value.
        value: f64,
    },

    /// Filesystem error.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failure in the burn record layer.
    #[error("recorder error: {0}")]
    Recorder(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A tensor could not be copied back to the host.
    #[error("tensor readback failed for {context}: {message}")]
    Readback {
        /// Quantity being read.
        context: String,
        /// Backend description of the failure.
        message: String,
    },

    /// Failure while rendering or writing a plot.
    #[error("plot error: {0}")]
    Plot(String),

    /// Error from vesicle_core.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl VesicleError {
    /// Shorthand for a [`VesicleError::Configuration`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the path that caused it.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Result type for neural_vesicle operations.
pub type Result<T> = std::result::Result<T, VesicleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_instability_display() {
        let err = VesicleError::NumericInstability {
            epoch: 12,
            quantity: "cost".to_string(),
            value: f64::NAN,
        };
        assert_eq!(err.to_string(), "numeric instability at epoch 12: cost = NaN");
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: VesicleError = CoreError::InvalidMeshSize(1).into();
        assert_eq!(err.to_string(), "mesh size must be at least 2, got 1");
    }

    #[test]
    fn test_io_error_carries_path() {
        let err = VesicleError::io(
            "saved_model_3/missing.mpk",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.to_string().contains("saved_model_3/missing.mpk"));
    }
}
