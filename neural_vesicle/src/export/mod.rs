//! Read-only collaborators of a trained field.
//!
//! - [`field_plots`]: grid sampling of φ and the phase-field plots
//! - [`plot`]: PNG charts drawn with `plotters`
//! - [`quadrature`]: deterministic integrals for cross-checking the
//!   Monte-Carlo estimates

pub mod field_plots;
pub mod plot;
pub mod quadrature;

pub use field_plots::{render_field_plots, render_training_plots, FieldGrid};
pub use plot::{color_map, plot_phase_profile, plot_points, plot_series, Labels, Scale, LINE_COLOR};
pub use quadrature::{evenly_spaced_integrals, gauss_legendre_integrals, IntegralReport};

use burn::tensor::TensorData;

use crate::error::{Result, VesicleError};

/// Host copy of `f32` tensor data.
pub(crate) fn host_values(data: TensorData, context: &str) -> Result<Vec<f32>> {
    data.to_vec::<f32>().map_err(|e| VesicleError::Readback {
        context: context.to_string(),
        message: format!("{e:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_values() {
        let data = TensorData::new(vec![0.5f32, -1.0], [2, 1]);
        assert_eq!(host_values(data, "phi").unwrap(), vec![0.5, -1.0]);
    }

    #[test]
    fn test_readback_failure_is_not_a_configuration_error() {
        let data = TensorData::new(vec![0.5f64], [1, 1]);
        let err = host_values(data, "density").unwrap_err();
        assert!(matches!(err, VesicleError::Readback { ref context, .. } if context == "density"));
    }
}
