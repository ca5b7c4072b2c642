//! The differential operator.
//!
//! Input points are never mutated or marked for gradient tracking.

use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;

use crate::error::{Result, VesicleError};
use crate::nn::{Jet, JetOrder, PhaseField, SPATIAL_DIM};

/// `φ`, `|∇φ|²` and `∇²φ` at a batch of points, each `[N, 1]`.
///
/// Built fresh for every forward pass. On an autodiff backend every tensor
/// is still attached to the parameter graph.
#[derive(Debug, Clone)]
pub struct DerivativeBundle<B: Backend> {
    /// Field values.
    pub phi: Tensor<B, 2>,
    /// Squared gradient magnitude, when first derivatives were requested.
    pub grad_mag_sq: Option<Tensor<B, 2>>,
    /// Laplacian, when second derivatives were requested.
    pub laplacian: Option<Tensor<B, 2>>,
}

impl<B: Backend> DerivativeBundle<B> {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.phi.dims()[0]
    }

    /// Whether the bundle covers no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `|∇φ|²`, or a configuration error if it was not computed.
    pub fn require_grad_mag_sq(&self) -> Result<Tensor<B, 2>> {
        self.grad_mag_sq
            .clone()
            .ok_or_else(|| VesicleError::config("squared gradient magnitude was not computed"))
    }

    /// `∇²φ`, or a configuration error if it was not computed.
    pub fn require_laplacian(&self) -> Result<Tensor<B, 2>> {
        self.laplacian
            .clone()
            .ok_or_else(|| VesicleError::config("laplacian was not computed"))
    }
}

/// Computes spatial derivatives of a [`PhaseField`].
///
/// First and pure second partials are propagated forward through the field
/// as a jet. The input points are never marked for gradient tracking, so the
/// same point tensor can be reused across calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct DifferentialOperator;

impl DifferentialOperator {
    /// Create the operator.
    pub fn new() -> Self {
        Self
    }

    /// Evaluate `φ` and, on request, `|∇φ|²` and `∇²φ` at `[N, 3]` points.
    ///
    /// Requesting the Laplacian without the gradient is rejected before
    /// the field is evaluated.
    pub fn derive<B: Backend, F: PhaseField<B>>(
        &self,
        field: &F,
        points: Tensor<B, 2>,
        need_first: bool,
        need_second: bool,
    ) -> Result<DerivativeBundle<B>> {
        if need_second && !need_first {
            return Err(VesicleError::config(
                "second derivatives require first derivatives",
            ));
        }
        check_points(&points)?;

        let order = match (need_first, need_second) {
            (_, true) => JetOrder::Second,
            (true, false) => JetOrder::First,
            (false, false) => JetOrder::Value,
        };

        if order == JetOrder::Value {
            return Ok(DerivativeBundle {
                phi: field.evaluate(points),
                grad_mag_sq: None,
                laplacian: None,
            });
        }

        let jet = field.propagate(Jet::seed(points, order));
        log::trace!("derived {} points to order {:?}", jet.batch_size(), order);

        Ok(DerivativeBundle {
            grad_mag_sq: jet.grad_mag_sq(),
            laplacian: jet.laplacian(),
            phi: jet.value,
        })
    }

    /// `∇φ` at `[N, 3]` points, `[N, 3]`, from the jet.
    pub fn gradient<B: Backend, F: PhaseField<B>>(
        &self,
        field: &F,
        points: Tensor<B, 2>,
    ) -> Result<Tensor<B, 2>> {
        check_points(&points)?;
        field
            .propagate(Jet::seed(points, JetOrder::First))
            .gradient()
            .ok_or_else(|| VesicleError::config("field dropped its first derivatives"))
    }
}

/// `∇φ` at `[N, 3]` points by reverse-mode differentiation.
///
/// Backpropagates `φ` with a seed of ones from a tracked copy of the points.
/// Each point's gradient only depends on its own row, so the whole batch is
/// differentiated at once. The caller's tensor is left untracked.
pub fn reverse_gradient<B: AutodiffBackend, F: PhaseField<B>>(
    field: &F,
    points: Tensor<B, 2>,
) -> Result<Tensor<B::InnerBackend, 2>> {
    check_points(&points)?;
    let tracked = points.detach().require_grad();
    let phi = field.evaluate(tracked.clone());
    let grads = phi.sum().backward();
    tracked
        .grad(&grads)
        .ok_or_else(|| VesicleError::config("points are not connected to the field output"))
}

fn check_points<B: Backend>(points: &Tensor<B, 2>) -> Result<()> {
    let [n, dim] = points.dims();
    if dim != SPATIAL_DIM {
        return Err(VesicleError::ShapeMismatch {
            context: "sample points".to_string(),
            expected: vec![n, SPATIAL_DIM],
            got: vec![n, dim],
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    /// `φ(r) = |r|²`.
    struct SquaredRadius;

    impl<B: Backend> PhaseField<B> for SquaredRadius {
        fn evaluate(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
            (points.clone() * points).sum_dim(1)
        }

        fn propagate(&self, jet: Jet<B>) -> Jet<B> {
            jet.square().sum_features()
        }
    }

    #[test]
    fn test_value_only() {
        let device = Default::default();
        let points = Tensor::<TestBackend, 2>::from_floats([[1.0, 2.0, 2.0]], &device);
        let bundle = DifferentialOperator::new()
            .derive(&SquaredRadius, points, false, false)
            .unwrap();

        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.phi.into_scalar(), 9.0);
        assert!(bundle.grad_mag_sq.is_none());
        assert!(bundle.laplacian.is_none());
    }

    #[test]
    fn test_first_only_skips_laplacian() {
        let device = Default::default();
        let points = Tensor::<TestBackend, 2>::from_floats([[1.0, 0.0, 0.0]], &device);
        let bundle = DifferentialOperator::new()
            .derive(&SquaredRadius, points, true, false)
            .unwrap();

        assert_eq!(bundle.require_grad_mag_sq().unwrap().into_scalar(), 4.0);
        assert!(bundle.require_laplacian().is_err());
    }

    #[test]
    fn test_rejects_second_without_first() {
        let device = Default::default();
        let points = Tensor::<TestBackend, 2>::zeros([2, 3], &device);
        let err = DifferentialOperator::new()
            .derive(&SquaredRadius, points, false, true)
            .unwrap_err();
        assert!(matches!(err, VesicleError::Configuration { .. }));
    }

    #[test]
    fn test_rejects_wrong_point_width() {
        let device = Default::default();
        let points = Tensor::<TestBackend, 2>::zeros([2, 2], &device);
        let err = DifferentialOperator::new()
            .derive(&SquaredRadius, points, true, true)
            .unwrap_err();
        assert!(matches!(err, VesicleError::ShapeMismatch { .. }));
    }
}
