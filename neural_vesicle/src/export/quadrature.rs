//! Deterministic integrals of a trained field.
//!
//! Both estimates here are weighted sums `Σ wᵢ·density(rᵢ)` evaluated in
//! batches through the [`DifferentialOperator`]: a tensor-product
//! Gauss–Legendre rule, and the evenly spaced grid with the Monte-Carlo
//! weight `V/N`. Neither touches the model parameters.

use burn::prelude::*;
use serde::{Deserialize, Serialize};
use vesicle_core::{
    normalized_energy, reduced_volume, Domain, PhysicalConstants, PointSet, TensorProductRule,
};

use crate::diff::DifferentialOperator;
use super::host_values;
use crate::error::Result;
use crate::loss::{bending_energy_density, surface_density, volume_density};
use crate::nn::PhaseField;

/// Points per forward pass.
const CHUNK: usize = 16_384;

/// The three functionals of a field and the derived shape descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegralReport {
    /// Bending energy `W`.
    pub bending_energy: f64,
    /// Surface area `A`.
    pub area: f64,
    /// Volume `V`.
    pub volume: f64,
    /// `W / 4π`.
    pub normalized_energy: f64,
    /// `V / [(4π/3)(A/4π)^1.5]`.
    pub reduced_volume: f64,
}

impl IntegralReport {
    fn from_integrals(bending_energy: f64, area: f64, volume: f64) -> Self {
        Self {
            bending_energy,
            area,
            volume,
            normalized_energy: normalized_energy(bending_energy),
            reduced_volume: reduced_volume(area, volume),
        }
    }

    /// Log at info level.
    pub fn log(&self, prefix: &str) {
        log::info!(
            "{} volume={:.6} area={:.6} energy={:.6} reduced_volume={:.6}",
            prefix,
            self.volume,
            self.area,
            self.normalized_energy,
            self.reduced_volume,
        );
    }
}

/// Accumulates `Σ wᵢ·density(rᵢ)` for the three densities in `f64`.
struct WeightedSum<'a, F> {
    field: &'a F,
    constants: &'a PhysicalConstants,
    operator: DifferentialOperator,
    totals: [f64; 3],
}

impl<'a, F> WeightedSum<'a, F> {
    fn new(field: &'a F, constants: &'a PhysicalConstants) -> Self {
        Self {
            field,
            constants,
            operator: DifferentialOperator::new(),
            totals: [0.0; 3],
        }
    }

    fn add<B: Backend>(
        &mut self,
        points: &[[f32; 3]],
        weights: &[f64],
        device: &B::Device,
    ) -> Result<()>
    where
        F: PhaseField<B>,
    {
        let flat: Vec<f32> = points.iter().flatten().copied().collect();
        let input = Tensor::<B, 2>::from_data(TensorData::new(flat, [points.len(), 3]), device);
        let bundle = self.operator.derive(self.field, input, true, true)?;

        let phi = bundle.phi.clone();
        let densities = [
            bending_energy_density(
                phi.clone(),
                bundle.require_laplacian()?,
                self.constants.epsilon,
                self.constants.c0,
            ),
            surface_density(phi.clone(), bundle.require_grad_mag_sq()?, self.constants.epsilon),
            volume_density(phi),
        ];

        for (total, density) in self.totals.iter_mut().zip(densities) {
            let values = host_values(density.into_data(), "density")?;
            *total += values
                .iter()
                .zip(weights)
                .map(|(&v, &w)| v as f64 * w)
                .sum::<f64>();
        }
        Ok(())
    }

    fn finish(self) -> IntegralReport {
        let [bending_energy, area, volume] = self.totals;
        IntegralReport::from_integrals(bending_energy, area, volume)
    }
}

/// Integrate with an `order³` Gauss–Legendre rule on `domain`.
pub fn gauss_legendre_integrals<B: Backend, F: PhaseField<B>>(
    field: &F,
    constants: &PhysicalConstants,
    domain: &Domain,
    order: usize,
    device: &B::Device,
) -> Result<IntegralReport> {
    let rule = TensorProductRule::new(domain, order)?;
    log::debug!("Gauss-Legendre validation with {} points", rule.len());

    let mut sum = WeightedSum::new(field, constants);
    for (points, weights) in rule.chunks(CHUNK) {
        sum.add::<B>(&points, &weights, device)?;
    }
    Ok(sum.finish())
}

/// Monte-Carlo integrals on a fresh `mesh_size³` evenly spaced grid.
pub fn evenly_spaced_integrals<B: Backend, F: PhaseField<B>>(
    field: &F,
    constants: &PhysicalConstants,
    domain: &Domain,
    mesh_size: usize,
    device: &B::Device,
) -> Result<IntegralReport> {
    let points = PointSet::evenly_spaced(domain, mesh_size)?;
    let weight = domain.volume() / points.len() as f64;
    let weights = vec![weight; CHUNK];

    let mut sum = WeightedSum::new(field, constants);
    for chunk in points.points().chunks(CHUNK) {
        sum.add::<B>(chunk, &weights[..chunk.len()], device)?;
    }
    Ok(sum.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VesicleError;
    use crate::nn::Jet;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    /// `φ ≡ 1`: the whole box is inside.
    struct Inside;

    impl<B: Backend> PhaseField<B> for Inside {
        fn evaluate(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
            let n = points.dims()[0];
            Tensor::ones([n, 1], &points.device())
        }

        fn propagate(&self, jet: Jet<B>) -> Jet<B> {
            let jet = jet.sum_features();
            let n = jet.batch_size();
            let device = jet.value.device();
            jet.chain(
                Tensor::ones([n, 1], &device),
                Tensor::zeros([n, 1], &device),
                Tensor::zeros([n, 1], &device),
            )
        }
    }

    fn constants() -> PhysicalConstants {
        PhysicalConstants::new(0.1, 0.0, 12.566, 4.18).unwrap()
    }

    #[test]
    fn test_gauss_legendre_box_volume() {
        let device = Default::default();
        let report = gauss_legendre_integrals::<TestBackend, _>(
            &Inside,
            &constants(),
            &Domain::default(),
            4,
            &device,
        )
        .unwrap();

        assert!((report.volume - 216.0).abs() < 1e-3);
        assert!(report.area.abs() < 1e-6);
        assert!(report.bending_energy.abs() < 1e-6);
    }

    #[test]
    fn test_evenly_spaced_box_volume() {
        let device = Default::default();
        let report = evenly_spaced_integrals::<TestBackend, _>(
            &Inside,
            &constants(),
            &Domain::new(-1.0, 1.0).unwrap(),
            5,
            &device,
        )
        .unwrap();

        assert!((report.volume - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_order() {
        let device = Default::default();
        let result = gauss_legendre_integrals::<TestBackend, _>(
            &Inside,
            &constants(),
            &Domain::default(),
            0,
            &device,
        );
        assert!(matches!(result, Err(VesicleError::Core(_))));
    }
}
