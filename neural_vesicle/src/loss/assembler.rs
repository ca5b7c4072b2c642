//! Constrained Helfrich objective.

use burn::prelude::*;
use serde::{Deserialize, Serialize};
use vesicle_core::{reduced_volume, PhysicalConstants};

use super::density::{bending_energy_density, surface_density, volume_density};
use super::integrator::MonteCarloIntegrator;
use crate::config::PenaltyConfig;
use crate::diff::DerivativeBundle;
use crate::error::Result;
use crate::nn::SPATIAL_DIM;

/// Scalar tensors of one loss evaluation, all `[1]`.
///
/// `cost` is the differentiable objective; the integrals are exposed
/// alongside it because the cost is a weighted composite.
#[derive(Debug, Clone)]
pub struct LossTerms<B: Backend> {
    /// `W + λ_A(A − A₀)² + λ_V(V − V₀)² + λ_C|c|²`.
    pub cost: Tensor<B, 1>,
    /// Bending-energy integral `W`.
    pub bending_energy: Tensor<B, 1>,
    /// Surface-area integral `A`.
    pub area: Tensor<B, 1>,
    /// Volume integral `V`.
    pub volume: Tensor<B, 1>,
    /// Squared first moment of the volume density `|c|²`.
    pub center_mass_sq: Tensor<B, 1>,
}

impl<B: Backend> LossTerms<B> {
    /// Read the terms back to the host.
    pub fn values(&self) -> LossValues {
        LossValues {
            cost: scalar(&self.cost),
            bending_energy: scalar(&self.bending_energy),
            area: scalar(&self.area),
            volume: scalar(&self.volume),
            center_mass_sq: scalar(&self.center_mass_sq),
        }
    }
}

fn scalar<B: Backend>(t: &Tensor<B, 1>) -> f64 {
    t.clone().into_scalar().elem::<f64>()
}

/// Host copy of [`LossTerms`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossValues {
    /// Composite cost.
    pub cost: f64,
    /// Bending energy `W`.
    pub bending_energy: f64,
    /// Surface area `A`.
    pub area: f64,
    /// Volume `V`.
    pub volume: f64,
    /// Squared center-of-mass moment.
    pub center_mass_sq: f64,
}

impl LossValues {
    /// `V / [(4π/3)(A/4π)^1.5]`.
    pub fn reduced_volume(&self) -> f64 {
        reduced_volume(self.area, self.volume)
    }
}

/// Assembles the penalty-constrained cost from a derivative bundle.
#[derive(Debug, Clone)]
pub struct VesicleLoss {
    penalty: PenaltyConfig,
    integrator: MonteCarloIntegrator,
}

impl VesicleLoss {
    /// Create the loss with the given penalty weights and integrator.
    pub fn new(penalty: PenaltyConfig, integrator: MonteCarloIntegrator) -> Self {
        Self {
            penalty,
            integrator,
        }
    }

    /// Penalty weights.
    pub fn penalty(&self) -> &PenaltyConfig {
        &self.penalty
    }

    /// The integrator shared by every term.
    pub fn integrator(&self) -> &MonteCarloIntegrator {
        &self.integrator
    }

    /// The three functionals `W`, `A`, `V` without the penalties.
    pub fn integrals<B: Backend>(
        &self,
        bundle: &DerivativeBundle<B>,
        constants: &PhysicalConstants,
    ) -> Result<[Tensor<B, 1>; 3]> {
        let grad_mag_sq = bundle.require_grad_mag_sq()?;
        let laplacian = bundle.require_laplacian()?;
        let phi = bundle.phi.clone();

        let bending = bending_energy_density(
            phi.clone(),
            laplacian,
            constants.epsilon,
            constants.c0,
        );
        let surface = surface_density(phi.clone(), grad_mag_sq, constants.epsilon);
        let volume = volume_density(phi);

        Ok([
            self.integrator.integrate(bending),
            self.integrator.integrate(surface),
            self.integrator.integrate(volume),
        ])
    }

    /// Cost and integrals at `[N, 3]` points.
    ///
    /// `points` must be in the same row order as the bundle; they weight the
    /// volume density for the center-of-mass moment.
    pub fn forward<B: Backend>(
        &self,
        bundle: &DerivativeBundle<B>,
        points: Tensor<B, 2>,
        constants: &PhysicalConstants,
    ) -> Result<LossTerms<B>> {
        let [bending_energy, area, volume] = self.integrals(bundle, constants)?;
        let center_mass_sq = self.center_mass_sq(bundle.phi.clone(), points);

        let area_dev = area.clone().sub_scalar(constants.area_target);
        let volume_dev = volume.clone().sub_scalar(constants.volume_target);

        let cost = bending_energy.clone()
            + (area_dev.clone() * area_dev).mul_scalar(self.penalty.area_weight)
            + (volume_dev.clone() * volume_dev).mul_scalar(self.penalty.volume_weight)
            + center_mass_sq.clone().mul_scalar(self.penalty.center_weight);

        Ok(LossTerms {
            cost,
            bending_energy,
            area,
            volume,
            center_mass_sq,
        })
    }

    /// `Σ_k (∫ r_k·(1 + φ)/2 dV)²`
    fn center_mass_sq<B: Backend>(&self, phi: Tensor<B, 2>, points: Tensor<B, 2>) -> Tensor<B, 1> {
        let n = points.dims()[0];
        let density = volume_density(phi);
        (0..SPATIAL_DIM)
            .map(|k| {
                let r_k = points.clone().slice([0..n, k..k + 1]);
                let moment = self.integrator.integrate(density.clone() * r_k);
                moment.clone() * moment
            })
            .reduce(|acc, m| acc + m)
            .unwrap_or_else(|| Tensor::zeros([1], &density.device()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use vesicle_core::Domain;

    type TestBackend = NdArray;

    fn bundle(phi: Tensor<TestBackend, 2>) -> DerivativeBundle<TestBackend> {
        let zeros = phi.zeros_like();
        DerivativeBundle {
            phi,
            grad_mag_sq: Some(zeros.clone()),
            laplacian: Some(zeros),
        }
    }

    fn constants() -> PhysicalConstants {
        PhysicalConstants::new(0.25, 0.0, 1.0, 2.0).unwrap()
    }

    #[test]
    fn test_uniform_inside_phase() {
        // φ = 1 everywhere: no surface, no bending, V = cube volume
        let device = Default::default();
        let domain = Domain::new(-1.0, 1.0).unwrap();
        let loss = VesicleLoss::new(PenaltyConfig::default(), MonteCarloIntegrator::uniform(&domain));
        let points = Tensor::<TestBackend, 2>::from_floats(
            [[-0.5, -0.5, -0.5], [0.5, 0.5, 0.5]],
            &device,
        );
        let phi = Tensor::<TestBackend, 2>::ones([2, 1], &device);

        let values = loss.forward(&bundle(phi), points, &constants()).unwrap().values();

        assert!(values.bending_energy.abs() < 1e-9);
        assert!(values.area.abs() < 1e-9);
        assert!((values.volume - 8.0).abs() < 1e-6);
        // symmetric points cancel
        assert!(values.center_mass_sq.abs() < 1e-9);
        // 1000·(0 − 1)² + 1000·(8 − 2)²
        assert!((values.cost - 37000.0).abs() < 1e-2);
    }

    #[test]
    fn test_center_of_mass_penalty() {
        let device = Default::default();
        let loss = VesicleLoss::new(
            PenaltyConfig::new().with_area_weight(0.0).with_volume_weight(0.0),
            MonteCarloIntegrator::new(1.0),
        );
        let points = Tensor::<TestBackend, 2>::from_floats([[2.0, 0.0, 0.0]], &device);
        let phi = Tensor::<TestBackend, 2>::ones([1, 1], &device);

        let values = loss.forward(&bundle(phi), points, &constants()).unwrap().values();
        // moment_x = 2, so |c|² = 4 and the cost is 10·4
        assert!((values.center_mass_sq - 4.0).abs() < 1e-6);
        assert!((values.cost - 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_missing_derivatives_rejected() {
        let device = Default::default();
        let loss = VesicleLoss::new(PenaltyConfig::default(), MonteCarloIntegrator::new(1.0));
        let phi = Tensor::<TestBackend, 2>::zeros([3, 1], &device);
        let incomplete = DerivativeBundle {
            phi,
            grad_mag_sq: None,
            laplacian: None,
        };
        let points = Tensor::<TestBackend, 2>::zeros([3, 3], &device);
        assert!(loss.forward(&incomplete, points, &constants()).is_err());
    }

    #[test]
    fn test_reduced_volume_of_values() {
        let values = LossValues {
            cost: 0.0,
            bending_energy: 0.0,
            area: vesicle_core::SPHERE_AREA,
            volume: vesicle_core::SPHERE_VOLUME,
            center_mass_sq: 0.0,
        };
        assert!((values.reduced_volume() - 1.0).abs() < 1e-6);
    }
}
