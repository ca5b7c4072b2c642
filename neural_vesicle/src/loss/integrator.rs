//! Monte-Carlo integration of pointwise densities.

use burn::prelude::*;
use vesicle_core::Domain;

/// Sampling density the points were drawn with.
#[derive(Debug, Clone)]
pub enum ImportanceWeight<B: Backend> {
    /// The same weight at every point.
    Constant(f64),
    /// One weight per point, `[N, 1]`.
    PerPoint(Tensor<B, 2>),
}

/// Estimates `∫ density dV` as `Σ(density/p) · P / N`, where `p` is the
/// importance weight and `P` its integral over the domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloIntegrator {
    weight_volume: f64,
}

impl MonteCarloIntegrator {
    /// Integrator for points drawn with a weight whose domain integral is
    /// `weight_volume`.
    pub fn new(weight_volume: f64) -> Self {
        Self { weight_volume }
    }

    /// Unit weight over a cube: `P` is the cube volume.
    pub fn uniform(domain: &Domain) -> Self {
        Self::new(domain.volume())
    }

    /// Integral of the importance weight over the domain.
    pub fn weight_volume(&self) -> f64 {
        self.weight_volume
    }

    /// Integrate `[N, 1]` density values sampled with unit weight.
    pub fn integrate<B: Backend>(&self, density: Tensor<B, 2>) -> Tensor<B, 1> {
        self.integrate_weighted(density, ImportanceWeight::Constant(1.0))
    }

    /// Integrate `[N, 1]` density values sampled with the given weight.
    pub fn integrate_weighted<B: Backend>(
        &self,
        density: Tensor<B, 2>,
        weight: ImportanceWeight<B>,
    ) -> Tensor<B, 1> {
        let n = density.dims()[0] as f64;
        let weighted = match weight {
            ImportanceWeight::Constant(p) => density.div_scalar(p),
            ImportanceWeight::PerPoint(p) => density / p,
        };
        weighted
            .sum()
            .mul_scalar(self.weight_volume)
            .div_scalar(n)
    }
}
