//! Physics objective for phase-field training.
//!
//! - Densities: pointwise bending-energy, surface and volume densities
//! - Integrator: Monte-Carlo estimates of their domain integrals
//! - Assembler: the penalty-constrained cost with its intermediate integrals

mod assembler;
mod density;
mod integrator;

pub use assembler::{LossTerms, LossValues, VesicleLoss};
pub use density::{bending_energy_density, surface_density, volume_density};
pub use integrator::{ImportanceWeight, MonteCarloIntegrator};
