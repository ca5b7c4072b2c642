//! # vesicle_core
//!
//! Pure mathematics shared by the phase-field vesicle trainer.
//!
//! This crate has no tensor backend. It owns everything about a training run
//! that can be stated in plain numbers:
//!
//! - **Domain geometry**: the cubic box `[r_min, r_max]³` and its volume
//! - **Regime tables**: the swept area, volume and interface-width targets
//! - **Physical constants**: validated `epsilon`, `c_0`, `A_0`, `V_0`
//! - **Point sets**: evenly spaced, grid-snapped random and uniform samples
//! - **Shape descriptors**: reduced volume and sphere-normalized energy
//! - **Quadrature**: Gauss–Legendre rules for deterministic cross-checks
//!
//! ## Usage
//!
//! ```
//! use vesicle_core::prelude::*;
//!
//! let domain = Domain::new(-3.0, 3.0).unwrap();
//! let points = PointSet::evenly_spaced(&domain, 4).unwrap();
//! assert_eq!(points.len(), 64);
//!
//! let constants = PhysicalConstants::from_regime(
//!     &RegimeTable::standard(),
//!     &RegimeSelection::for_run(3),
//! )
//! .unwrap();
//! assert!(constants.epsilon > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod error;
pub mod quadrature;
pub mod regime;
pub mod sampling;
pub mod shape;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::domain::{linspace, Domain};
    pub use crate::error::{CoreError, Result};
    pub use crate::quadrature::{GaussLegendre, TensorProductRule};
    pub use crate::regime::{PhysicalConstants, RegimeSelection, RegimeTable, REGIME_COUNT};
    pub use crate::sampling::{PointSet, SamplingStrategy};
    pub use crate::shape::{normalized_energy, reduced_volume, SPHERE_AREA, SPHERE_VOLUME};
}

pub use domain::{linspace, Domain};
pub use error::{CoreError, Result};
pub use quadrature::{GaussLegendre, TensorProductRule};
pub use regime::{PhysicalConstants, RegimeSelection, RegimeTable, REGIME_COUNT};
pub use sampling::{PointSet, SamplingStrategy};
pub use shape::{normalized_energy, reduced_volume, SPHERE_AREA, SPHERE_VOLUME};
