//! # neural_vesicle
//!
//! Physics-informed phase-field training for Helfrich vesicles with Burn.
//!
//! A small network `φ: R³ → (−1, 1)` is trained so that its zero level set
//! is the equilibrium shape of a vesicle: the phase-field bending energy is
//! minimized while penalties hold the surface area, the enclosed volume and
//! the center of mass at their targets.
//!
//! ## Features
//!
//! - **Field network**: `PhaseFieldNet<B>`, 3→20→10→1 with sigmoid/sigmoid/tanh
//! - **Differential operator**: `φ`, `|∇φ|²` and `∇²φ` from second-order jets
//!   that stay inside the parameter autodiff graph
//! - **Loss**: Ginzburg–Landau densities, Monte-Carlo integrals and the
//!   penalty-constrained cost
//! - **Training**: AMSGrad, fail-fast on non-finite values, dual checkpoints
//! - **Collaborators**: PNG plots and Gauss–Legendre cross-checks
//!
//! ## Quick Start
//!
//! ```ignore
//! use neural_vesicle::prelude::*;
//! use burn::backend::{Autodiff, NdArray};
//! use vesicle_core::RegimeSelection;
//!
//! type MyBackend = Autodiff<NdArray>;
//!
//! let training = TrainingConfig::default().with_epochs(1000);
//! let run = RunConfig::new(4, RegimeSelection::for_run(4), training, ComputeDevice::Portable)?;
//! let device = Default::default();
//!
//! let mut trainer = VesicleTrainer::<MyBackend>::new(run, &device)?;
//! let summary = trainer.fit()?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! vesicle_core (pure math: domain, regimes, sampling, quadrature)
//!     │
//!     ▼
//! neural_vesicle
//!     nn ──► diff ──► loss ──► training ──► export
//!   (field)  (jets)  (cost)   (AMSGrad)   (plots, checks)
//! ```
//!
//! ## Feature Flags
//!
//! - `ndarray` (default): CPU backend
//! - `wgpu`: GPU backend for `--device accelerated`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod diff;
pub mod error;
pub mod export;
pub mod loss;
pub mod nn;
pub mod training;

// Re-export key types for convenience
pub use config::{ComputeDevice, FieldModelConfig, PenaltyConfig, RunConfig, TrainingConfig};
pub use diff::{DerivativeBundle, DifferentialOperator};
pub use error::{Result, VesicleError};
pub use loss::VesicleLoss;
pub use nn::{PhaseField, PhaseFieldNet};
pub use training::{train_regimes, VesicleTrainer};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{
        ComputeDevice, FieldModelConfig, OptimizerConfig, PenaltyConfig, RunConfig,
        TrainingConfig,
    };
    pub use crate::diff::{reverse_gradient, DerivativeBundle, DifferentialOperator};
    pub use crate::error::{Result, VesicleError};
    pub use crate::export::{
        evenly_spaced_integrals, gauss_legendre_integrals, render_field_plots, FieldGrid,
        IntegralReport,
    };
    pub use crate::loss::{
        bending_energy_density, surface_density, volume_density, ImportanceWeight, LossTerms,
        LossValues, MonteCarloIntegrator, VesicleLoss,
    };
    pub use crate::nn::{Jet, JetOrder, LayerShape, PhaseField, PhaseFieldNet};
    pub use crate::training::{
        checkpoint_exists, find_latest_checkpoint, load_checkpoint, save_checkpoints,
        train_regimes, CheckpointMetadata, EpochMetrics, RunSummary, TrainingMetrics,
        VesicleTrainer,
    };
}
