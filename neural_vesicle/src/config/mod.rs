//! Configuration types for neural_vesicle.
//!
//! Burn-style configuration structs for the field network, the penalty
//! weights and training, plus the immutable [`RunConfig`] bundle handed to
//! the trainer.

mod network;
mod run;
mod training;

pub use crate::training::OptimizerConfig;
pub use network::FieldModelConfig;
pub use run::{ComputeDevice, RunConfig};
pub use training::{PenaltyConfig, TrainingConfig};
