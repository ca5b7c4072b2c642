//! Training infrastructure for the phase-field model.
//!
//! This module provides:
//! - `VesicleTrainer`: the epoch loop and end-of-run outputs
//! - `train_regimes`: single runs and continuation sweeps
//! - AMSGrad optimizer configuration and state
//! - Per-epoch metrics
//! - Checkpoint save/load

mod checkpoint;
mod metrics;
mod optimizer;
mod trainer;

pub use checkpoint::{
    checkpoint_exists, checkpoint_stem, find_latest_checkpoint, load_checkpoint, load_metadata,
    save_checkpoint, save_checkpoints, CheckpointMetadata,
};
pub use metrics::{EpochMetrics, TrainingMetrics};
pub use optimizer::{AmsGrad, AmsGradState, OptimizerConfig};
pub use trainer::{train_regimes, RunSummary, VesicleTrainer};
