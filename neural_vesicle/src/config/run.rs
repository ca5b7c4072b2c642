//! Immutable per-run configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use vesicle_core::{PhysicalConstants, RegimeSelection, RegimeTable, REGIME_COUNT};

use super::TrainingConfig;
use crate::error::{Result, VesicleError};

/// Compute device the field model is trained on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComputeDevice {
    /// CPU backend, always available.
    #[default]
    Portable,
    /// GPU backend, requires the `wgpu` feature.
    Accelerated,
}

impl ComputeDevice {
    /// Short tag used in checkpoint names.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Portable => "cpu",
            Self::Accelerated => "gpu",
        }
    }

    /// Both variants, accelerated first.
    pub fn all() -> [Self; 2] {
        [Self::Accelerated, Self::Portable]
    }
}

/// Everything one training run needs, fixed at construction.
#[derive(Debug, Clone)]
pub struct RunConfig {
    run_index: usize,
    selection: RegimeSelection,
    constants: PhysicalConstants,
    training: TrainingConfig,
    device: ComputeDevice,
}

impl RunConfig {
    /// Resolve a regime selection against the standard tables.
    ///
    /// Fails if the run index is outside the regime tables, if any
    /// selected constant is invalid, or if the training configuration
    /// does not validate.
    pub fn new(
        run_index: usize,
        selection: RegimeSelection,
        training: TrainingConfig,
        device: ComputeDevice,
    ) -> Result<Self> {
        if run_index >= REGIME_COUNT {
            return Err(VesicleError::config(format!(
                "run index {run_index} out of range, expected 0..{REGIME_COUNT}"
            )));
        }
        let constants = PhysicalConstants::from_regime(&RegimeTable::standard(), &selection)?;
        Self::from_constants(run_index, selection, constants, training, device)
    }

    /// Build a run from explicit constants.
    pub fn from_constants(
        run_index: usize,
        selection: RegimeSelection,
        constants: PhysicalConstants,
        training: TrainingConfig,
        device: ComputeDevice,
    ) -> Result<Self> {
        constants.validate()?;
        training.validate().map_err(VesicleError::config)?;
        Ok(Self {
            run_index,
            selection,
            constants,
            training,
            device,
        })
    }

    /// The run for another volume regime with the same overrides.
    pub fn for_regime(&self, run_index: usize) -> Result<Self> {
        let selection = RegimeSelection {
            volume_index: run_index,
            ..self.selection
        };
        Self::new(run_index, selection, self.training.clone(), self.device)
    }

    /// Run identifier used in directory names.
    pub fn run_index(&self) -> usize {
        self.run_index
    }

    /// Selected table indices.
    pub fn selection(&self) -> &RegimeSelection {
        &self.selection
    }

    /// Physical constants of this run.
    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    /// Training hyperparameters.
    pub fn training(&self) -> &TrainingConfig {
        &self.training
    }

    /// Compute device strategy.
    pub fn device(&self) -> ComputeDevice {
        self.device
    }

    /// `<output_dir>/plots_<run>`.
    pub fn plot_dir(&self) -> PathBuf {
        PathBuf::from(&self.training.output_dir).join(format!("plots_{}", self.run_index))
    }

    /// `<output_dir>/saved_model_<run>`.
    pub fn checkpoint_dir(&self) -> PathBuf {
        PathBuf::from(&self.training.output_dir).join(format!("saved_model_{}", self.run_index))
    }
}
