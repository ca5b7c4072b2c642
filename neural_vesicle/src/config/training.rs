//! Training configuration types.

use burn::config::Config;
use vesicle_core::{Domain, SamplingStrategy};

use super::FieldModelConfig;
use crate::training::OptimizerConfig;

/// Penalty weights of the constrained objective.
///
/// `cost = W + λ_A·(A − A_0)² + λ_V·(V − V_0)² + λ_C·|c|²`
#[derive(Config, Debug)]
pub struct PenaltyConfig {
    /// Weight λ_A of the squared surface-area deviation.
    #[config(default = 1000.0)]
    pub area_weight: f64,

    /// Weight λ_V of the squared volume deviation.
    #[config(default = 1000.0)]
    pub volume_weight: f64,

    /// Weight λ_C of the squared center-of-mass moment.
    #[config(default = 10.0)]
    pub center_weight: f64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PenaltyConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("area_weight", self.area_weight),
            ("volume_weight", self.volume_weight),
            ("center_weight", self.center_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be finite and non-negative, got {value}"));
            }
        }
        Ok(())
    }
}

/// Configuration for the phase-field trainer.
#[derive(Config, Debug)]
pub struct TrainingConfig {
    /// Network configuration.
    pub model: FieldModelConfig,

    /// Penalty weights.
    pub penalty: PenaltyConfig,

    /// Optimizer configuration.
    pub optimizer: OptimizerConfig,

    /// Number of epochs per regime.
    #[config(default = 80001)]
    pub epochs: usize,

    /// Grid nodes per axis for the training points.
    #[config(default = 134)]
    pub mesh_size: usize,

    /// Lower coordinate bound.
    #[config(default = "-3.0")]
    pub r_min: f32,

    /// Upper coordinate bound.
    #[config(default = 3.0)]
    pub r_max: f32,

    /// How the training points are placed.
    #[config(default = "SamplingStrategy::Grid")]
    pub sampling: SamplingStrategy,

    /// Seed for the backend initializer and the shuffle RNG.
    #[config(default = 42)]
    pub seed: u64,

    /// Epochs between progress log lines.
    #[config(default = 1000)]
    pub log_interval: usize,

    /// Whether to render plots at the end of a regime.
    #[config(default = true)]
    pub plots: bool,

    /// Grid nodes per axis for the post-training phase-field plots.
    #[config(default = 80)]
    pub test_mesh_size: usize,

    /// Root directory for the `plots_*` and `saved_model_*` directories.
    #[config(default = "String::from(\".\")")]
    pub output_dir: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::new(
            FieldModelConfig::default(),
            PenaltyConfig::default(),
            OptimizerConfig::default(),
        )
    }
}

impl TrainingConfig {
    /// The training domain.
    pub fn domain(&self) -> vesicle_core::Result<Domain> {
        Domain::new(self.r_min, self.r_max)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.model.validate()?;
        self.penalty.validate()?;
        self.optimizer.validate()?;
        self.domain().map_err(|e| e.to_string())?;

        if self.mesh_size < 2 {
            return Err("mesh_size must be at least 2".to_string());
        }
        if let SamplingStrategy::Uniform { count: 0 } = self.sampling {
            return Err("uniform sampling needs at least one point".to_string());
        }
        if self.log_interval == 0 {
            return Err("log_interval must be positive".to_string());
        }
        if self.test_mesh_size < 2 {
            return Err("test_mesh_size must be at least 2".to_string());
        }

        Ok(())
    }
}
