//! Phase-field trainer implementation.

use std::path::{Path, PathBuf};

use burn::module::AutodiffModule;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use rand::rngs::StdRng;
use rand::SeedableRng;
use vesicle_core::{Domain, PointSet};

use crate::config::RunConfig;
use crate::diff::DifferentialOperator;
use crate::error::{Result, VesicleError};
use crate::export::{
    evenly_spaced_integrals, render_field_plots, render_training_plots, FieldGrid, IntegralReport,
};
use crate::loss::{MonteCarloIntegrator, VesicleLoss};
use crate::nn::PhaseFieldNet;

use super::checkpoint::{load_checkpoint, save_checkpoints, CheckpointMetadata};
use super::metrics::{EpochMetrics, TrainingMetrics};
use super::optimizer::AmsGrad;

/// Label used in the names of the end-of-run plots.
const PLOT_LABEL: &str = "final";

/// Outcome of one completed regime.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Run index of the regime.
    pub run_index: usize,
    /// Completed epochs.
    pub epochs: usize,
    /// Stem paths of the written checkpoints.
    pub checkpoints: Vec<PathBuf>,
    /// Metrics of the last epoch, if any epoch ran.
    pub last: Option<EpochMetrics>,
}

/// Trains a [`PhaseFieldNet`] against the constrained Helfrich cost.
///
/// Owns the model, the optimizer state and the point set. Each epoch
/// shuffles the points, evaluates the field with first and second spatial
/// derivatives, assembles the cost and applies one optimizer step.
pub struct VesicleTrainer<B: AutodiffBackend> {
    model: PhaseFieldNet<B>,
    optimizer: OptimizerAdaptor<AmsGrad, PhaseFieldNet<B>, B>,
    run: RunConfig,
    loss: VesicleLoss,
    operator: DifferentialOperator,
    domain: Domain,
    points: PointSet,
    rng: StdRng,
    metrics: TrainingMetrics,
    device: B::Device,
}

impl<B: AutodiffBackend> VesicleTrainer<B> {
    /// Create a trainer with a freshly initialized model.
    ///
    /// The backend and the shuffle RNG are both seeded from the training
    /// configuration.
    pub fn new(run: RunConfig, device: &B::Device) -> Result<Self> {
        let training = run.training();
        B::seed(training.seed);

        let model = PhaseFieldNet::new(&training.model, device);
        let optimizer = training.optimizer.init::<B, PhaseFieldNet<B>>();
        let mut rng = StdRng::seed_from_u64(training.seed);

        let domain = training.domain()?;
        let points =
            PointSet::generate(&domain, training.sampling, training.mesh_size, &mut rng)?;
        let loss = VesicleLoss::new(
            training.penalty.clone(),
            MonteCarloIntegrator::uniform(&domain),
        );

        log::info!(
            "Created trainer for run {} on {} points ({} parameters, {} device)",
            run.run_index(),
            points.len(),
            training.model.num_params(),
            run.device().tag(),
        );

        Ok(Self {
            model,
            optimizer,
            run,
            loss,
            operator: DifferentialOperator::new(),
            domain,
            points,
            rng,
            metrics: TrainingMetrics::new(),
            device: device.clone(),
        })
    }

    /// Replace the model with a checkpoint. The optimizer state restarts.
    pub fn resume(&mut self, path: &Path) -> Result<CheckpointMetadata> {
        let (model, metadata) =
            load_checkpoint::<B>(path, &self.run.training().model, &self.device)?;
        self.model = model;
        self.optimizer = self.run.training().optimizer.init::<B, PhaseFieldNet<B>>();
        log::info!(
            "Resuming from run {} after {} epochs",
            metadata.run_index,
            metadata.epoch
        );
        Ok(metadata)
    }

    /// Switch to another regime, keeping the model, the optimizer state and
    /// the point set. Metrics start over.
    pub fn set_regime(&mut self, run: RunConfig) -> Result<()> {
        if run.training().model.layer_dims() != self.run.training().model.layer_dims() {
            return Err(VesicleError::config(
                "cannot change the architecture between regimes",
            ));
        }
        self.loss = VesicleLoss::new(run.training().penalty.clone(), *self.loss.integrator());
        self.run = run;
        self.metrics = TrainingMetrics::new();
        Ok(())
    }

    /// The current model.
    pub fn model(&self) -> &PhaseFieldNet<B> {
        &self.model
    }

    /// The run configuration.
    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    /// The training points in their current order.
    pub fn points(&self) -> &PointSet {
        &self.points
    }

    /// Metrics recorded in the current regime.
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Run one epoch.
    ///
    /// A non-finite cost aborts before the backward pass; non-finite
    /// gradients surface as non-finite parameters after the step.
    pub fn train_step(&mut self, epoch: usize) -> Result<EpochMetrics> {
        self.points.shuffle(&mut self.rng);
        let input = Tensor::<B, 2>::from_data(
            TensorData::new(self.points.to_flat(), [self.points.len(), 3]),
            &self.device,
        );

        let bundle = self.operator.derive(&self.model, input.clone(), true, true)?;
        let terms = self.loss.forward(&bundle, input, self.run.constants())?;
        let values = terms.values();

        if !values.cost.is_finite() {
            return Err(VesicleError::NumericInstability {
                epoch,
                quantity: "cost".to_string(),
                value: values.cost,
            });
        }

        let grads = terms.cost.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        let lr = self.run.training().optimizer.learning_rate;
        self.model = self.optimizer.step(lr, self.model.clone(), grads);

        if !self.model.is_finite() {
            return Err(VesicleError::NumericInstability {
                epoch,
                quantity: "parameters".to_string(),
                value: f64::NAN,
            });
        }

        let metrics = EpochMetrics::from_values(epoch, &values);
        self.metrics.push(metrics);
        log::debug!(
            "epoch {} cost={:.6e} bending={:.6} center={:.3e}",
            epoch,
            values.cost,
            values.bending_energy,
            values.center_mass_sq
        );
        Ok(metrics)
    }

    /// Train the current regime for the configured number of epochs, then
    /// write checkpoints, metrics and plots.
    ///
    /// Errors abort before anything is written. Plot failures are logged
    /// and skipped.
    pub fn fit(&mut self) -> Result<RunSummary> {
        let epochs = self.run.training().epochs;
        let log_interval = self.run.training().log_interval;
        let prefix = format!("[run {}]", self.run.run_index());
        let constants = self.run.constants();

        log::info!(
            "{} training {} epochs: epsilon={} c0={} A0={:.6} V0={:.6}",
            prefix,
            epochs,
            constants.epsilon,
            constants.c0,
            constants.area_target,
            constants.volume_target,
        );

        for epoch in 0..epochs {
            let metrics = self.train_step(epoch)?;
            if epoch % log_interval == 0 || epoch + 1 == epochs {
                metrics.log(&prefix);
            }
        }

        let checkpoints = self.save(epochs)?;
        if self.run.training().plots {
            self.render_plots(&prefix);
        }

        Ok(RunSummary {
            run_index: self.run.run_index(),
            epochs,
            checkpoints,
            last: self.metrics.last().copied(),
        })
    }

    /// Write both checkpoint variants and `metrics.json`.
    fn save(&self, epochs: usize) -> Result<Vec<PathBuf>> {
        let dir = self.run.checkpoint_dir();
        let metadata = CheckpointMetadata::new(
            &self.model,
            epochs,
            self.run.run_index(),
            self.run.device(),
            *self.run.constants(),
        );
        let paths = save_checkpoints(&dir, &self.model, &metadata)?;
        self.metrics.save_json(&dir.join("metrics.json"))?;
        Ok(paths)
    }

    /// Write the end-of-run plots. Failures are logged per plot.
    fn render_plots(&self, prefix: &str) -> Vec<PathBuf> {
        let dir = self.run.plot_dir();
        let mut written = Vec::new();
        if !self.metrics.is_empty() {
            written.extend(render_training_plots(
                &self.metrics,
                &self.points,
                &self.domain,
                &dir,
                PLOT_LABEL,
            ));
        }

        let inner = self.model.valid();
        match FieldGrid::sample::<B::InnerBackend, _>(
            &inner,
            &self.domain,
            self.run.training().test_mesh_size,
            &self.device,
        ) {
            Ok(grid) => written.extend(render_field_plots(&grid, &dir, PLOT_LABEL)),
            Err(e) => log::warn!("{} skipping field plots: {}", prefix, e),
        }

        log::info!("{} wrote {} plots to {:?}", prefix, written.len(), dir);
        written
    }

    /// Integrals of the current model on a fresh evenly spaced grid.
    pub fn evenly_spaced_integration(&self, mesh_size: usize) -> Result<IntegralReport> {
        let inner = self.model.valid();
        evenly_spaced_integrals::<B::InnerBackend, _>(
            &inner,
            self.run.constants(),
            &self.domain,
            mesh_size,
            &self.device,
        )
    }
}

/// Train one regime, or with `continuation` every regime `1..=index` in
/// sequence with a shared model and optimizer state.
///
/// An index of 0 has no regimes to continue through and trains run 0 alone.
pub fn train_regimes<B: AutodiffBackend>(
    run: RunConfig,
    device: &B::Device,
    resume: Option<&Path>,
    continuation: bool,
) -> Result<Vec<RunSummary>> {
    let last = run.run_index();
    let first = if continuation && last > 0 { 1 } else { last };

    let mut trainer = VesicleTrainer::<B>::new(run.for_regime(first)?, device)?;
    if let Some(path) = resume {
        trainer.resume(path)?;
    }

    let mut summaries = Vec::with_capacity(last + 1 - first);
    for index in first..=last {
        if index != first {
            trainer.set_regime(run.for_regime(index)?)?;
        }
        summaries.push(trainer.fit()?);
    }
    Ok(summaries)
}
