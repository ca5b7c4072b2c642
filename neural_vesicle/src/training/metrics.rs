//! Per-epoch training metrics.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vesicle_core::normalized_energy;

use crate::error::{Result, VesicleError};
use crate::loss::LossValues;

/// Metrics recorded after one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Epoch index, starting at 0.
    pub epoch: usize,
    /// Composite cost.
    pub cost: f64,
    /// Surface-area integral.
    pub area: f64,
    /// Volume integral.
    pub volume: f64,
    /// Bending energy divided by `4π`.
    pub normalized_energy: f64,
    /// Reduced volume.
    pub reduced_volume: f64,
}

impl EpochMetrics {
    /// Derive the recorded metrics from the loss values of an epoch.
    pub fn from_values(epoch: usize, values: &LossValues) -> Self {
        Self {
            epoch,
            cost: values.cost,
            area: values.area,
            volume: values.volume,
            normalized_energy: normalized_energy(values.bending_energy),
            reduced_volume: values.reduced_volume(),
        }
    }

    /// Log metrics at info level.
    pub fn log(&self, prefix: &str) {
        log::info!(
            "{} epoch={} cost={:.6e} area={:.6} volume={:.6} energy={:.6} reduced_volume={:.6}",
            prefix,
            self.epoch,
            self.cost,
            self.area,
            self.volume,
            self.normalized_energy,
            self.reduced_volume,
        );
    }
}

/// Append-only history of epoch metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    epochs: Vec<EpochMetrics>,
}

impl TrainingMetrics {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one epoch.
    pub fn push(&mut self, metrics: EpochMetrics) {
        self.epochs.push(metrics);
    }

    /// Recorded epochs in order.
    pub fn epochs(&self) -> &[EpochMetrics] {
        &self.epochs
    }

    /// Number of recorded epochs.
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// The most recent epoch.
    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }

    /// `(epoch, value)` pairs of one metric.
    pub fn series<F: Fn(&EpochMetrics) -> f64>(&self, select: F) -> Vec<(usize, f64)> {
        self.epochs.iter().map(|m| (m.epoch, select(m))).collect()
    }

    /// Cost series.
    pub fn costs(&self) -> Vec<(usize, f64)> {
        self.series(|m| m.cost)
    }

    /// Area series.
    pub fn areas(&self) -> Vec<(usize, f64)> {
        self.series(|m| m.area)
    }

    /// Volume series.
    pub fn volumes(&self) -> Vec<(usize, f64)> {
        self.series(|m| m.volume)
    }

    /// Normalized bending energy series.
    pub fn energies(&self) -> Vec<(usize, f64)> {
        self.series(|m| m.normalized_energy)
    }

    /// Reduced volume series.
    pub fn reduced_volumes(&self) -> Vec<(usize, f64)> {
        self.series(|m| m.reduced_volume)
    }

    /// Write the history as JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| VesicleError::io(parent, e))?;
        }
        let json = serde_json::to_string(self)?;
        fs::write(path, json).map_err(|e| VesicleError::io(path, e))
    }

    /// Read a history written by [`TrainingMetrics::save_json`].
    pub fn load_json(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| VesicleError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}
