//! Phase-field sampling on a regular grid and the plots derived from it.

use std::path::{Path, PathBuf};

use burn::prelude::*;
use vesicle_core::{Domain, PointSet};

use super::host_values;
use super::plot::{color_map, plot_phase_profile, plot_points, plot_series, Labels, Scale};
use crate::error::Result;
use crate::nn::PhaseField;
use crate::training::TrainingMetrics;

/// Points evaluated per forward pass when probing.
const SAMPLE_CHUNK: usize = 32_768;

/// Field values on a `mesh_size³` grid, `x` slowest and `z` fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGrid {
    coords: Vec<f32>,
    values: Vec<f32>,
}

impl FieldGrid {
    /// Evaluate `field` on the evenly spaced grid of `domain`.
    pub fn sample<B: Backend, F: PhaseField<B>>(
        field: &F,
        domain: &Domain,
        mesh_size: usize,
        device: &B::Device,
    ) -> Result<Self> {
        let points = PointSet::evenly_spaced(domain, mesh_size)?;
        let mut values = Vec::with_capacity(points.len());

        for chunk in points.points().chunks(SAMPLE_CHUNK) {
            let flat: Vec<f32> = chunk.iter().flatten().copied().collect();
            let input = Tensor::<B, 2>::from_data(TensorData::new(flat, [chunk.len(), 3]), device);
            values.extend(host_values(field.evaluate(input).into_data(), "phi")?);
        }

        Ok(Self {
            coords: domain.linspace(mesh_size),
            values,
        })
    }

    /// Nodes per axis.
    pub fn mesh_size(&self) -> usize {
        self.coords.len()
    }

    /// Axis coordinates.
    pub fn coords(&self) -> &[f32] {
        &self.coords
    }

    /// φ at grid index `(i, j, k)`.
    pub fn value(&self, i: usize, j: usize, k: usize) -> f32 {
        let n = self.mesh_size();
        self.values[(i * n + j) * n + k]
    }

    /// φ along `axis` with the two other indices fixed at `at`.
    pub fn line(&self, axis: usize, at: usize) -> Vec<f32> {
        (0..self.mesh_size())
            .map(|t| match axis {
                0 => self.value(t, at, at),
                1 => self.value(at, t, at),
                _ => self.value(at, at, t),
            })
            .collect()
    }

    /// The `x`–`y` plane at `z` index `k`, rows along `y`.
    pub fn xy_slice(&self, k: usize) -> Vec<f32> {
        let n = self.mesh_size();
        (0..n)
            .flat_map(|j| (0..n).map(move |i| (i, j)))
            .map(|(i, j)| self.value(i, j, k))
            .collect()
    }

    /// Left, middle and right line indices.
    pub fn slice_indices(&self) -> [(&'static str, usize); 3] {
        let n = self.mesh_size();
        [("left", 0), ("middle", (n / 2).saturating_sub(1)), ("right", n - 1)]
    }
}

/// Run one plot, keeping its path on success and logging a failure.
fn attempt(written: &mut Vec<PathBuf>, path: PathBuf, plot: impl FnOnce(&Path) -> Result<()>) {
    match plot(&path) {
        Ok(()) => written.push(path),
        Err(e) => log::warn!("Skipping plot {}: {}", path.display(), e),
    }
}

/// Write the phase-profile plots and the mid-plane color map into `dir`.
///
/// Each plot is independent: a failed one is logged and the rest are still
/// written. Returns the paths that were written.
pub fn render_field_plots(grid: &FieldGrid, dir: &Path, label: &str) -> Vec<PathBuf> {
    let mut written = Vec::new();

    for (position, index) in grid.slice_indices() {
        for (axis, name) in ["x", "y", "z"].into_iter().enumerate() {
            let path = dir.join(format!("{label}_phase_field_{position}_{name}.png"));
            attempt(&mut written, path, |path| {
                plot_phase_profile(path, grid.coords(), &grid.line(axis, index), name, position)
            });
        }
    }

    let n = grid.mesh_size();
    let middle = (n / 2).saturating_sub(1);
    let title = format!("phase field at z = {:.2}", grid.coords()[middle]);
    let labels = Labels {
        title: &title,
        x: "x",
        y: "y",
    };
    let path = dir.join(format!("{label}_xy_colormap.png"));
    attempt(&mut written, path, |path| {
        color_map(path, grid.coords(), &grid.xy_slice(middle), labels)
    });

    written
}

/// Write the metric series and the training-point projection into `dir`.
///
/// Each plot is independent, as in [`render_field_plots`].
pub fn render_training_plots(
    metrics: &TrainingMetrics,
    points: &PointSet,
    domain: &Domain,
    dir: &Path,
    label: &str,
) -> Vec<PathBuf> {
    let series = [
        (
            "cost",
            metrics.costs(),
            Scale::Log,
            Labels {
                title: "Cost on the training data",
                x: "Epoch",
                y: "cost",
            },
        ),
        (
            "area_integral",
            metrics.areas(),
            Scale::Linear,
            Labels {
                title: "area_integral vs. epochs",
                x: "epoch",
                y: "area_integral",
            },
        ),
        (
            "volume_integral",
            metrics.volumes(),
            Scale::Linear,
            Labels {
                title: "volume_integral vs. epochs",
                x: "epoch",
                y: "volume_integral",
            },
        ),
        (
            "energy_integral",
            metrics.energies(),
            Scale::Linear,
            Labels {
                title: "normalized bending energy vs. epochs",
                x: "epoch",
                y: "W / 4pi",
            },
        ),
        (
            "reduced_volume",
            metrics.reduced_volumes(),
            Scale::Linear,
            Labels {
                title: "reduced volume vs. epochs",
                x: "epoch",
                y: "reduced volume",
            },
        ),
    ];

    let mut written = Vec::new();
    for (name, values, scale, labels) in series {
        let path = dir.join(format!("{label}_{name}.png"));
        attempt(&mut written, path, |path| {
            plot_series(path, &values, scale, labels)
        });
    }

    let title = format!("training points, {} samples", points.len());
    let path = dir.join(format!("{label}_integral_sampled_pts.png"));
    attempt(&mut written, path, |path| {
        plot_points(path, points.points(), (domain.r_min, domain.r_max), &title)
    });

    written
}
