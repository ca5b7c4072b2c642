//! Physical regimes swept by a training campaign.
//!
//! A campaign trains one network per regime. Each regime is addressed by
//! indices into three parallel tables of target surface area, target volume
//! and interface width.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Number of entries in each regime table.
pub const REGIME_COUNT: usize = 19;

/// Parallel tables of area, volume and epsilon targets.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeTable {
    areas: Vec<f64>,
    volumes: Vec<f64>,
    epsilons: Vec<f64>,
}

impl Default for RegimeTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RegimeTable {
    /// The standard sweep, for `k = 0..19`:
    ///
    /// - `A_k = (1 + k/20) · 4π`
    /// - `V_k = (1 − k/20) · 4π/3`
    /// - `ε_k = (1 − k/20) · 0.25`
    pub fn standard() -> Self {
        let fraction = |k: usize| k as f64 / 20.0;
        Self {
            areas: (0..REGIME_COUNT)
                .map(|k| (1.0 + fraction(k)) * 4.0 * PI)
                .collect(),
            volumes: (0..REGIME_COUNT)
                .map(|k| (1.0 - fraction(k)) * 4.0 * PI / 3.0)
                .collect(),
            epsilons: (0..REGIME_COUNT)
                .map(|k| (1.0 - fraction(k)) * 0.25)
                .collect(),
        }
    }

    /// Number of regimes.
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Target area at `index`.
    pub fn area(&self, index: usize) -> Result<f64> {
        lookup(&self.areas, "area", index)
    }

    /// Target volume at `index`.
    pub fn volume(&self, index: usize) -> Result<f64> {
        lookup(&self.volumes, "volume", index)
    }

    /// Interface width at `index`.
    pub fn epsilon(&self, index: usize) -> Result<f64> {
        lookup(&self.epsilons, "epsilon", index)
    }
}

fn lookup(table: &[f64], name: &'static str, index: usize) -> Result<f64> {
    table
        .get(index)
        .copied()
        .ok_or(CoreError::RegimeIndexOutOfRange {
            table: name,
            index,
            len: table.len(),
        })
}

/// Which table entries a run trains against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeSelection {
    /// Index into the epsilon table.
    pub epsilon_index: usize,
    /// Index into the area table.
    pub area_index: usize,
    /// Index into the volume table.
    pub volume_index: usize,
    /// Spontaneous curvature.
    pub c0: f64,
}

impl RegimeSelection {
    /// Default epsilon index: the thinnest interface the campaign used.
    pub const DEFAULT_EPSILON_INDEX: usize = 17;
    /// Default area index: the area of the unit sphere.
    pub const DEFAULT_AREA_INDEX: usize = 0;

    /// Selection for a run index: the volume target follows the run index,
    /// area and epsilon stay at their campaign defaults.
    pub fn for_run(run_index: usize) -> Self {
        Self {
            epsilon_index: Self::DEFAULT_EPSILON_INDEX,
            area_index: Self::DEFAULT_AREA_INDEX,
            volume_index: run_index,
            c0: 0.0,
        }
    }

    /// Override the epsilon index.
    pub fn with_epsilon_index(mut self, index: usize) -> Self {
        self.epsilon_index = index;
        self
    }

    /// Override the area index.
    pub fn with_area_index(mut self, index: usize) -> Self {
        self.area_index = index;
        self
    }

    /// Override the spontaneous curvature.
    pub fn with_c0(mut self, c0: f64) -> Self {
        self.c0 = c0;
        self
    }
}

/// Material parameters and constraint targets of one training run.
///
/// Immutable for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Membrane thickness (interface width), strictly positive.
    pub epsilon: f64,
    /// Spontaneous curvature.
    pub c0: f64,
    /// Target surface area `A_0`.
    pub area_target: f64,
    /// Target enclosed volume `V_0`.
    pub volume_target: f64,
}

impl PhysicalConstants {
    /// Create validated constants.
    pub fn new(epsilon: f64, c0: f64, area_target: f64, volume_target: f64) -> Result<Self> {
        let constants = Self {
            epsilon,
            c0,
            area_target,
            volume_target,
        };
        constants.validate()?;
        Ok(constants)
    }

    /// Resolve a regime selection against a table.
    pub fn from_regime(table: &RegimeTable, selection: &RegimeSelection) -> Result<Self> {
        Self::new(
            table.epsilon(selection.epsilon_index)?,
            selection.c0,
            table.area(selection.area_index)?,
            table.volume(selection.volume_index)?,
        )
    }

    /// Check every constant is finite and that epsilon and the targets are positive.
    pub fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(invalid("epsilon", self.epsilon, "must be positive and finite"));
        }
        if !self.c0.is_finite() {
            return Err(invalid("c0", self.c0, "must be finite"));
        }
        if !self.area_target.is_finite() || self.area_target <= 0.0 {
            return Err(invalid("area_target", self.area_target, "must be positive and finite"));
        }
        if !self.volume_target.is_finite() || self.volume_target <= 0.0 {
            return Err(invalid(
                "volume_target",
                self.volume_target,
                "must be positive and finite",
            ));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, value: f64, reason: &'static str) -> CoreError {
    CoreError::InvalidConstant {
        name,
        value,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_values() {
        let table = RegimeTable::standard();
        assert_eq!(table.len(), REGIME_COUNT);

        assert!((table.area(0).unwrap() - 4.0 * PI).abs() < 1e-12);
        assert!((table.volume(0).unwrap() - 4.0 * PI / 3.0).abs() < 1e-12);
        assert!((table.epsilon(17).unwrap() - 0.0375).abs() < 1e-12);
        assert!((table.volume(10).unwrap() - 0.5 * 4.0 * PI / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_index() {
        let table = RegimeTable::standard();
        let err = table.volume(REGIME_COUNT).unwrap_err();
        assert!(matches!(
            err,
            CoreError::RegimeIndexOutOfRange { index: 19, .. }
        ));
    }

    #[test]
    fn test_run_selection_defaults() {
        let selection = RegimeSelection::for_run(5);
        assert_eq!(selection.epsilon_index, 17);
        assert_eq!(selection.area_index, 0);
        assert_eq!(selection.volume_index, 5);
        assert_eq!(selection.c0, 0.0);
    }

    #[test]
    fn test_rejects_non_positive_epsilon() {
        assert!(PhysicalConstants::new(0.0, 0.0, 1.0, 1.0).is_err());
        assert!(PhysicalConstants::new(-0.1, 0.0, 1.0, 1.0).is_err());
        assert!(PhysicalConstants::new(f64::NAN, 0.0, 1.0, 1.0).is_err());
        assert!(PhysicalConstants::new(0.1, 0.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn test_from_regime() {
        let table = RegimeTable::standard();
        let selection = RegimeSelection::for_run(2).with_c0(0.5);
        let constants = PhysicalConstants::from_regime(&table, &selection).unwrap();

        assert_eq!(constants.c0, 0.5);
        assert_eq!(constants.volume_target, table.volume(2).unwrap());
        assert_eq!(constants.area_target, table.area(0).unwrap());
    }
}
