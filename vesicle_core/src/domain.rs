//! The cubic simulation box.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Axis-aligned cube `[r_min, r_max]³` in which the phase field is trained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Lower coordinate bound on every axis.
    pub r_min: f32,
    /// Upper coordinate bound on every axis.
    pub r_max: f32,
}

impl Default for Domain {
    fn default() -> Self {
        Self {
            r_min: -3.0,
            r_max: 3.0,
        }
    }
}

impl Domain {
    /// Create a domain, rejecting empty or non-finite bounds.
    pub fn new(r_min: f32, r_max: f32) -> Result<Self> {
        if !r_min.is_finite() || !r_max.is_finite() || r_min >= r_max {
            return Err(CoreError::InvalidDomain { r_min, r_max });
        }
        Ok(Self { r_min, r_max })
    }

    /// Edge length of the cube.
    pub fn side(&self) -> f64 {
        (self.r_max - self.r_min) as f64
    }

    /// Volume of the cube, `(r_max - r_min)³`.
    ///
    /// This is the integrated weight of the uniform sampling density and
    /// therefore the Monte-Carlo scale factor for uniformly placed points.
    pub fn volume(&self) -> f64 {
        self.side().powi(3)
    }

    /// Whether a point lies inside the closed cube.
    pub fn contains(&self, point: [f32; 3]) -> bool {
        point
            .iter()
            .all(|&c| c >= self.r_min && c <= self.r_max)
    }

    /// Evenly spaced coordinates along one axis, endpoints included.
    pub fn linspace(&self, steps: usize) -> Vec<f32> {
        linspace(self.r_min, self.r_max, steps)
    }
}

/// `steps` evenly spaced values from `start` to `end` inclusive.
///
/// The first half is stepped forward from `start` and the second half
/// backward from `end`, so both endpoints are hit exactly and no value
/// leaves `[start, end]` through rounding.
pub fn linspace(start: f32, end: f32, steps: usize) -> Vec<f32> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (steps - 1) as f32;
            let half = steps / 2;
            (0..steps)
                .map(|i| {
                    if i < half {
                        start + i as f32 * step
                    } else {
                        end - (steps - 1 - i) as f32 * step
                    }
                })
                .collect()
        }
    }
}
