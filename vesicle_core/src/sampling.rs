//! Spatial point sets on which the phase field is evaluated.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::error::{CoreError, Result};

/// How the training points are placed in the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingStrategy {
    /// Evenly spaced `mesh_size³` grid, x slowest and z fastest.
    Grid,
    /// `mesh_size³` points whose coordinates are drawn from the grid values.
    RandomGrid,
    /// `count` points uniform in the cube.
    Uniform {
        /// Number of points.
        count: usize,
    },
}

/// Ordered set of points in the domain, stored row-major as `[x, y, z]`.
///
/// The order changes between epochs; membership never does.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    points: Vec<[f32; 3]>,
}

impl PointSet {
    /// Wrap existing points.
    pub fn from_points(points: Vec<[f32; 3]>) -> Self {
        Self { points }
    }

    /// Generate points with the given strategy.
    pub fn generate<R: Rng + ?Sized>(
        domain: &Domain,
        strategy: SamplingStrategy,
        mesh_size: usize,
        rng: &mut R,
    ) -> Result<Self> {
        match strategy {
            SamplingStrategy::Grid => Self::evenly_spaced(domain, mesh_size),
            SamplingStrategy::RandomGrid => Self::random_grid(domain, mesh_size, rng),
            SamplingStrategy::Uniform { count } => Self::uniform(domain, count, rng),
        }
    }

    /// Evenly spaced grid with `mesh_size` nodes per axis.
    ///
    /// For a mesh size of 4 on `[-2, 2]` the first rows are
    /// `(-2, -2, -2)`, `(-2, -2, -0.667)`, `(-2, -2, 0.667)`, `(-2, -2, 2)`,
    /// `(-2, -0.667, -2)`, and so on.
    pub fn evenly_spaced(domain: &Domain, mesh_size: usize) -> Result<Self> {
        if mesh_size < 2 {
            return Err(CoreError::InvalidMeshSize(mesh_size));
        }
        let axis = domain.linspace(mesh_size);
        let mut points = Vec::with_capacity(mesh_size.pow(3));
        for &x in &axis {
            for &y in &axis {
                for &z in &axis {
                    points.push([x, y, z]);
                }
            }
        }
        Ok(Self { points })
    }

    /// `mesh_size³` points with every coordinate drawn from the grid values.
    pub fn random_grid<R: Rng + ?Sized>(
        domain: &Domain,
        mesh_size: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if mesh_size < 2 {
            return Err(CoreError::InvalidMeshSize(mesh_size));
        }
        let axis = domain.linspace(mesh_size);
        let points = (0..mesh_size.pow(3))
            .map(|_| {
                [
                    axis[rng.gen_range(0..mesh_size)],
                    axis[rng.gen_range(0..mesh_size)],
                    axis[rng.gen_range(0..mesh_size)],
                ]
            })
            .collect();
        Ok(Self { points })
    }

    /// `count` points uniform in the closed cube.
    pub fn uniform<R: Rng + ?Sized>(domain: &Domain, count: usize, rng: &mut R) -> Result<Self> {
        if count == 0 {
            return Err(CoreError::EmptyPointSet);
        }
        let (lo, hi) = (domain.r_min, domain.r_max);
        let points = (0..count)
            .map(|_| {
                [
                    rng.gen_range(lo..=hi),
                    rng.gen_range(lo..=hi),
                    rng.gen_range(lo..=hi),
                ]
            })
            .collect();
        Ok(Self { points })
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Borrow the points.
    pub fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    /// Permute the rows in place.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.points.shuffle(rng);
    }

    /// Flatten to `[x0, y0, z0, x1, ...]` for tensor upload.
    pub fn to_flat(&self) -> Vec<f32> {
        self.points.iter().flatten().copied().collect()
    }

    /// Whether every point lies in the domain.
    pub fn within(&self, domain: &Domain) -> bool {
        self.points.iter().all(|&p| domain.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_grid_ordering() {
        let domain = Domain::new(-2.0, 2.0).unwrap();
        let set = PointSet::evenly_spaced(&domain, 4).unwrap();
        let points = set.points();

        assert_eq!(points.len(), 64);
        assert_eq!(points[0], [-2.0, -2.0, -2.0]);
        assert_eq!(points[3], [-2.0, -2.0, 2.0]);
        assert_eq!(points[4][1], points[5][1]);
        assert_eq!(points[63], [2.0, 2.0, 2.0]);
        // x changes only every mesh_size² rows
        assert_eq!(points[15][0], -2.0);
        assert!(points[16][0] > -2.0);
    }

    #[test]
    fn test_grid_rejects_small_mesh() {
        let domain = Domain::default();
        assert_eq!(
            PointSet::evenly_spaced(&domain, 1),
            Err(CoreError::InvalidMeshSize(1))
        );
    }

    #[test]
    fn test_random_grid_uses_grid_values() {
        let domain = Domain::default();
        let mut rng = StdRng::seed_from_u64(7);
        let set = PointSet::random_grid(&domain, 5, &mut rng).unwrap();
        let axis = domain.linspace(5);

        assert_eq!(set.len(), 125);
        for p in set.points() {
            for c in p {
                assert!(axis.contains(c));
            }
        }
    }

    #[test]
    fn test_uniform_within_domain() {
        let domain = Domain::new(-1.5, 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let set = PointSet::uniform(&domain, 500, &mut rng).unwrap();
        assert_eq!(set.len(), 500);
        assert!(set.within(&domain));
    }

    #[test]
    fn test_flat_layout() {
        let set = PointSet::from_points(vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(set.to_flat(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
