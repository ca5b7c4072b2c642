//! Dimensionless shape descriptors.

use std::f64::consts::PI;

/// Surface area of the unit sphere, `4π`.
pub const SPHERE_AREA: f64 = 4.0 * PI;

/// Volume of the unit sphere, `4π/3`.
pub const SPHERE_VOLUME: f64 = 4.0 * PI / 3.0;

/// Reduced volume `V / [(4π/3)·(A/4π)^1.5]`.
///
/// Ratio of the enclosed volume to the volume of a sphere with the same
/// surface area; exactly 1 for a sphere and below 1 for any other shape.
pub fn reduced_volume(area: f64, volume: f64) -> f64 {
    volume / (SPHERE_VOLUME * (area / SPHERE_AREA).powf(1.5))
}

/// Bending energy divided by the `4π` solid angle of a sphere.
pub fn normalized_energy(bending_energy: f64) -> f64 {
    bending_energy / SPHERE_AREA
}
