//! Phase-field densities of the Helfrich functional.
//!
//! Ginzburg–Landau approximations to the Willmore bending energy, the
//! surface area and the enclosed volume. `epsilon` sets the interface width
//! and must be positive; as it shrinks the densities approach the
//! sharp-interface functionals.

use std::f64::consts::SQRT_2;

use burn::prelude::*;

/// `1 − φ²`
fn one_minus_sq<B: Backend>(phi: Tensor<B, 2>) -> Tensor<B, 2> {
    (phi.clone() * phi).neg().add_scalar(1.0)
}

/// `3/(8√2·ε) · [ε·∇²φ + (φ/ε + c₀√2)(1 − φ²)]²`
pub fn bending_energy_density<B: Backend>(
    phi: Tensor<B, 2>,
    laplacian: Tensor<B, 2>,
    epsilon: f64,
    c0: f64,
) -> Tensor<B, 2> {
    let prefactor = 3.0 / (8.0 * SQRT_2 * epsilon);
    let chemical = phi.clone().div_scalar(epsilon).add_scalar(c0 * SQRT_2) * one_minus_sq(phi);
    let bracket = laplacian.mul_scalar(epsilon) + chemical;
    (bracket.clone() * bracket).mul_scalar(prefactor)
}

/// `3/(4√2) · [ε·|∇φ|² + (1/(2ε))·(1 − φ²)²]`
pub fn surface_density<B: Backend>(
    phi: Tensor<B, 2>,
    grad_mag_sq: Tensor<B, 2>,
    epsilon: f64,
) -> Tensor<B, 2> {
    let prefactor = 3.0 / (4.0 * SQRT_2);
    let well = one_minus_sq(phi);
    let bulk = (well.clone() * well).mul_scalar(1.0 / (2.0 * epsilon));
    (grad_mag_sq.mul_scalar(epsilon) + bulk).mul_scalar(prefactor)
}

/// `(1 + φ)/2`
pub fn volume_density<B: Backend>(phi: Tensor<B, 2>) -> Tensor<B, 2> {
    phi.add_scalar(1.0).mul_scalar(0.5)
}
