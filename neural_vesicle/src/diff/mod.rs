//! Spatial derivatives of phase fields.
//!
//! The rest of the crate only sees [`DifferentialOperator`] and the
//! [`DerivativeBundle`] it returns; jets and autodiff details stay behind it.

mod operator;

pub use operator::{reverse_gradient, DerivativeBundle, DifferentialOperator};
