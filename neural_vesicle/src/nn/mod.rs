//! Neural network modules for phase-field learning.
//!
//! This module provides:
//! - `PhaseFieldNet`: the 3→20→10→1 sigmoid/sigmoid/tanh field network
//! - `PhaseField`: the trait every differentiable field implements
//! - `Jet`: second-order spatial jets propagated through field ops

pub mod field;
pub mod jet;

pub use field::{LayerShape, PhaseField, PhaseFieldNet};
pub use jet::{Jet, JetOrder, SPATIAL_DIM};
