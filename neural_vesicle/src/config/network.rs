//! Field network configuration.

use burn::config::Config;

/// Configuration for the phase-field network.
///
/// Three affine layers `input → hidden_0 → hidden_1 → output` with sigmoid,
/// sigmoid and tanh activations. The defaults give the 3→20→10→1 network the
/// training campaign uses.
#[derive(Config, Debug)]
pub struct FieldModelConfig {
    /// Number of input coordinates.
    #[config(default = 3)]
    pub input_dim: usize,

    /// Width of the first hidden layer.
    #[config(default = 20)]
    pub hidden_dim_0: usize,

    /// Width of the second hidden layer.
    #[config(default = 10)]
    pub hidden_dim_1: usize,

    /// Number of outputs.
    #[config(default = 1)]
    pub output_dim: usize,
}

impl Default for FieldModelConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldModelConfig {
    /// `(d_input, d_output)` of each layer in forward order.
    pub fn layer_dims(&self) -> [(usize, usize); 3] {
        [
            (self.input_dim, self.hidden_dim_0),
            (self.hidden_dim_0, self.hidden_dim_1),
            (self.hidden_dim_1, self.output_dim),
        ]
    }

    /// Total number of trainable scalars.
    pub fn num_params(&self) -> usize {
        self.layer_dims()
            .iter()
            .map(|&(d_in, d_out)| d_in * d_out + d_out)
            .sum()
    }

    /// Validate the configuration.
    ///
    /// The field maps 3-D points to one scalar, so input and output widths
    /// are fixed.
    pub fn validate(&self) -> Result<(), String> {
        if self.input_dim != 3 {
            return Err(format!("input_dim must be 3, got {}", self.input_dim));
        }
        if self.output_dim != 1 {
            return Err(format!("output_dim must be 1, got {}", self.output_dim));
        }
        if self.hidden_dim_0 == 0 || self.hidden_dim_1 == 0 {
            return Err("hidden widths must be positive".to_string());
        }
        Ok(())
    }
}
