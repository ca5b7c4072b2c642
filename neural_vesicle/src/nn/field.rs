//! Phase-field network.

use std::f64::consts::SQRT_2;

use burn::module::{Module, Param};
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::{sigmoid, tanh};
use burn::tensor::Distribution;
use serde::{Deserialize, Serialize};

use super::jet::Jet;
use crate::config::FieldModelConfig;

/// A scalar field `φ: R³ → R` whose spatial derivatives can be propagated.
///
/// Implemented by the trained network and by analytic fields in tests, so
/// both run through the same differential operator.
pub trait PhaseField<B: Backend> {
    /// `φ` at `[N, 3]` points, `[N, 1]`.
    fn evaluate(&self, points: Tensor<B, 2>) -> Tensor<B, 2>;

    /// Push a seeded jet through the field.
    fn propagate(&self, jet: Jet<B>) -> Jet<B>;
}

/// Shape of one affine layer as stored in a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerShape {
    /// Record key of the layer.
    pub name: String,
    /// Input width.
    pub d_input: usize,
    /// Output width.
    pub d_output: usize,
}

/// Three-layer sigmoid/sigmoid/tanh network.
///
/// The tanh output reads as a signed phase indicator, −1 outside and +1
/// inside the vesicle.
#[derive(Module, Debug)]
pub struct PhaseFieldNet<B: Backend> {
    /// First hidden layer.
    hidden0: Linear<B>,
    /// Second hidden layer.
    hidden1: Linear<B>,
    /// Output layer.
    out: Linear<B>,
}

impl<B: Backend> PhaseFieldNet<B> {
    /// Create a freshly initialized network.
    ///
    /// Weights are Kaiming-normal over the fan-in (std `√2/√fan_in`), biases
    /// normal with std `1/√fan_in`. Every tensor is drawn independently.
    pub fn new(config: &FieldModelConfig, device: &B::Device) -> Self {
        let [l0, l1, l2] = config.layer_dims();
        Self {
            hidden0: init_layer(l0, device),
            hidden1: init_layer(l1, device),
            out: init_layer(l2, device),
        }
    }

    /// Plain forward pass.
    pub fn forward(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        let z = sigmoid(self.hidden0.forward(points));
        let z = sigmoid(self.hidden1.forward(z));
        tanh(self.out.forward(z))
    }

    /// Layer shapes in forward order, keyed by record name.
    pub fn layer_shapes(&self) -> Vec<LayerShape> {
        [
            ("hidden0", &self.hidden0),
            ("hidden1", &self.hidden1),
            ("out", &self.out),
        ]
        .into_iter()
        .map(|(name, layer)| {
            let [d_input, d_output] = layer.weight.val().dims();
            LayerShape {
                name: name.to_string(),
                d_input,
                d_output,
            }
        })
        .collect()
    }

    /// Whether every parameter is finite.
    pub fn is_finite(&self) -> bool {
        [&self.hidden0, &self.hidden1, &self.out]
            .into_iter()
            .all(|layer| {
                let weight = layer.weight.val().into_data();
                let weights_ok = weight.iter::<f32>().all(f32::is_finite);
                let bias_ok = layer.bias.as_ref().map_or(true, |bias| {
                    bias.val().into_data().iter::<f32>().all(f32::is_finite)
                });
                weights_ok && bias_ok
            })
    }

    /// Flattened copy of every parameter, layer by layer.
    pub fn flat_params(&self) -> Vec<f32> {
        let mut params = Vec::with_capacity(self.num_params());
        for layer in [&self.hidden0, &self.hidden1, &self.out] {
            params.extend(layer.weight.val().into_data().iter::<f32>());
            if let Some(bias) = &layer.bias {
                params.extend(bias.val().into_data().iter::<f32>());
            }
        }
        params
    }
}

impl<B: Backend> PhaseField<B> for PhaseFieldNet<B> {
    fn evaluate(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        self.forward(points)
    }

    fn propagate(&self, jet: Jet<B>) -> Jet<B> {
        jet.linear(&self.hidden0)
            .sigmoid()
            .linear(&self.hidden1)
            .sigmoid()
            .linear(&self.out)
            .tanh()
    }
}

fn init_layer<B: Backend>((d_input, d_output): (usize, usize), device: &B::Device) -> Linear<B> {
    let mut layer = LinearConfig::new(d_input, d_output)
        .with_initializer(Initializer::KaimingNormal {
            gain: SQRT_2,
            fan_out_only: false,
        })
        .init(device);

    let std = 1.0 / (d_input as f64).sqrt();
    layer.bias = Some(Param::from_tensor(Tensor::random(
        [d_output],
        Distribution::Normal(0.0, std),
        device,
    )));
    layer
}
