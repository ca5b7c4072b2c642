//! Second-order spatial jets carried through the field network.
//!
//! A [`Jet`] holds, for a batch of `N` points, the activations of a layer
//! together with their partial derivatives with respect to the three input
//! coordinates. Derivative blocks are stacked axis-major: rows `k·N..(k+1)·N`
//! of `first` hold `∂/∂x_k`, and the same rows of `second` hold `∂²/∂x_k²`.
//!
//! Every rule is written with ordinary tensor ops, so on an autodiff backend
//! the derivatives stay in the reverse-mode graph and the loss can be
//! differentiated with respect to the parameters in one backward pass.

use burn::nn::Linear;
use burn::prelude::*;
use burn::tensor::activation::{sigmoid, tanh};

/// Number of spatial axes.
pub const SPATIAL_DIM: usize = 3;

/// How many derivative orders a jet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JetOrder {
    /// Values only.
    Value,
    /// Values and first partials.
    First,
    /// Values, first partials and pure second partials.
    Second,
}

/// Activations `[N, W]` with optional first partials `[3N, W]` and pure
/// second partials `[3N, W]`.
#[derive(Debug, Clone)]
pub struct Jet<B: Backend> {
    /// Values.
    pub value: Tensor<B, 2>,
    /// First partials, axis-major.
    pub first: Option<Tensor<B, 2>>,
    /// Pure second partials, axis-major.
    pub second: Option<Tensor<B, 2>>,
}

impl<B: Backend> Jet<B> {
    /// Seed a jet at the input coordinates `[N, 3]`.
    ///
    /// `∂x_j/∂x_k = δ_jk`, and all second partials of a coordinate vanish.
    pub fn seed(points: Tensor<B, 2>, order: JetOrder) -> Self {
        let [n, dim] = points.dims();
        let device = points.device();

        let first = (order >= JetOrder::First).then(|| {
            let mut identity = vec![0.0f32; SPATIAL_DIM * n * dim];
            for k in 0..SPATIAL_DIM.min(dim) {
                for row in 0..n {
                    identity[(k * n + row) * dim + k] = 1.0;
                }
            }
            Tensor::from_data(TensorData::new(identity, [SPATIAL_DIM * n, dim]), &device)
        });
        let second =
            (order >= JetOrder::Second).then(|| Tensor::zeros([SPATIAL_DIM * n, dim], &device));

        Self {
            value: points,
            first,
            second,
        }
    }

    /// Number of points.
    pub fn batch_size(&self) -> usize {
        self.value.dims()[0]
    }

    /// Highest derivative order present.
    pub fn order(&self) -> JetOrder {
        match (&self.first, &self.second) {
            (Some(_), Some(_)) => JetOrder::Second,
            (Some(_), None) => JetOrder::First,
            _ => JetOrder::Value,
        }
    }

    /// Push through an affine layer. Derivatives only see the weight.
    pub fn linear(self, layer: &Linear<B>) -> Self {
        let weight = layer.weight.val();
        Self {
            value: layer.forward(self.value),
            first: self.first.map(|d1| d1.matmul(weight.clone())),
            second: self.second.map(|d2| d2.matmul(weight)),
        }
    }

    /// Apply an elementwise function given its value, first and second
    /// derivative at the current activations.
    ///
    /// - `d1' = f'·d1`
    /// - `d2' = f''·d1² + f'·d2`
    pub fn chain(
        self,
        value: Tensor<B, 2>,
        derivative: Tensor<B, 2>,
        second_derivative: Tensor<B, 2>,
    ) -> Self {
        let stacked = |t: Tensor<B, 2>| Tensor::cat(vec![t; SPATIAL_DIM], 0);

        let second = match (&self.first, self.second) {
            (Some(d1), Some(d2)) => Some(
                stacked(second_derivative) * d1.clone() * d1.clone()
                    + stacked(derivative.clone()) * d2,
            ),
            _ => None,
        };
        let first = self.first.map(|d1| stacked(derivative) * d1);

        Self {
            value,
            first,
            second,
        }
    }

    /// Logistic sigmoid: `s' = s(1 − s)`, `s'' = s'(1 − 2s)`.
    pub fn sigmoid(self) -> Self {
        let s = sigmoid(self.value.clone());
        let ds = s.clone() * s.clone().neg().add_scalar(1.0);
        let d2s = ds.clone() * s.clone().mul_scalar(-2.0).add_scalar(1.0);
        self.chain(s, ds, d2s)
    }

    /// Hyperbolic tangent: `t' = 1 − t²`, `t'' = −2t·t'`.
    pub fn tanh(self) -> Self {
        let t = tanh(self.value.clone());
        let dt = (t.clone() * t.clone()).neg().add_scalar(1.0);
        let d2t = t.clone().mul_scalar(-2.0) * dt.clone();
        self.chain(t, dt, d2t)
    }

    /// Elementwise square: `y' = 2v`, `y'' = 2`.
    pub fn square(self) -> Self {
        let v = self.value.clone();
        let dy = v.clone().mul_scalar(2.0);
        let d2y = v.ones_like().mul_scalar(2.0);
        self.chain(v.clone() * v, dy, d2y)
    }

    /// Sum over the feature axis, `[N, W] → [N, 1]`.
    pub fn sum_features(self) -> Self {
        Self {
            value: self.value.sum_dim(1),
            first: self.first.map(|d1| d1.sum_dim(1)),
            second: self.second.map(|d2| d2.sum_dim(1)),
        }
    }

    /// `|∇φ|²` per point, `[N, 1]`, for a scalar jet.
    pub fn grad_mag_sq(&self) -> Option<Tensor<B, 2>> {
        let n = self.batch_size();
        self.first.clone().map(|d1| {
            let per_axis = d1.reshape([SPATIAL_DIM, n]);
            (per_axis.clone() * per_axis)
                .sum_dim(0)
                .reshape([n, 1])
        })
    }

    /// `∇²φ` per point, `[N, 1]`, for a scalar jet.
    pub fn laplacian(&self) -> Option<Tensor<B, 2>> {
        let n = self.batch_size();
        self.second
            .clone()
            .map(|d2| d2.reshape([SPATIAL_DIM, n]).sum_dim(0).reshape([n, 1]))
    }

    /// `∇φ` per point, `[N, 3]`, for a scalar jet.
    pub fn gradient(&self) -> Option<Tensor<B, 2>> {
        let n = self.batch_size();
        self.first
            .clone()
            .map(|d1| d1.reshape([SPATIAL_DIM, n]).transpose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn to_vec(t: Tensor<TestBackend, 2>) -> Vec<f32> {
        t.into_data().to_vec().unwrap()
    }

    #[test]
    fn test_seed_layout() {
        let device = Default::default();
        let points = Tensor::<TestBackend, 2>::from_floats([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], &device);
        let jet = Jet::seed(points, JetOrder::Second);

        assert_eq!(jet.order(), JetOrder::Second);
        assert_eq!(
            to_vec(jet.first.unwrap()),
            vec![
                1.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, //
                0.0, 1.0, 0.0, //
                0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0,
            ]
        );
        assert!(to_vec(jet.second.unwrap()).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_value_order_skips_derivatives() {
        let device = Default::default();
        let points = Tensor::<TestBackend, 2>::zeros([4, 3], &device);
        let jet = Jet::seed(points, JetOrder::Value).sigmoid();
        assert_eq!(jet.order(), JetOrder::Value);
        assert!(jet.grad_mag_sq().is_none());
        assert!(jet.laplacian().is_none());
    }

    #[test]
    fn test_squared_radius() {
        let device = Default::default();
        let points = Tensor::<TestBackend, 2>::from_floats([[1.0, 0.0, 0.0], [0.5, -1.0, 2.0]], &device);
        let jet = Jet::seed(points, JetOrder::Second).square().sum_features();

        assert_eq!(to_vec(jet.value.clone()), vec![1.0, 5.25]);
        assert_eq!(to_vec(jet.grad_mag_sq().unwrap()), vec![4.0, 21.0]);
        assert_eq!(to_vec(jet.laplacian().unwrap()), vec![6.0, 6.0]);
        assert_eq!(
            to_vec(jet.gradient().unwrap()),
            vec![2.0, 0.0, 0.0, 1.0, -2.0, 4.0]
        );
    }

    #[test]
    fn test_tanh_second_derivative() {
        let device = Default::default();
        let x = 0.3f32;
        let points = Tensor::<TestBackend, 2>::from_floats([[x, 0.0, 0.0]], &device);
        let jet = Jet::seed(points, JetOrder::Second).tanh();

        let t = x.tanh();
        let dt = 1.0 - t * t;
        let d2t = -2.0 * t * dt;
        let second = to_vec(jet.second.unwrap());
        // ∂²/∂x² of the x column
        assert!((second[0] - d2t).abs() < 1e-6);
        let first = to_vec(jet.first.unwrap());
        assert!((first[0] - dt).abs() < 1e-6);
    }
}
