//! Optimizer configuration and the AMSGrad update rule.
//!
//! Adaptive moment estimation with the AMSGrad correction: the second-moment
//! estimate used in the denominator is the running maximum of the raw
//! estimate, so the effective step size never grows back.

use burn::config::Config;
use burn::module::AutodiffModule;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::SimpleOptimizer;
use burn::LearningRate;
use burn::prelude::*;
use burn::record::Record;
use burn::tensor::backend::AutodiffBackend;

/// Configuration for the optimizer.
#[derive(Config, Debug)]
pub struct OptimizerConfig {
    /// Learning rate.
    #[config(default = 1e-3)]
    pub learning_rate: f64,

    /// Decay of the first-moment estimate.
    #[config(default = 0.9)]
    pub beta_1: f32,

    /// Decay of the second-moment estimate.
    #[config(default = 0.999)]
    pub beta_2: f32,

    /// Epsilon for numerical stability.
    #[config(default = 1e-8)]
    pub epsilon: f32,

    /// Weight decay (L2 regularization).
    #[config(default = 0.0)]
    pub weight_decay: f32,

    /// Whether to use the running maximum of the second moment.
    #[config(default = true)]
    pub amsgrad: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err("learning_rate must be positive".to_string());
        }
        if !(0.0..1.0).contains(&self.beta_1) || !(0.0..1.0).contains(&self.beta_2) {
            return Err("betas must lie in [0, 1)".to_string());
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err("epsilon must be positive".to_string());
        }
        if self.weight_decay < 0.0 {
            return Err("weight_decay must be non-negative".to_string());
        }
        Ok(())
    }

    /// Initialize an optimizer for a module.
    pub fn init<B: AutodiffBackend, M: AutodiffModule<B>>(
        &self,
    ) -> OptimizerAdaptor<AmsGrad, M, B> {
        OptimizerAdaptor::from(AmsGrad {
            beta_1: self.beta_1,
            beta_2: self.beta_2,
            epsilon: self.epsilon,
            weight_decay: self.weight_decay,
            amsgrad: self.amsgrad,
        })
    }
}

/// AMSGrad update rule, applied tensor by tensor.
#[derive(Debug, Clone)]
pub struct AmsGrad {
    beta_1: f32,
    beta_2: f32,
    epsilon: f32,
    weight_decay: f32,
    amsgrad: bool,
}

/// Moment estimates of one parameter tensor.
#[derive(Record, Clone)]
pub struct AmsGradState<B: Backend, const D: usize> {
    /// Number of updates applied.
    pub time: usize,
    /// First-moment estimate.
    pub moment_1: Tensor<B, D>,
    /// Second-moment estimate.
    pub moment_2: Tensor<B, D>,
    /// Running maximum of the second-moment estimate.
    pub max_moment_2: Tensor<B, D>,
}

impl<B: Backend> SimpleOptimizer<B> for AmsGrad {
    type State<const D: usize> = AmsGradState<B, D>;

    fn step<const D: usize>(
        &self,
        lr: LearningRate,
        tensor: Tensor<B, D>,
        grad: Tensor<B, D>,
        state: Option<Self::State<D>>,
    ) -> (Tensor<B, D>, Option<Self::State<D>>) {
        let grad = if self.weight_decay > 0.0 {
            grad + tensor.clone().mul_scalar(self.weight_decay)
        } else {
            grad
        };
        let grad_sq = grad.clone() * grad.clone();

        let (time, moment_1, moment_2, max_moment_2) = match state {
            Some(state) => (
                state.time + 1,
                state.moment_1.mul_scalar(self.beta_1) + grad.mul_scalar(1.0 - self.beta_1),
                state.moment_2.mul_scalar(self.beta_2) + grad_sq.mul_scalar(1.0 - self.beta_2),
                state.max_moment_2,
            ),
            None => (
                1,
                grad.mul_scalar(1.0 - self.beta_1),
                grad_sq.clone().mul_scalar(1.0 - self.beta_2),
                grad_sq.zeros_like(),
            ),
        };

        let max_moment_2 = if self.amsgrad {
            max_moment_2.max_pair(moment_2.clone())
        } else {
            moment_2.clone()
        };

        let t = time as i32;
        let bias_correction_1 = 1.0 - (self.beta_1 as f64).powi(t);
        let bias_correction_2 = 1.0 - (self.beta_2 as f64).powi(t);

        let denominator = max_moment_2
            .clone()
            .sqrt()
            .div_scalar(bias_correction_2.sqrt())
            .add_scalar(self.epsilon);
        let update = moment_1
            .clone()
            .div(denominator)
            .mul_scalar(lr / bias_correction_1);

        let state = AmsGradState {
            time,
            moment_1,
            moment_2,
            max_moment_2,
        };
        (tensor - update, Some(state))
    }

    fn to_device<const D: usize>(state: Self::State<D>, device: &B::Device) -> Self::State<D> {
        AmsGradState {
            time: state.time,
            moment_1: state.moment_1.to_device(device),
            moment_2: state.moment_2.to_device(device),
            max_moment_2: state.max_moment_2.to_device(device),
        }
    }
}
