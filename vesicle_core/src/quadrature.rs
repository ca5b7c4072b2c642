//! Gauss–Legendre quadrature for deterministic cross-checks of the
//! Monte-Carlo integrals.

use std::f64::consts::PI;

use crate::domain::Domain;
use crate::error::{CoreError, Result};

/// Gauss–Legendre nodes and weights on `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussLegendre {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl GaussLegendre {
    const NEWTON_TOLERANCE: f64 = 1e-15;
    const NEWTON_MAX_ITERS: usize = 100;

    /// Build the rule with `order` nodes.
    ///
    /// Exact for polynomials up to degree `2·order − 1`. Roots of `P_n` are
    /// found by Newton iteration from the Chebyshev-like initial guess.
    pub fn new(order: usize) -> Result<Self> {
        if order == 0 {
            return Err(CoreError::InvalidQuadratureOrder);
        }
        let n = order;
        let mut nodes = vec![0.0; n];
        let mut weights = vec![0.0; n];

        for i in 0..n.div_ceil(2) {
            let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
            let mut derivative = 0.0;
            for _ in 0..Self::NEWTON_MAX_ITERS {
                let (p, dp) = legendre(n, x);
                derivative = dp;
                let dx = p / dp;
                x -= dx;
                if dx.abs() < Self::NEWTON_TOLERANCE {
                    let (_, dp) = legendre(n, x);
                    derivative = dp;
                    break;
                }
            }
            let w = 2.0 / ((1.0 - x * x) * derivative * derivative);
            nodes[i] = -x;
            nodes[n - 1 - i] = x;
            weights[i] = w;
            weights[n - 1 - i] = w;
        }

        Ok(Self { nodes, weights })
    }

    /// Number of nodes.
    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes on `[-1, 1]`, ascending.
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Weights matching [`nodes`](Self::nodes).
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Nodes and weights mapped affinely onto `[a, b]`.
    pub fn on_interval(&self, a: f64, b: f64) -> (Vec<f64>, Vec<f64>) {
        let half = 0.5 * (b - a);
        let mid = 0.5 * (b + a);
        let nodes = self.nodes.iter().map(|&x| mid + half * x).collect();
        let weights = self.weights.iter().map(|&w| half * w).collect();
        (nodes, weights)
    }

    /// Integrate a scalar function over `[a, b]`.
    pub fn integrate<F: Fn(f64) -> f64>(&self, a: f64, b: f64, f: F) -> f64 {
        let (nodes, weights) = self.on_interval(a, b);
        nodes.iter().zip(&weights).map(|(&x, &w)| w * f(x)).sum()
    }
}

/// `P_n(x)` and `P_n'(x)` by the three-term recurrence.
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    if n == 0 {
        return (1.0, 0.0);
    }
    for k in 2..=n {
        let k = k as f64;
        let p2 = ((2.0 * k - 1.0) * x * p1 - (k - 1.0) * p0) / k;
        p0 = p1;
        p1 = p2;
    }
    let dp = n as f64 * (x * p1 - p0) / (x * x - 1.0);
    (p1, dp)
}

/// Tensor-product Gauss–Legendre rule over a cubic domain.
///
/// Points are enumerated x slowest, z fastest, in chunks so that large rules
/// can be evaluated batch by batch.
#[derive(Debug, Clone)]
pub struct TensorProductRule {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl TensorProductRule {
    /// Build an `order³` rule on the domain cube.
    pub fn new(domain: &Domain, order: usize) -> Result<Self> {
        let rule = GaussLegendre::new(order)?;
        let (nodes, weights) = rule.on_interval(domain.r_min as f64, domain.r_max as f64);
        Ok(Self { nodes, weights })
    }

    /// Total number of points.
    pub fn len(&self) -> usize {
        self.nodes.len().pow(3)
    }

    /// Whether the rule has no points.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Point and weight at a flat index.
    pub fn point(&self, index: usize) -> ([f32; 3], f64) {
        let n = self.nodes.len();
        let (i, j, k) = (index / (n * n), (index / n) % n, index % n);
        (
            [
                self.nodes[i] as f32,
                self.nodes[j] as f32,
                self.nodes[k] as f32,
            ],
            self.weights[i] * self.weights[j] * self.weights[k],
        )
    }

    /// Points and weights in consecutive chunks of at most `chunk` entries.
    pub fn chunks(&self, chunk: usize) -> impl Iterator<Item = (Vec<[f32; 3]>, Vec<f64>)> + '_ {
        let total = self.len();
        let chunk = chunk.max(1);
        (0..total).step_by(chunk).map(move |start| {
            let end = (start + chunk).min(total);
            (start..end).map(|index| self.point(index)).unzip()
        })
    }
}
