//! Integration tests for the densities, the integrator and the cost.

use burn::backend::NdArray;
use burn::prelude::*;
use proptest::prelude::*;

use neural_vesicle::{
    config::PenaltyConfig,
    diff::DerivativeBundle,
    loss::{
        bending_energy_density, surface_density, volume_density, MonteCarloIntegrator,
        VesicleLoss,
    },
};
use vesicle_core::{Domain, PhysicalConstants};

type TestBackend = NdArray;

fn column(values: &[f32]) -> Tensor<TestBackend, 2> {
    let device = Default::default();
    Tensor::from_data(TensorData::new(values.to_vec(), [values.len(), 1]), &device)
}

fn scalar(t: Tensor<TestBackend, 2>) -> f32 {
    t.into_data().to_vec::<f32>().unwrap()[0]
}

proptest! {
    #[test]
    fn volume_density_is_monotonic(a in -1.0f32..=1.0, b in -1.0f32..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let values: Vec<f32> = volume_density(column(&[lo, hi])).into_data().to_vec().unwrap();
        prop_assert!(values[0] <= values[1]);
        prop_assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn flat_interface_densities_are_non_negative(
        phi in -1.0f32..=1.0,
        epsilon in 0.01f64..1.0,
        c0 in -1.0f64..1.0,
    ) {
        // Laplacian chosen so that the bending bracket vanishes.
        let chemical = (phi as f64 / epsilon + c0 * std::f64::consts::SQRT_2)
            * (1.0 - (phi as f64).powi(2));
        let laplacian = (-chemical / epsilon) as f32;

        let surface = scalar(surface_density(column(&[phi]), column(&[0.0]), epsilon));
        let bending = scalar(bending_energy_density(
            column(&[phi]),
            column(&[laplacian]),
            epsilon,
            c0,
        ));

        prop_assert!(surface.is_finite() && surface >= 0.0);
        prop_assert!(bending.is_finite() && bending >= 0.0);
        prop_assert!(bending < 1e-2 * (1.0 + 1.0 / epsilon as f32));
    }

    #[test]
    fn constant_density_integrates_exactly(c in -10.0f32..10.0, n in 1usize..200) {
        let domain = Domain::default();
        let integrator = MonteCarloIntegrator::uniform(&domain);
        let device = Default::default();
        let density = Tensor::<TestBackend, 2>::full([n, 1], c, &device);

        let integral: f32 = integrator.integrate(density).into_scalar();
        let expected = c as f64 * domain.volume();
        prop_assert!((integral as f64 - expected).abs() <= 1e-4 * (1.0 + expected.abs()));
    }
}

#[test]
fn test_volume_density_endpoints() {
    let values: Vec<f32> = volume_density(column(&[-1.0, 1.0])).into_data().to_vec().unwrap();
    assert_eq!(values, vec![0.0, 1.0]);
}

#[test]
fn test_cost_at_targets_is_bending_energy() {
    // φ ≡ 1 on [-1, 1]³ with V₀ = 8 and a negligible area target
    let device = Default::default();
    let domain = Domain::new(-1.0, 1.0).unwrap();
    let constants = PhysicalConstants::new(0.2, 0.0, 1e-9, 8.0).unwrap();
    let loss = VesicleLoss::new(
        PenaltyConfig::default(),
        MonteCarloIntegrator::uniform(&domain),
    );

    let phi = Tensor::<TestBackend, 2>::ones([8, 1], &device);
    let bundle = DerivativeBundle {
        phi: phi.clone(),
        grad_mag_sq: Some(phi.zeros_like()),
        laplacian: Some(phi.zeros_like()),
    };
    let corners: Vec<f32> = (0..8)
        .flat_map(|i| {
            [
                if i & 4 == 0 { -0.5 } else { 0.5 },
                if i & 2 == 0 { -0.5 } else { 0.5 },
                if i & 1 == 0 { -0.5 } else { 0.5 },
            ]
        })
        .collect();
    let points = Tensor::<TestBackend, 2>::from_data(TensorData::new(corners, [8, 3]), &device);

    let values = loss.forward(&bundle, points, &constants).unwrap().values();
    assert!((values.volume - 8.0).abs() < 1e-5);
    assert!(values.center_mass_sq.abs() < 1e-9);
    assert!(values.cost.abs() < 1e-3);
}
