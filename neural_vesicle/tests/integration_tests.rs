//! End-to-end integration tests.

use std::path::Path;

use burn::backend::{Autodiff, NdArray};
use tempfile::TempDir;

use neural_vesicle::{
    config::{ComputeDevice, FieldModelConfig, RunConfig, TrainingConfig},
    error::VesicleError,
    nn::PhaseFieldNet,
    training::{
        checkpoint_exists, find_latest_checkpoint, load_checkpoint, save_checkpoint,
        train_regimes, CheckpointMetadata, TrainingMetrics, VesicleTrainer,
    },
};
use vesicle_core::{PhysicalConstants, RegimeSelection, SamplingStrategy};

type TestBackend = Autodiff<NdArray>;

fn small_training(dir: &Path, epochs: usize) -> TrainingConfig {
    TrainingConfig::default()
        .with_epochs(epochs)
        .with_mesh_size(5)
        .with_plots(false)
        .with_output_dir(dir.display().to_string())
}

fn run_config(index: usize, training: TrainingConfig) -> RunConfig {
    RunConfig::new(
        index,
        RegimeSelection::for_run(index),
        training,
        ComputeDevice::Portable,
    )
    .unwrap()
}

#[test]
fn test_zero_epochs_keeps_initialization_and_writes_checkpoints() {
    let temp_dir = TempDir::new().unwrap();
    let device = burn::backend::ndarray::NdArrayDevice::Cpu;
    let run = run_config(5, small_training(temp_dir.path(), 0));
    let checkpoint_dir = run.checkpoint_dir();

    let mut trainer = VesicleTrainer::<TestBackend>::new(run, &device).unwrap();
    let initial = trainer.model().flat_params();
    let summary = trainer.fit().unwrap();

    assert_eq!(trainer.model().flat_params(), initial);
    assert!(summary.last.is_none());
    assert_eq!(summary.checkpoints.len(), 2);

    for device_variant in ComputeDevice::all() {
        let stem = checkpoint_dir.join(format!(
            "prime_PhaseField_0Epoch_{}",
            device_variant.tag()
        ));
        assert!(checkpoint_exists(&stem));

        let (restored, metadata) =
            load_checkpoint::<NdArray>(&stem, &FieldModelConfig::default(), &device).unwrap();
        assert_eq!(restored.flat_params(), initial);
        assert_eq!(metadata.epoch, 0);
        assert_eq!(metadata.run_index, 5);
        assert_eq!(metadata.device, device_variant);
    }

    let metrics = TrainingMetrics::load_json(&checkpoint_dir.join("metrics.json")).unwrap();
    assert!(metrics.is_empty());
}

#[test]
fn test_training_reduces_cost() {
    let temp_dir = TempDir::new().unwrap();
    let device = Default::default();
    let run = run_config(3, small_training(temp_dir.path(), 20));
    let mut trainer = VesicleTrainer::<TestBackend>::new(run, &device).unwrap();

    trainer.fit().unwrap();

    let costs = trainer.metrics().costs();
    assert_eq!(costs.len(), 20);
    assert!(costs.iter().all(|(_, c)| c.is_finite()));
    assert!(costs[19].1 < costs[0].1, "{:?}", costs);
}

#[test]
fn test_overflowing_cost_aborts_without_checkpoint() {
    let temp_dir = TempDir::new().unwrap();
    let device = Default::default();
    let selection = RegimeSelection::for_run(4).with_c0(1e30);
    let constants = PhysicalConstants::new(0.0375, 1e30, 12.566, 3.35).unwrap();
    let run = RunConfig::from_constants(
        4,
        selection,
        constants,
        small_training(temp_dir.path(), 3),
        ComputeDevice::Portable,
    )
    .unwrap();
    let checkpoint_dir = run.checkpoint_dir();

    let mut trainer = VesicleTrainer::<TestBackend>::new(run, &device).unwrap();
    let err = trainer.fit().unwrap_err();

    match err {
        VesicleError::NumericInstability { epoch, quantity, .. } => {
            assert_eq!(epoch, 0);
            assert_eq!(quantity, "cost");
        }
        other => panic!("expected numeric instability, got {other}"),
    }
    assert!(!checkpoint_dir.exists());
}

#[test]
fn test_restore_rejects_other_architecture() {
    let temp_dir = TempDir::new().unwrap();
    let device = burn::backend::ndarray::NdArrayDevice::Cpu;
    let narrow = FieldModelConfig::new().with_hidden_dim_1(4);
    let model = PhaseFieldNet::<NdArray>::new(&narrow, &device);
    let constants = PhysicalConstants::new(0.0375, 0.0, 12.566, 4.18).unwrap();
    let metadata = CheckpointMetadata::new(&model, 7, 0, ComputeDevice::Portable, constants);
    let path = save_checkpoint(temp_dir.path(), &model, &metadata).unwrap();

    let err = load_checkpoint::<NdArray>(&path, &FieldModelConfig::default(), &device).unwrap_err();
    assert!(matches!(err, VesicleError::Configuration { .. }));
}

#[test]
fn test_resume_continues_from_checkpoint() {
    let temp_dir = TempDir::new().unwrap();
    let device = Default::default();

    let first = train_regimes::<TestBackend>(
        run_config(1, small_training(&temp_dir.path().join("first"), 2)),
        &device,
        None,
        false,
    )
    .unwrap();
    let checkpoint = &first[0].checkpoints[1];

    let training = small_training(&temp_dir.path().join("second"), 0).with_seed(7);
    let mut trainer = VesicleTrainer::<TestBackend>::new(run_config(1, training), &device).unwrap();
    let metadata = trainer.resume(checkpoint).unwrap();

    let (saved, _) =
        load_checkpoint::<TestBackend>(checkpoint, &FieldModelConfig::default(), &device).unwrap();
    assert_eq!(metadata.epoch, 2);
    assert_eq!(trainer.model().flat_params(), saved.flat_params());
}

#[test]
fn test_uniform_sampling_runs() {
    let temp_dir = TempDir::new().unwrap();
    let device = Default::default();
    let training = small_training(temp_dir.path(), 1)
        .with_sampling(SamplingStrategy::Uniform { count: 64 });
    let summaries =
        train_regimes::<TestBackend>(run_config(6, training), &device, None, false).unwrap();

    assert_eq!(summaries.len(), 1);
    let latest = find_latest_checkpoint(
        &temp_dir.path().join("saved_model_6"),
        ComputeDevice::Accelerated,
    )
    .unwrap();
    assert!(latest.ends_with("prime_PhaseField_1Epoch_gpu"));
}

#[test]
fn test_run_index_out_of_range() {
    let err = RunConfig::new(
        19,
        RegimeSelection::for_run(19),
        TrainingConfig::default(),
        ComputeDevice::Portable,
    )
    .unwrap_err();
    assert!(matches!(err, VesicleError::Configuration { .. }));
}
