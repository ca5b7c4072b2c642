//! Checkpoint save/load for trained field networks.
//!
//! A checkpoint is a pair of files sharing one stem:
//! - `<stem>.mpk`: the parameter record, keyed by layer name
//! - `<stem>.json`: metadata with the layer shapes, device tag, completed
//!   epoch count, run index and physical constants
//!
//! Stems follow `prime_PhaseField_<epoch>Epoch_<gpu|cpu>`.

use std::fs;
use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use serde::{Deserialize, Serialize};
use vesicle_core::{PhysicalConstants, RegimeSelection, RegimeTable};

use crate::config::{ComputeDevice, FieldModelConfig};
use crate::error::{Result, VesicleError};
use crate::nn::{LayerShape, PhaseFieldNet};

const CHECKPOINT_VERSION: u32 = 1;
const STEM_PREFIX: &str = "prime_PhaseField_";

type CheckpointRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Checkpoint metadata stored as JSON next to the parameter record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Format version.
    pub version: u32,
    /// Completed epochs.
    pub epoch: usize,
    /// Run index the model was trained for.
    pub run_index: usize,
    /// Device variant of this file.
    pub device: ComputeDevice,
    /// Layer shapes in forward order.
    pub layers: Vec<LayerShape>,
    /// Physical constants of the run.
    pub constants: PhysicalConstants,
}

impl CheckpointMetadata {
    /// Describe a model at the end of a run.
    pub fn new<B: Backend>(
        model: &PhaseFieldNet<B>,
        epoch: usize,
        run_index: usize,
        device: ComputeDevice,
        constants: PhysicalConstants,
    ) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            epoch,
            run_index,
            device,
            layers: model.layer_shapes(),
            constants,
        }
    }

    /// Copy of this metadata for another device variant.
    pub fn with_device(mut self, device: ComputeDevice) -> Self {
        self.device = device;
        self
    }

    /// Constants to evaluate the model against.
    ///
    /// The constants recorded at training time, unless `run_index` selects
    /// the standard regime of another run.
    pub fn regime_constants(&self, run_index: Option<usize>) -> Result<PhysicalConstants> {
        match run_index {
            None => Ok(self.constants),
            Some(index) => Ok(PhysicalConstants::from_regime(
                &RegimeTable::standard(),
                &RegimeSelection::for_run(index),
            )?),
        }
    }
}

/// File stem for a checkpoint variant.
pub fn checkpoint_stem(epoch: usize, device: ComputeDevice) -> String {
    format!("{STEM_PREFIX}{epoch}Epoch_{}", device.tag())
}

/// Strip a `.mpk` or `.json` extension so either file names the checkpoint.
fn checkpoint_base(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mpk") | Some("json") => path.with_extension(""),
        _ => path.to_path_buf(),
    }
}

/// Save one checkpoint variant into `dir`. Returns the stem path.
pub fn save_checkpoint<B: Backend>(
    dir: &Path,
    model: &PhaseFieldNet<B>,
    metadata: &CheckpointMetadata,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| VesicleError::io(dir, e))?;
    let base = dir.join(checkpoint_stem(metadata.epoch, metadata.device));

    model
        .clone()
        .save_file(base.clone(), &CheckpointRecorder::new())
        .map_err(|e| VesicleError::Recorder(e.to_string()))?;

    let json_path = base.with_extension("json");
    fs::write(&json_path, serde_json::to_string_pretty(metadata)?)
        .map_err(|e| VesicleError::io(&json_path, e))?;

    log::info!(
        "Saved checkpoint {:?} (epoch {}, run {})",
        base,
        metadata.epoch,
        metadata.run_index
    );

    Ok(base)
}

/// Save both device variants. The contents are identical.
pub fn save_checkpoints<B: Backend>(
    dir: &Path,
    model: &PhaseFieldNet<B>,
    metadata: &CheckpointMetadata,
) -> Result<Vec<PathBuf>> {
    ComputeDevice::all()
        .into_iter()
        .map(|device| save_checkpoint(dir, model, &metadata.clone().with_device(device)))
        .collect()
}

/// Read only the metadata of a checkpoint.
pub fn load_metadata(path: &Path) -> Result<CheckpointMetadata> {
    let json_path = checkpoint_base(path).with_extension("json");
    let json = fs::read_to_string(&json_path).map_err(|e| VesicleError::io(&json_path, e))?;
    Ok(serde_json::from_str(&json)?)
}

/// Load a checkpoint into a network built from `config`.
///
/// The recorded layer shapes are checked against the architecture before
/// the parameters are read, and the loaded tensors are checked afterwards.
pub fn load_checkpoint<B: Backend>(
    path: &Path,
    config: &FieldModelConfig,
    device: &B::Device,
) -> Result<(PhaseFieldNet<B>, CheckpointMetadata)> {
    config.validate().map_err(VesicleError::config)?;

    let base = checkpoint_base(path);
    let metadata = load_metadata(&base)?;
    let model = PhaseFieldNet::<B>::new(config, device);
    let expected = model.layer_shapes();
    check_shapes(&expected, &metadata.layers, "checkpoint metadata")?;

    let mpk_path = base.with_extension("mpk");
    if !mpk_path.exists() {
        return Err(VesicleError::io(
            &mpk_path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "parameter record not found"),
        ));
    }

    let model = model
        .load_file(base.clone(), &CheckpointRecorder::new(), device)
        .map_err(|e| VesicleError::Recorder(e.to_string()))?;
    check_shapes(&expected, &model.layer_shapes(), "loaded parameters")?;

    log::info!(
        "Loaded checkpoint {:?} (epoch {}, run {}, {} variant)",
        base,
        metadata.epoch,
        metadata.run_index,
        metadata.device.tag()
    );

    Ok((model, metadata))
}

fn check_shapes(expected: &[LayerShape], got: &[LayerShape], source: &str) -> Result<()> {
    if expected != got {
        let describe = |shapes: &[LayerShape]| {
            shapes
                .iter()
                .map(|s| format!("{}[{}x{}]", s.name, s.d_input, s.d_output))
                .collect::<Vec<_>>()
                .join(", ")
        };
        return Err(VesicleError::config(format!(
            "{source} does not match the architecture: expected {}, got {}",
            describe(expected),
            describe(got)
        )));
    }
    Ok(())
}

/// Check if both files of a checkpoint exist.
pub fn checkpoint_exists(path: &Path) -> bool {
    let base = checkpoint_base(path);
    base.with_extension("mpk").exists() && base.with_extension("json").exists()
}

/// The checkpoint in `dir` with the most completed epochs for a device.
pub fn find_latest_checkpoint(dir: &Path, device: ComputeDevice) -> Option<PathBuf> {
    let suffix = format!("Epoch_{}", device.tag());
    let mut latest: Option<(usize, PathBuf)> = None;

    for entry in fs::read_dir(dir).ok()?.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let epoch = stem
            .strip_prefix(STEM_PREFIX)
            .and_then(|rest| rest.strip_suffix(suffix.as_str()))
            .and_then(|n| n.parse::<usize>().ok());

        if let Some(epoch) = epoch {
            let base = path.with_extension("");
            let newer = latest.as_ref().map_or(true, |(best, _)| epoch > *best);
            if newer && checkpoint_exists(&base) {
                latest = Some((epoch, base));
            }
        }
    }

    latest.map(|(_, path)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use tempfile::TempDir;

    type TestBackend = NdArray;

    fn constants() -> PhysicalConstants {
        PhysicalConstants::new(0.0375, 0.0, 12.566, 3.9).unwrap()
    }

    #[test]
    fn test_regime_constants_default_to_recorded() {
        let device = Default::default();
        let model = PhaseFieldNet::<TestBackend>::new(&FieldModelConfig::default(), &device);
        let table = RegimeTable::standard();
        let trained = PhysicalConstants::from_regime(
            &table,
            &RegimeSelection::for_run(3)
                .with_epsilon_index(5)
                .with_area_index(2)
                .with_c0(0.5),
        )
        .unwrap();
        let metadata = CheckpointMetadata::new(&model, 10, 3, ComputeDevice::Portable, trained);

        assert_eq!(metadata.regime_constants(None).unwrap(), trained);

        let standard =
            PhysicalConstants::from_regime(&table, &RegimeSelection::for_run(3)).unwrap();
        assert_eq!(metadata.regime_constants(Some(3)).unwrap(), standard);
        assert_ne!(standard, trained);
        assert!(metadata.regime_constants(Some(19)).is_err());
    }

    #[test]
    fn test_checkpoint_stem() {
        assert_eq!(
            checkpoint_stem(80001, ComputeDevice::Accelerated),
            "prime_PhaseField_80001Epoch_gpu"
        );
        assert_eq!(
            checkpoint_stem(0, ComputeDevice::Portable),
            "prime_PhaseField_0Epoch_cpu"
        );
    }

    #[test]
    fn test_checkpoint_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let device = Default::default();
        let config = FieldModelConfig::default();
        let model = PhaseFieldNet::<TestBackend>::new(&config, &device);
        let metadata = CheckpointMetadata::new(&model, 12, 4, ComputeDevice::Portable, constants());

        let paths = save_checkpoints(temp_dir.path(), &model, &metadata).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| checkpoint_exists(p)));

        let (loaded, loaded_metadata) =
            load_checkpoint::<TestBackend>(&paths[1], &config, &device).unwrap();
        assert_eq!(loaded_metadata, metadata);
        assert_eq!(loaded.flat_params(), model.flat_params());

        // either file names the checkpoint
        let (_, gpu_metadata) =
            load_checkpoint::<TestBackend>(&paths[0].with_extension("mpk"), &config, &device)
                .unwrap();
        assert_eq!(gpu_metadata.device, ComputeDevice::Accelerated);
    }

    #[test]
    fn test_shape_mismatch_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let device = Default::default();
        let wide = FieldModelConfig::new().with_hidden_dim_0(8);
        let model = PhaseFieldNet::<TestBackend>::new(&wide, &device);
        let metadata = CheckpointMetadata::new(&model, 1, 0, ComputeDevice::Portable, constants());
        let path = save_checkpoint(temp_dir.path(), &model, &metadata).unwrap();

        let err = load_checkpoint::<TestBackend>(&path, &FieldModelConfig::default(), &device)
            .unwrap_err();
        assert!(matches!(err, VesicleError::Configuration { .. }));
    }

    #[test]
    fn test_missing_checkpoint_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let device = Default::default();
        let err = load_checkpoint::<TestBackend>(
            &temp_dir.path().join("prime_PhaseField_5Epoch_cpu"),
            &FieldModelConfig::default(),
            &device,
        )
        .unwrap_err();
        assert!(matches!(err, VesicleError::Io { .. }));
    }

    #[test]
    fn test_find_latest_checkpoint() {
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path();

        for epoch in [5, 10, 3, 15] {
            for device in ComputeDevice::all() {
                let stem = base_path.join(checkpoint_stem(epoch, device));
                fs::write(stem.with_extension("json"), "{}").unwrap();
                fs::write(stem.with_extension("mpk"), "").unwrap();
            }
        }
        // metadata without a parameter record is ignored
        fs::write(base_path.join("prime_PhaseField_20Epoch_cpu.json"), "{}").unwrap();

        let latest = find_latest_checkpoint(base_path, ComputeDevice::Portable).unwrap();
        assert!(latest.ends_with("prime_PhaseField_15Epoch_cpu"));
    }
}
