//! `vesicle` command-line interface.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use burn::tensor::backend::AutodiffBackend;
use clap::{Parser, Subcommand, ValueEnum};

use neural_vesicle::config::{ComputeDevice, RunConfig, TrainingConfig};
use neural_vesicle::error::Result;
use neural_vesicle::export::{
    evenly_spaced_integrals, gauss_legendre_integrals, render_field_plots, FieldGrid,
};
use neural_vesicle::training::{load_checkpoint, train_regimes};
use vesicle_core::{Domain, RegimeSelection, SamplingStrategy};

#[derive(Parser, Debug)]
#[command(
    name = "vesicle",
    version,
    about = "Phase-field vesicle shapes from a physics-informed network"
)]
struct Cli {
    /// Compute device.
    #[arg(long, global = true, value_enum, default_value_t = DeviceArg::Portable)]
    device: DeviceArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train the field for one volume regime.
    Train {
        /// Regime index; selects the target volume.
        index: usize,
        /// Epochs per regime.
        #[arg(long)]
        epochs: Option<usize>,
        /// Grid nodes per axis.
        #[arg(long)]
        mesh_size: Option<usize>,
        /// Point placement.
        #[arg(long, value_enum, default_value_t = SamplingArg::Grid)]
        sampling: SamplingArg,
        /// Number of points for uniform sampling, `mesh_size³` if omitted.
        #[arg(long)]
        points: Option<usize>,
        /// Seed for initialization and shuffling.
        #[arg(long)]
        seed: Option<u64>,
        /// Checkpoint to start from.
        #[arg(long)]
        resume: Option<PathBuf>,
        /// Train regimes 1..=INDEX in sequence.
        #[arg(long)]
        continuation: bool,
        /// Override the epsilon table index.
        #[arg(long)]
        epsilon_index: Option<usize>,
        /// Override the area table index.
        #[arg(long)]
        area_index: Option<usize>,
        /// Spontaneous curvature.
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        c0: f64,
        /// Root of the plot and checkpoint directories.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Epochs between progress lines.
        #[arg(long)]
        log_interval: Option<usize>,
        /// Skip the end-of-run plots.
        #[arg(long)]
        no_plots: bool,
    },
    /// Plot the phase field of a checkpoint and integrate it on a grid.
    Inspect {
        /// Checkpoint path, with or without extension.
        checkpoint: PathBuf,
        /// Grid nodes per axis for the plots.
        #[arg(long, default_value_t = 80)]
        test_mesh_size: usize,
        /// Grid nodes per axis for the integrals.
        #[arg(long, default_value_t = 134)]
        mesh_size: usize,
        /// Plot directory, next to the checkpoint if omitted.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Cross-check a checkpoint with Gauss–Legendre quadrature.
    Validate {
        /// Checkpoint path, with or without extension.
        checkpoint: PathBuf,
        /// Use the standard constants of this run instead of the recorded ones.
        #[arg(long)]
        index: Option<usize>,
        /// Quadrature nodes per axis.
        #[arg(long, default_value_t = 64)]
        order: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DeviceArg {
    Portable,
    Accelerated,
}

impl From<DeviceArg> for ComputeDevice {
    fn from(arg: DeviceArg) -> Self {
        match arg {
            DeviceArg::Portable => ComputeDevice::Portable,
            DeviceArg::Accelerated => ComputeDevice::Accelerated,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SamplingArg {
    Grid,
    RandomGrid,
    Uniform,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match ComputeDevice::from(cli.device) {
        ComputeDevice::Portable => run_portable(&cli.command),
        ComputeDevice::Accelerated => run_accelerated(&cli.command),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "ndarray")]
fn run_portable(command: &Commands) -> Result<()> {
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::{Autodiff, NdArray};

    execute::<Autodiff<NdArray>>(command, &NdArrayDevice::Cpu, ComputeDevice::Portable)
}

#[cfg(not(feature = "ndarray"))]
fn run_portable(_command: &Commands) -> Result<()> {
    Err(neural_vesicle::VesicleError::config(
        "the portable device requires the `ndarray` feature",
    ))
}

#[cfg(feature = "wgpu")]
fn run_accelerated(command: &Commands) -> Result<()> {
    use burn::backend::wgpu::{Wgpu, WgpuDevice};
    use burn::backend::Autodiff;

    execute::<Autodiff<Wgpu>>(command, &WgpuDevice::default(), ComputeDevice::Accelerated)
}

#[cfg(not(feature = "wgpu"))]
fn run_accelerated(_command: &Commands) -> Result<()> {
    Err(neural_vesicle::VesicleError::config(
        "the accelerated device requires the `wgpu` feature",
    ))
}

fn execute<B: AutodiffBackend>(
    command: &Commands,
    device: &B::Device,
    compute: ComputeDevice,
) -> Result<()> {
    match command {
        Commands::Train {
            index,
            epochs,
            mesh_size,
            sampling,
            points,
            seed,
            resume,
            continuation,
            epsilon_index,
            area_index,
            c0,
            output_dir,
            log_interval,
            no_plots,
        } => {
            let mut training = TrainingConfig::default()
                .with_plots(!no_plots)
                .with_output_dir(output_dir.display().to_string());
            if let Some(epochs) = epochs {
                training = training.with_epochs(*epochs);
            }
            if let Some(mesh_size) = mesh_size {
                training = training.with_mesh_size(*mesh_size);
            }
            if let Some(seed) = seed {
                training = training.with_seed(*seed);
            }
            if let Some(log_interval) = log_interval {
                training = training.with_log_interval(*log_interval);
            }
            let strategy = match sampling {
                SamplingArg::Grid => SamplingStrategy::Grid,
                SamplingArg::RandomGrid => SamplingStrategy::RandomGrid,
                SamplingArg::Uniform => SamplingStrategy::Uniform {
                    count: points.unwrap_or(training.mesh_size.pow(3)),
                },
            };
            let training = training.with_sampling(strategy);

            let mut selection = RegimeSelection::for_run(*index).with_c0(*c0);
            if let Some(k) = epsilon_index {
                selection = selection.with_epsilon_index(*k);
            }
            if let Some(k) = area_index {
                selection = selection.with_area_index(*k);
            }

            let run = RunConfig::new(*index, selection, training, compute)?;
            let summaries = train_regimes::<B>(run, device, resume.as_deref(), *continuation)?;
            for summary in summaries {
                log::info!(
                    "Run {} finished after {} epochs, checkpoints: {:?}",
                    summary.run_index,
                    summary.epochs,
                    summary.checkpoints
                );
            }
            Ok(())
        }
        Commands::Inspect {
            checkpoint,
            test_mesh_size,
            mesh_size,
            output_dir,
        } => {
            let config = TrainingConfig::default();
            let (model, metadata) =
                load_checkpoint::<B::InnerBackend>(checkpoint, &config.model, device)?;
            let domain = config.domain()?;

            let dir = output_dir
                .clone()
                .unwrap_or_else(|| default_plot_dir(checkpoint));
            match FieldGrid::sample::<B::InnerBackend, _>(&model, &domain, *test_mesh_size, device)
            {
                Ok(grid) => {
                    let written = render_field_plots(&grid, &dir, "inspect");
                    log::info!("Wrote {} plots to {:?}", written.len(), dir);
                }
                Err(e) => log::warn!("Skipping plots: {e}"),
            }

            let report = evenly_spaced_integrals::<B::InnerBackend, _>(
                &model,
                &metadata.constants,
                &domain,
                *mesh_size,
                device,
            )?;
            report.log("Evenly spaced integration:");
            Ok(())
        }
        Commands::Validate {
            checkpoint,
            index,
            order,
        } => {
            let config = TrainingConfig::default();
            let (model, metadata) =
                load_checkpoint::<B::InnerBackend>(checkpoint, &config.model, device)?;
            let constants = metadata.regime_constants(*index)?;

            let report = gauss_legendre_integrals::<B::InnerBackend, _>(
                &model,
                &constants,
                &Domain::default(),
                *order,
                device,
            )?;
            report.log(&format!("Gauss-Legendre order {order}:"));
            log::info!(
                "Targets: area={:.6} volume={:.6}",
                constants.area_target,
                constants.volume_target
            );
            Ok(())
        }
    }
}

fn default_plot_dir(checkpoint: &Path) -> PathBuf {
    checkpoint
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inspect")
}
