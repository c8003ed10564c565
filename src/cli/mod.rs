// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. The trainer takes a
// single argument: the experiment directory. Everything else
// (learning rate, epochs, loss choice, ...) lives in the
// specs.json file inside that directory, so a run is fully
// described by one folder on disk.
//
// All business logic is delegated to Layer 2 (application).
//
// Reference: Rust Book §12 (CLI programs)

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::application::experiment::load_experiment_spec;
use crate::application::train_use_case::{TrainUseCase, TRAINING_SEED};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "unet-seg",
    version = "0.1.0",
    about = "Train a 2D U-Net segmentation model from an experiment directory."
)]
pub struct Cli {
    /// Experiment directory containing specs.json; also used as the
    /// output root for checkpoints, evaluation artifacts and metrics.
    #[arg(long = "exp_dir", short = 'e', default_value = "./experiments/init_run/")]
    pub exp_dir: PathBuf,
}

impl Cli {
    /// Load the experiment spec and hand off to the training use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        // Spec loading fails fast with a typed SpecError before any
        // model, optimizer or data loader is constructed.
        let spec = load_experiment_spec(&self.exp_dir)?;

        tracing::info!(
            "Learning rate: {} | Epochs: {} | Batch size: {}",
            spec.learning_rate,
            spec.epochs,
            spec.batch_size,
        );
        tracing::info!("Training data dir: {}", spec.data_source.display());

        let use_case = TrainUseCase::new(self.exp_dir, spec, TRAINING_SEED);
        use_case.execute()?;

        println!("Training complete.");
        Ok(())
    }
}
