// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates one training run in order:
//
//   Step 1: Parse the loss selector     (fail fast)
//   Step 2: Set up the workspace        (Layer 6 - infra)
//   Step 3: Load image/mask pairs       (Layer 4 - data)
//   Step 4: Build the Burn dataset      (Layer 4 - data)
//   Step 5: Open the metrics log        (Layer 6 - infra)
//   Step 6: Run the training loop       (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use std::path::PathBuf;

use anyhow::Result;

use crate::application::experiment::{ExperimentSpec, LossKind};
use crate::data::{dataset::SegDataset, loader::PairedImageLoader};
use crate::domain::traits::SampleSource;
use crate::infra::{metrics::MetricsLogger, workspace::Workspace};
use crate::ml::trainer::run_training;

/// Fixed seed threaded through the backend and the data-loader
/// shuffle; passed explicitly so tests can vary it.
pub const TRAINING_SEED: u64 = 2020;

/// Owns the spec and runs the full training pipeline.
pub struct TrainUseCase {
    exp_dir: PathBuf,
    spec: ExperimentSpec,
    seed: u64,
}

impl TrainUseCase {
    pub fn new(exp_dir: impl Into<PathBuf>, spec: ExperimentSpec, seed: u64) -> Self {
        Self {
            exp_dir: exp_dir.into(),
            spec,
            seed,
        }
    }

    /// Execute the pipeline end to end.
    pub fn execute(&self) -> Result<()> {
        let spec = &self.spec;

        // ── Step 1: Loss selector — rejected before anything is built ─────────
        let kind = spec.loss_kind()?;
        match kind {
            LossKind::Dice => tracing::info!("Using the Dice loss as the criterion"),
            LossKind::Bce => tracing::info!("Using BCE-with-logits as the criterion"),
        }

        // ── Step 2: Workspace (checkpoints/, evaluation/) ─────────────────────
        let workspace = Workspace::new(&self.exp_dir)?;

        // ── Step 3: Load paired image/mask data ───────────────────────────────
        let loader = PairedImageLoader::new(
            spec.data_source.join("images"),
            spec.data_source.join("labels"),
        )
        .with_limit(spec.sample_limit());
        let samples = loader.load_all()?;

        // ── Step 4: Burn dataset ──────────────────────────────────────────────
        let dataset = SegDataset::new(samples);

        // ── Step 5: Metrics log under the experiment root ─────────────────────
        let metrics = MetricsLogger::new(&self.exp_dir)?;

        // ── Step 6: Training loop (Layer 5) ───────────────────────────────────
        tracing::info!("Begin training ({} samples)", dataset.sample_count());
        run_training(spec, kind, dataset, workspace, metrics, self.seed)
    }
}
