// ============================================================
// Layer 6 — Workspace / Checkpoint Manager
// ============================================================
// Defines the on-disk layout of an experiment directory and
// persists model + optimizer state with Burn's CompactRecorder.
//
//   {exp_dir}/
//     latest_model.mpk.gz    ← overwritten every epoch
//     latest_optim.mpk.gz    ← overwritten every epoch
//     latest.json            ← epoch marker, written last
//     checkpoints/
//       model_epoch_5.mpk.gz ← permanent, every SaveEvery epochs
//       optim_epoch_5.mpk.gz
//     evaluation/            ← reserved for eval outputs
//
// Model and optimizer are always saved together: each record is
// written to a temporary stem and renamed into place, and the
// latest.json marker is rewritten only after both renames. A
// reader that trusts the marker never observes a torn pair.
// Writes are not fsynced.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use burn::{
    module::{AutodiffModule, Module},
    optim::Optimizer,
    record::{CompactRecorder, Record, Recorder},
    tensor::backend::{AutodiffBackend, Backend},
};

/// Subdirectory holding permanent epoch-numbered checkpoints.
pub const CHECKPOINT_SUBDIR: &str = "checkpoints";

/// Subdirectory reserved for evaluation outputs.
pub const EVALUATION_SUBDIR: &str = "evaluation";

/// File extension CompactRecorder appends to every stem.
const RECORD_EXT: &str = "mpk";

/// Manages the layout of one experiment directory and all
/// model/optimizer snapshots written into it.
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Bind to an experiment root and create the fixed
    /// subdirectories if absent (idempotent).
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(CHECKPOINT_SUBDIR))
            .with_context(|| format!("cannot create checkpoint dir under '{}'", root.display()))?;
        fs::create_dir_all(root.join(EVALUATION_SUBDIR))
            .with_context(|| format!("cannot create evaluation dir under '{}'", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn checkpoint_dir(&self) -> PathBuf {
        self.root.join(CHECKPOINT_SUBDIR)
    }

    pub fn evaluation_dir(&self) -> PathBuf {
        self.root.join(EVALUATION_SUBDIR)
    }

    /// Overwrite the single "latest" snapshot pair. Called every
    /// epoch; keeps crash-resumption cost at one pair of files.
    pub fn save_latest<B, M, O>(&self, epoch: usize, model: &M, optim: &O) -> Result<()>
    where
        B: AutodiffBackend,
        M: AutodiffModule<B>,
        O: Optimizer<M, B>,
    {
        write_record(model.clone().into_record(), &self.root, "latest_model")?;
        write_record(optim.to_record(), &self.root, "latest_optim")?;

        // Marker goes last: it commits the pair.
        let marker = self.root.join("latest.json");
        fs::write(&marker, serde_json::to_string(&epoch)?)
            .with_context(|| "cannot write latest.json")?;

        tracing::debug!("Saved latest snapshot at epoch {}", epoch);
        Ok(())
    }

    /// Write a permanent, epoch-numbered snapshot pair under
    /// checkpoints/. Never overwritten by later epochs.
    pub fn save_checkpoint<B, M, O>(&self, epoch: usize, model: &M, optim: &O) -> Result<()>
    where
        B: AutodiffBackend,
        M: AutodiffModule<B>,
        O: Optimizer<M, B>,
    {
        let dir = self.checkpoint_dir();
        write_record(model.clone().into_record(), &dir, &format!("model_epoch_{epoch}"))?;
        write_record(optim.to_record(), &dir, &format!("optim_epoch_{epoch}"))?;

        tracing::debug!("Saved checkpoint for epoch {}", epoch);
        Ok(())
    }

    /// Restore the latest model snapshot into `model` and return it
    /// with the epoch it was saved at. Parameters come back exactly
    /// as recorded.
    pub fn load_latest<B, M>(&self, model: M, device: &B::Device) -> Result<(M, usize)>
    where
        B: Backend,
        M: Module<B>,
    {
        let marker = self.root.join("latest.json");
        let json = fs::read_to_string(&marker)
            .with_context(|| "cannot read latest.json — has training run yet?")?;
        let epoch: usize = serde_json::from_str(&json)?;

        let path = self.root.join("latest_model");
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("cannot load snapshot '{}'", path.display()))?;

        Ok((model.load_record(record), epoch))
    }

    /// True when a permanent checkpoint pair exists for `epoch`.
    pub fn has_checkpoint(&self, epoch: usize) -> bool {
        let dir = self.checkpoint_dir();
        dir.join(format!("model_epoch_{epoch}.{RECORD_EXT}")).is_file()
            && dir.join(format!("optim_epoch_{epoch}.{RECORD_EXT}")).is_file()
    }
}

/// Record to `{dir}/{stem}_tmp.mpk.gz`, then rename over the final
/// name so the visible file is always complete.
fn write_record<B, R>(record: R, dir: &Path, stem: &str) -> Result<()>
where
    B: Backend,
    R: Record<B>,
{
    let tmp_stem = format!("{stem}_tmp");
    CompactRecorder::new()
        .record(record, dir.join(&tmp_stem))
        .with_context(|| format!("cannot record '{stem}' under '{}'", dir.display()))?;

    fs::rename(
        dir.join(format!("{tmp_stem}.{RECORD_EXT}")),
        dir.join(format!("{stem}.{RECORD_EXT}")),
    )
    .with_context(|| format!("cannot move '{stem}' snapshot into place"))?;
    Ok(())
}
