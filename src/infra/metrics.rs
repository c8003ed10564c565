// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch (running sums over all batches):
//   - epoch:        the epoch number (1, 2, 3, ...)
//   - overall_loss: criterion + focal, summed over batches
//   - dice_loss:    the criterion component (historical column
//                   name — kept even when BCE is selected)
//   - focal_loss:   the sigmoid focal component
//
// Output file: {exp_dir}/metrics.csv
//
// Each row is appended and hits the file immediately, so a
// crashed run keeps every completed epoch. The log is
// append-only and never read back by the trainer.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Sum of the combined loss over all batches this epoch
    pub overall_loss: f64,

    /// Sum of the criterion component (Dice or BCE)
    pub dice_loss: f64,

    /// Sum of the focal component
    pub focal_loss: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, overall_loss: f64, dice_loss: f64, focal_loss: f64) -> Self {
        Self {
            epoch,
            overall_loss,
            dice_loss,
            focal_loss,
        }
    }
}

/// Appends epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    /// Full path to the CSV file
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger under the experiment root.
    /// Writes the CSV header only if the file is new, so a
    /// resumed run appends to the existing log.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,overall_loss,dice_loss,focal_loss")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new CSV row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.overall_loss, m.dice_loss, m.focal_loss,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: overall={:.4}, dice={:.4}, focal={:.4}",
            m.epoch,
            m.overall_loss,
            m.dice_loss,
            m.focal_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
