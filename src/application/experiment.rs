// ============================================================
// Layer 2 — Experiment Spec
// ============================================================
// An experiment is a directory holding one JSON file, specs.json,
// with every hyperparameter of the run. Loading is the only
// fail-fast surface of the whole program: a missing directory,
// an unreadable spec or an unrecognised loss name must be
// reported as a typed error *before* any model, optimizer or
// data loader gets built.
//
// Key names are PascalCase on disk (DataSource, LearningRate, ...)
// to stay compatible with existing experiment folders.
//
// Reference: Rust Book §9 (Error Handling)
//            serde documentation (rename_all)

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure kinds raised while loading an experiment directory.
/// The process boundary maps these to a dedicated exit code.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("experiment dir '{0}' does not exist")]
    MissingExperimentDir(PathBuf),

    #[error("cannot read '{path}': {source}")]
    UnreadableSpec {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid specs.json at '{path}': {source}")]
    InvalidSpec {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("loss function '{0}' is not recognized (expected \"Dice\" or \"BCE\")")]
    UnknownLossFunction(String),
}

/// Which criterion drives the segmentation objective.
/// The focal term is always added on top of this choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossKind {
    Dice,
    Bce,
}

impl FromStr for LossKind {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Dice" => Ok(LossKind::Dice),
            "BCE" => Ok(LossKind::Bce),
            other => Err(SpecError::UnknownLossFunction(other.to_string())),
        }
    }
}

/// All hyperparameters of one training run, as stored in specs.json.
/// Loaded once at startup and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExperimentSpec {
    /// Root of the training data; images/ and labels/ live below it
    pub data_source: PathBuf,

    /// Adam learning rate
    pub learning_rate: f64,

    /// Number of full passes over the training data
    pub epochs: usize,

    /// Write a permanent, epoch-numbered checkpoint every N epochs
    pub save_every: usize,

    /// Samples per forward/backward pass
    pub batch_size: usize,

    /// When true, truncate the dataset to num_debug samples
    /// for fast iteration during development
    pub debug: bool,

    /// Sample cap applied when debug is set
    pub num_debug: usize,

    /// "Dice" or "BCE" — parsed into LossKind before training starts
    pub loss_function: String,
}

impl ExperimentSpec {
    /// Parse the loss selector. Separate from deserialization so an
    /// unknown name surfaces as SpecError::UnknownLossFunction rather
    /// than a generic JSON error.
    pub fn loss_kind(&self) -> Result<LossKind, SpecError> {
        self.loss_function.parse()
    }

    /// Sample cap for the data loader: Some(n) only in debug runs.
    pub fn sample_limit(&self) -> Option<usize> {
        if self.debug {
            Some(self.num_debug)
        } else {
            None
        }
    }
}

/// Name of the spec file inside every experiment directory.
pub const SPEC_FILE: &str = "specs.json";

/// Validate the experiment directory and load its specs.json.
pub fn load_experiment_spec(exp_dir: &Path) -> Result<ExperimentSpec, SpecError> {
    if !exp_dir.is_dir() {
        return Err(SpecError::MissingExperimentDir(exp_dir.to_path_buf()));
    }

    let path = exp_dir.join(SPEC_FILE);
    let json = fs::read_to_string(&path).map_err(|source| SpecError::UnreadableSpec {
        path: path.clone(),
        source,
    })?;

    let spec: ExperimentSpec =
        serde_json::from_str(&json).map_err(|source| SpecError::InvalidSpec { path, source })?;

    // Reject unknown loss names here, before any collaborator is built.
    spec.loss_kind()?;

    Ok(spec)
}
