// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Single-threaded, synchronous epoch/batch loop over Burn's
// DataLoader and Adam.
//
// Per step:  forward → criterion + focal → backward → Adam step,
//            accumulating three running sums for reporting.
// Per epoch: append a metrics row, print a summary line, save
//            the "latest" snapshot, and write a permanent
//            checkpoint every SaveEvery epochs.
//
// Failures during a step propagate to the process boundary —
// no retries, no partial-epoch recovery.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    backend::Autodiff,
    data::dataloader::DataLoaderBuilder,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::experiment::{ExperimentSpec, LossKind};
use crate::data::{batcher::SegBatcher, dataset::SegDataset};
use crate::infra::{
    metrics::{EpochMetrics, MetricsLogger},
    workspace::Workspace,
};
use crate::ml::loss::{sigmoid_focal_loss, Criterion, FOCAL_ALPHA, FOCAL_GAMMA};
use crate::ml::model::{Unet2D, Unet2DConfig};

/// Backend used for training (NdArray by default; WGPU if enabled).
#[cfg(feature = "backend-wgpu")]
pub type TrainBackend = burn::backend::Wgpu;
#[cfg(not(feature = "backend-wgpu"))]
pub type TrainBackend = burn::backend::NdArray<f32>;

type AdBackend = Autodiff<TrainBackend>;

/// Permanent checkpoints are written at epochs divisible by
/// `save_every`. A zero interval is treated as 1 rather than
/// dividing by zero.
pub fn should_checkpoint(epoch: usize, save_every: usize) -> bool {
    epoch % save_every.max(1) == 0
}

/// Run the full training loop described by the experiment spec.
/// The seed is threaded explicitly into both the backend and the
/// data-loader shuffle so runs are reproducible without global
/// RNG state.
pub fn run_training(
    spec: &ExperimentSpec,
    kind: LossKind,
    dataset: SegDataset,
    workspace: Workspace,
    metrics: MetricsLogger,
    seed: u64,
) -> Result<()> {
    AdBackend::seed(seed);
    let device = <AdBackend as Backend>::Device::default();

    // ── Model + optimizer ─────────────────────────────────────────────────────
    // Fixed network: grayscale in, one logit map out.
    let mut model: Unet2D<AdBackend> = Unet2DConfig::new(1, 1).init(&device);
    let mut optim = AdamConfig::new().init();
    let criterion = Criterion::new(kind);

    // ── Data loader ───────────────────────────────────────────────────────────
    let batcher = SegBatcher::<AdBackend>::new(device.clone());
    let loader = DataLoaderBuilder::new(batcher)
        .batch_size(spec.batch_size.max(1))
        .shuffle(seed)
        .num_workers(1)
        .build(dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=spec.epochs {
        let mut running_loss = 0.0f64;
        let mut criterion_sum = 0.0f64;
        let mut focal_sum = 0.0f64;

        for batch in loader.iter() {
            let logits = model.forward(batch.images);

            let loss1 = criterion.forward(logits.clone(), batch.masks.clone());
            let loss2 = sigmoid_focal_loss(logits, batch.masks, FOCAL_ALPHA, FOCAL_GAMMA);
            let loss = loss1.clone() + loss2.clone();

            running_loss += loss.clone().into_scalar().elem::<f64>();
            criterion_sum += loss1.into_scalar().elem::<f64>();
            focal_sum += loss2.into_scalar().elem::<f64>();

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(spec.learning_rate, model, grads);
        }

        // Flushed per epoch; a crash keeps every completed row.
        metrics.log(&EpochMetrics::new(epoch, running_loss, criterion_sum, focal_sum))?;

        println!(
            "Epoch {:>3}/{} | loss={:.4} | dice={:.4} | focal={:.4}",
            epoch, spec.epochs, running_loss, criterion_sum, focal_sum,
        );

        workspace.save_latest(epoch, &model, &optim)?;
        if should_checkpoint(epoch, spec.save_every) {
            workspace.save_checkpoint(epoch, &model, &optim)?;
            tracing::info!("Checkpoint saved for epoch {}", epoch);
        }
    }

    tracing::info!("Training complete after {} epochs", spec.epochs);
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_cadence_every_five_over_twelve() {
        let saved: Vec<usize> = (1..=12).filter(|&e| should_checkpoint(e, 5)).collect();
        assert_eq!(saved, vec![5, 10]);
    }

    #[test]
    fn test_checkpoint_cadence_every_epoch() {
        assert!((1..=4).all(|e| should_checkpoint(e, 1)));
    }

    #[test]
    fn test_zero_interval_does_not_divide_by_zero() {
        assert!(should_checkpoint(3, 0));
    }
}
