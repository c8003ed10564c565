// ============================================================
// Layer 5 — ML Layer (Burn)
// ============================================================
// All Burn framework specific code lives here (and in the data
// batcher). No other layer touches tensors.
//
//   model.rs   — compact 2D U-Net producing per-pixel logits
//   loss.rs    — Dice, weighted focal, BCE-with-logits and the
//                focal term used by the combined objective
//   trainer.rs — the epoch/batch loop: forward, combined loss,
//                backward, Adam step, metrics and checkpoints
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Milletari et al. (2016) V-Net (Dice loss)
//            Lin et al. (2017) Focal Loss for Dense Object Detection

/// 2D U-Net segmentation network
pub mod model;

/// Segmentation losses and the criterion selector
pub mod loss;

/// Full training loop with metrics and checkpointing
pub mod trainer;
