// ============================================================
// Layer 4 — Segmentation Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<SegSample>
// into tensors the model can consume.
//
// Input:  Vec of N samples, each H×W grayscale + H×W binary mask
// Output: SegBatch with two [N, 1, H, W] float tensors
//
// All samples in a dataset share their dimensions (the loader
// enforces this), so stacking is a flatten + reshape with no
// padding logic.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::domain::sample::SegSample;

// ─── SegBatch ─────────────────────────────────────────────────────────────────
/// A batch of image/mask pairs ready for the forward pass.
///
/// B is the Burn Backend (e.g. NdArray, Wgpu) — generic so the
/// same batcher works on any device.
#[derive(Debug, Clone)]
pub struct SegBatch<B: Backend> {
    /// Input images — shape: [batch, 1, height, width], values in [0, 1]
    pub images: Tensor<B, 4>,

    /// Ground-truth masks — shape: [batch, 1, height, width], values 0 or 1
    pub masks: Tensor<B, 4>,
}

// ─── SegBatcher ───────────────────────────────────────────────────────────────
/// Holds the target device so tensors land on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct SegBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SegBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SegSample, SegBatch<B>> for SegBatcher<B> {
    fn batch(&self, items: Vec<SegSample>) -> SegBatch<B> {
        let batch_size = items.len();
        // The loader guarantees uniform dimensions across the dataset.
        let height = items[0].height;
        let width = items[0].width;

        let image_flat: Vec<f32> = items.iter().flat_map(|s| s.image.iter().copied()).collect();
        let mask_flat: Vec<f32> = items.iter().flat_map(|s| s.mask.iter().copied()).collect();

        let images = Tensor::<B, 1>::from_floats(image_flat.as_slice(), &self.device)
            .reshape([batch_size, 1, height, width]);
        let masks = Tensor::<B, 1>::from_floats(mask_flat.as_slice(), &self.device)
            .reshape([batch_size, 1, height, width]);

        SegBatch { images, masks }
    }
}
